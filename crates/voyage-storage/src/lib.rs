//! Voyage Storage Layer
//!
//! SQLite-based durable storage for client-side state.
//! Entries are plain keyed strings; callers own the encoding of values.

mod database;
mod error;
mod migrations;

pub use database::Database;
pub use error::StorageError;

pub type Result<T> = std::result::Result<T, StorageError>;
