//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] voyage_storage::StorageError),

    #[error("Session error: {0}")]
    Session(#[from] voyage_session::AuthError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Config(String),
}
