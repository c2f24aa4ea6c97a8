//! Voyage Session Management
//!
//! Owns the authenticated-session lifecycle for the booking site:
//! - Credentials are checked locally before any network call
//! - Access token, user and refresh token persist as three keyed entries
//! - Session-invalid conditions always clear the whole session
//! - Every state mutation is broadcast to registered listeners after the
//!   storage write completes

mod api;
mod error;
mod events;
mod manager;
mod session;

pub use api::{ApiResponse, AuthApi, AuthPayload};
pub use error::AuthError;
pub use events::{AuthStateChange, SubscriptionId};
pub use manager::SessionManager;
pub use session::{Credentials, ProfileUpdate, Registration, Session, UserProfile};

pub type Result<T> = std::result::Result<T, AuthError>;
