//! Session error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    /// Malformed or disallowed email, caught before any request
    #[error("{0}")]
    InvalidEmail(String),

    /// Violated password rules, in rule order
    #[error("{}", .0.join(". "))]
    WeakPassword(Vec<String>),

    /// Server-supplied error message, passed through verbatim
    #[error("{0}")]
    Rejected(String),

    #[error("Network error. Please try again.")]
    Network(#[source] reqwest::Error),

    #[error("Unexpected response from server: {0}")]
    InvalidResponse(String),

    #[error("You must be logged in to do that")]
    NotAuthenticated,

    #[error("Storage error: {0}")]
    Storage(#[from] voyage_storage::StorageError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AuthError {
    /// Whether the failure was decided locally, without contacting the server.
    pub fn is_local_validation(&self) -> bool {
        matches!(self, AuthError::InvalidEmail(_) | AuthError::WeakPassword(_))
    }
}
