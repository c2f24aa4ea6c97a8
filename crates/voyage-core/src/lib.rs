//! Voyage Core
//!
//! Application context for the booking site client. Builds the single
//! session manager at start-up and hands it out by reference.

mod config;
mod error;
mod portal;

pub use config::Config;
pub use error::CoreError;
pub use portal::Portal;

// Re-export core components
pub use voyage_session::{
    AuthApi, AuthError, AuthStateChange, Credentials, ProfileUpdate, Registration, Session,
    SessionManager, SubscriptionId, UserProfile,
};
pub use voyage_storage::{Database, StorageError};
pub use voyage_validation::{
    calculate_password_strength, validate_email, validate_password, EmailAssessment,
    PasswordAssessment, PasswordStrength,
};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging with a fallback filter for when `RUST_LOG` is unset.
pub fn init_logging(default_filter: &str) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
