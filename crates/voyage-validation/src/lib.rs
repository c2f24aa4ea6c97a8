//! Voyage Credential Validation
//!
//! Stateless checks run before any credential leaves the client.
//! These are a UX convenience only; the Auth API remains the authority
//! on what it accepts.

mod email;
mod password;

pub use email::{
    check_email_format, is_valid_email_format, validate_email, EmailAssessment,
    DISPOSABLE_DOMAINS,
};
pub use password::{
    calculate_password_strength, validate_password, PasswordAssessment, PasswordStrength,
    SPECIAL_CHARACTERS,
};
