//! Email address checks

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("EMAIL_RE should compile"));

/// Domains known to hand out throwaway addresses. Rejected at registration.
pub const DISPOSABLE_DOMAINS: &[&str] = &[
    "tempmail.com",
    "throwaway.email",
    "guerrillamail.com",
    "10minutemail.com",
    "mailinator.com",
];

const INVALID_FORMAT: &str = "Please enter a valid email address";
const DISPOSABLE: &str = "Disposable email addresses are not allowed";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailAssessment {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EmailAssessment {
    fn valid() -> Self {
        Self {
            is_valid: true,
            error: None,
        }
    }

    fn invalid(message: &str) -> Self {
        Self {
            is_valid: false,
            error: Some(message.to_string()),
        }
    }

    /// The user-facing message on rejection.
    pub fn into_result(self) -> Result<(), String> {
        match self.error {
            Some(error) if !self.is_valid => Err(error),
            _ => Ok(()),
        }
    }
}

/// Shape check only: something@something.tld with no whitespace.
pub fn is_valid_email_format(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Format check alone, with the same message `validate_email` uses.
pub fn check_email_format(email: &str) -> EmailAssessment {
    if is_valid_email_format(email) {
        EmailAssessment::valid()
    } else {
        EmailAssessment::invalid(INVALID_FORMAT)
    }
}

/// Format check followed by the disposable-domain deny-list.
pub fn validate_email(email: &str) -> EmailAssessment {
    let format = check_email_format(email);
    if !format.is_valid {
        return format;
    }

    let domain = email
        .rsplit_once('@')
        .map(|(_, domain)| domain.to_lowercase())
        .unwrap_or_default();

    if DISPOSABLE_DOMAINS.iter().any(|d| *d == domain) {
        return EmailAssessment::invalid(DISPOSABLE);
    }

    EmailAssessment::valid()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format() {
        assert!(is_valid_email_format("ana@example.com"));
        assert!(is_valid_email_format("first.last+trips@mail.example.co.uk"));

        assert!(!is_valid_email_format("bad-email"));
        assert!(!is_valid_email_format("ana@example"));
        assert!(!is_valid_email_format("ana @example.com"));
        assert!(!is_valid_email_format("ana@@example.com"));
        assert!(!is_valid_email_format(""));
    }

    #[test]
    fn test_malformed_message() {
        let assessment = validate_email("bad-email");
        assert!(!assessment.is_valid);
        assert!(assessment.error.unwrap().contains("valid email address"));
    }

    #[test]
    fn test_disposable_domains_rejected() {
        let assessment = validate_email("someone@Mailinator.com");
        assert!(!assessment.is_valid);
        assert_eq!(assessment.error.as_deref(), Some(DISPOSABLE));

        // Only the exact domain is listed, not lookalikes
        assert!(validate_email("someone@notmailinator.com").is_valid);
    }

    #[test]
    fn test_format_check_ignores_deny_list() {
        assert!(check_email_format("someone@mailinator.com").is_valid);
        assert_eq!(
            check_email_format("nope").into_result(),
            Err(INVALID_FORMAT.to_string())
        );
    }

    #[test]
    fn test_valid_email() {
        assert_eq!(validate_email("ana@example.com"), EmailAssessment::valid());
    }
}
