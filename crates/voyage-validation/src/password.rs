//! Password rules and strength scoring
//!
//! Validity and strength are computed independently. Validity is the five
//! rules below; strength is a 0-6 point score that also rewards length >= 12.

use serde::Serialize;

pub const SPECIAL_CHARACTERS: &str = "!@#$%^&*(),.?\":{}|<>";

const MIN_LENGTH: usize = 8;
const LONG_LENGTH: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PasswordStrength {
    Weak,
    Medium,
    Strong,
    VeryStrong,
}

impl PasswordStrength {
    pub fn as_str(&self) -> &'static str {
        match self {
            PasswordStrength::Weak => "weak",
            PasswordStrength::Medium => "medium",
            PasswordStrength::Strong => "strong",
            PasswordStrength::VeryStrong => "very-strong",
        }
    }

    fn from_score(score: u8) -> Self {
        match score {
            0..=2 => PasswordStrength::Weak,
            3..=4 => PasswordStrength::Medium,
            5 => PasswordStrength::Strong,
            _ => PasswordStrength::VeryStrong,
        }
    }
}

impl std::fmt::Display for PasswordStrength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordAssessment {
    pub is_valid: bool,
    /// Violated rules, in rule order
    pub errors: Vec<String>,
    pub strength: PasswordStrength,
}

impl PasswordAssessment {
    /// The violated-rule messages on rejection.
    pub fn into_result(self) -> Result<(), Vec<String>> {
        if self.is_valid {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

struct Traits {
    length: usize,
    upper: bool,
    lower: bool,
    digit: bool,
    special: bool,
}

impl Traits {
    fn of(password: &str) -> Self {
        Self {
            length: password.chars().count(),
            upper: password.chars().any(|c| c.is_ascii_uppercase()),
            lower: password.chars().any(|c| c.is_ascii_lowercase()),
            digit: password.chars().any(|c| c.is_ascii_digit()),
            special: password.chars().any(|c| SPECIAL_CHARACTERS.contains(c)),
        }
    }
}

pub fn validate_password(password: &str) -> PasswordAssessment {
    let traits = Traits::of(password);
    let mut errors = Vec::new();

    if traits.length < MIN_LENGTH {
        errors.push(format!(
            "Password must be at least {MIN_LENGTH} characters long"
        ));
    }
    if !traits.upper {
        errors.push("Password must contain at least one uppercase letter".to_string());
    }
    if !traits.lower {
        errors.push("Password must contain at least one lowercase letter".to_string());
    }
    if !traits.digit {
        errors.push("Password must contain at least one number".to_string());
    }
    if !traits.special {
        errors.push(format!(
            "Password must contain at least one special character ({SPECIAL_CHARACTERS})"
        ));
    }

    PasswordAssessment {
        is_valid: errors.is_empty(),
        errors,
        strength: calculate_password_strength(password),
    }
}

pub fn calculate_password_strength(password: &str) -> PasswordStrength {
    let traits = Traits::of(password);

    let score = [
        traits.length >= MIN_LENGTH,
        traits.length >= LONG_LENGTH,
        traits.upper,
        traits.lower,
        traits.digit,
        traits.special,
    ]
    .iter()
    .filter(|&&met| met)
    .count() as u8;

    PasswordStrength::from_score(score)
}
