//! Form payloads and their validation rules

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use super::UserUpdate;
use crate::core::{Result, ValidationErrors};

/// Shortest accepted display name, in characters
pub const NAME_MIN_LEN: usize = 2;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s.]+(\.[^@\s.]+)+$").expect("email pattern is valid")
});

/// Whether `email` looks like `local@domain.tld`
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Create/update user form body
///
/// Missing fields decode as empty strings so they surface as field errors
/// rather than as a decoding failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserForm {
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Contact email
    #[serde(default)]
    pub email: String,
}

/// A validated [`UserForm`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidUser {
    /// Trimmed display name
    pub name: String,
    /// Trimmed email
    pub email: String,
}

impl UserForm {
    /// Check required fields, returning trimmed values
    pub fn validate(&self) -> Result<ValidUser> {
        let name = self.name.trim();
        let email = self.email.trim();
        let mut errors = ValidationErrors::new();

        if name.chars().count() < NAME_MIN_LEN {
            errors.add(
                "name",
                format!("Name must be at least {} characters", NAME_MIN_LEN),
            );
        }
        if !is_valid_email(email) {
            errors.add("email", "Email must be a valid address");
        }

        errors.into_result()?;
        Ok(ValidUser {
            name: name.to_string(),
            email: email.to_string(),
        })
    }
}

impl From<ValidUser> for UserUpdate {
    fn from(user: ValidUser) -> Self {
        UserUpdate {
            name: Some(user.name),
            email: Some(user.email),
        }
    }
}

/// Login form body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    /// Account email
    #[serde(default)]
    pub email: String,
    /// Password; any non-empty value is accepted
    #[serde(default)]
    pub password: String,
}

impl LoginForm {
    /// Check the credentials are well-formed; returns the trimmed email
    pub fn validate(&self) -> Result<String> {
        let email = self.email.trim();
        let mut errors = ValidationErrors::new();

        if !is_valid_email(email) {
            errors.add("email", "Email must be a valid address");
        }
        if self.password.is_empty() {
            errors.add("password", "Password is required");
        }

        errors.into_result()?;
        Ok(email.to_string())
    }
}
