//! User lookup and account policy types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How to address a user record.
///
/// Callers pick exactly one key; repositories dispatch on the variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lookup {
    ByUsername(String),
    ByEmail(String),
    ById(Uuid),
}

impl Lookup {
    /// Build a lookup from optional wire fields. Email wins when both are set.
    pub fn from_fields(email: Option<String>, username: Option<String>) -> Option<Self> {
        match (email, username) {
            (Some(email), _) => Some(Self::ByEmail(email)),
            (None, Some(username)) => Some(Self::ByUsername(username)),
            (None, None) => None,
        }
    }
}

/// Reserved usernames that collide with routing segments.
const RESERVED_USERNAMES: &[&str] = &["me", "validate", "auth"];

/// Validate a username: 3–50 chars, lowercase alphanumeric plus `_`/`-`/`.`,
/// and not a reserved routing word.
pub fn validate_username(username: &str) -> bool {
    if !(3..=50).contains(&username.len()) {
        return false;
    }
    if RESERVED_USERNAMES.contains(&username) {
        return false;
    }
    username
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '-' | '.'))
}

/// Password policy violations, surfaced verbatim to the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PasswordPolicyError {
    #[error("password must be between 8 and 15 characters")]
    Length,
    #[error("password must contain at least one letter")]
    NoLetter,
    #[error("password must contain at least one digit")]
    NoDigit,
    #[error("password must contain at least one uppercase letter")]
    NoUppercase,
    #[error("password must contain at least one symbol")]
    NoSymbol,
}

/// Check a candidate password against the account policy.
pub fn validate_password(password: &str) -> Result<(), PasswordPolicyError> {
    if !(8..=15).contains(&password.chars().count()) {
        return Err(PasswordPolicyError::Length);
    }
    if !password.chars().any(|c| c.is_alphabetic()) {
        return Err(PasswordPolicyError::NoLetter);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(PasswordPolicyError::NoDigit);
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        return Err(PasswordPolicyError::NoUppercase);
    }
    if password.chars().all(|c| c.is_alphanumeric()) {
        return Err(PasswordPolicyError::NoSymbol);
    }
    Ok(())
}
