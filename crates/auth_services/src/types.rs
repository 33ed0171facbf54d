use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

lazy_static::lazy_static! {
    /// Usernames are 1-32 characters of letters, digits, `_`, `.` or `-`.
    pub static ref USERNAME_REGEX: regex::Regex =
        regex::Regex::new(r"^[A-Za-z0-9_.\-]{1,32}$").expect("username pattern is valid");
}

/// Request structure for account registration
#[derive(Debug, Default, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Unique username of the account
    #[serde(default)]
    #[validate(regex(
        path = *USERNAME_REGEX,
        message = "Username must be 1-32 letters, digits, '_', '.' or '-'"
    ))]
    pub username: String,

    /// Email address of the account
    #[serde(default)]
    #[validate(email(message = "Please enter a valid email"))]
    pub email: String,

    /// Password for the account
    #[serde(default)]
    #[validate(custom(function = "validate_password"))]
    pub password: String,
}

/// bcrypt ignores everything past this many bytes of a password.
pub const MAX_PASSWORD_BYTES: usize = 72;

fn validate_password(password: &str) -> Result<(), validator::ValidationError> {
    let message = if password.is_empty() {
        "Password is required"
    } else if password.len() > MAX_PASSWORD_BYTES {
        "Password must be at most 72 bytes"
    } else {
        return Ok(());
    };

    let mut error = validator::ValidationError::new("invalid_password");
    error.message = Some(message.into());
    Err(error)
}

/// Request structure for signing in
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    /// Username of the account
    #[serde(default)]
    pub username: String,

    /// Password for the account
    #[serde(default)]
    pub password: String,
}

/// Account model representing the database schema
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Account {
    /// Unique identifier for the account
    pub id: Uuid,
    /// Unique username
    pub username: String,
    /// Email address
    pub email: String,
    /// bcrypt hash of the password
    pub password_hash: String,
    /// Timestamp when the account was created
    pub created_at: DateTime<Utc>,
}

/// A fully prepared account row, ready to be inserted by an [`AccountStore`].
///
/// [`AccountStore`]: crate::store::AccountStore
#[derive(Debug, Clone)]
pub struct NewAccount {
    /// Identifier assigned to the account
    pub id: Uuid,
    /// Trimmed username
    pub username: String,
    /// Trimmed, lowercased email
    pub email: String,
    /// bcrypt hash of the password
    pub password_hash: String,
}

/// Session token claims
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject of the token, the account ID
    pub sub: String,
    /// Expiration timestamp of the token
    pub exp: usize,
    /// Issued at timestamp of the token
    pub iat: usize,
}

/// Custom error type for authentication-related errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The username is already taken
    #[error("A user with the given username is already registered")]
    DuplicateUsername,

    /// The provided credentials are invalid
    #[error("Password or username is incorrect")]
    InvalidCredentials,

    /// The account was not found in the system
    #[error("Account not found")]
    AccountNotFound,

    /// The account store could not be reached
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// An error occurred while hashing the password
    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    /// The session token could not be encoded or verified
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// The session cookie could not be written
    #[error("Session error: {0}")]
    Session(#[from] actix_session::SessionInsertError),

    /// An error occurred while validating input data
    #[error("{0}")]
    Validation(String),
}

impl AuthError {
    /// Whether the failure came from the account store rather than from the input.
    pub fn is_store_failure(&self) -> bool {
        matches!(self, AuthError::Database(_))
    }
}

/// Flattens validator output into one human-readable sentence per field, sorted by field name.
pub fn validation_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| match &error.message {
                Some(message) => message.to_string(),
                None => format!("Invalid {}", field),
            })
        })
        .collect::<Vec<_>>()
        .join(". ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_validation() {
        let valid = RegisterRequest {
            username: "alice".to_string(),
            email: "a@x.com".to_string(),
            password: "pw1".to_string(),
        };
        assert!(valid.validate().is_ok());

        let invalid = RegisterRequest {
            username: "al ice".to_string(),
            email: "not-an-email".to_string(),
            password: String::new(),
        };
        let errors = invalid.validate().unwrap_err();
        let message = validation_message(&errors);

        assert_eq!(
            message,
            "Please enter a valid email. Password is required. \
             Username must be 1-32 letters, digits, '_', '.' or '-'"
        );
    }

    #[test]
    fn test_password_is_capped_at_bcrypt_limit() {
        let request = |password: String| RegisterRequest {
            username: "alice".to_string(),
            email: "a@x.com".to_string(),
            password,
        };

        assert!(request("a".repeat(72)).validate().is_ok());

        let errors = request("a".repeat(73)).validate().unwrap_err();
        assert_eq!(validation_message(&errors), "Password must be at most 72 bytes");

        // 25 three-byte characters are 75 bytes.
        assert!(request("日".repeat(25)).validate().is_err());
    }
}
