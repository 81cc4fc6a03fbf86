//! Accounts and the sign-up / login payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AuthError;

pub const MIN_PASSWORD_LEN: usize = 6;

/// A registered account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: &str, password_hash: String, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: normalize_email(email),
            password_hash,
            name: name.into(),
            created_at: Utc::now(),
        }
    }
}

/// Emails compare case-insensitively after trimming.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Body of `POST /api/auth/signup`.
#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

impl SignupRequest {
    /// Field checks that do not need the database.
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.name.trim().is_empty()
            || self.email.trim().is_empty()
            || self.password.is_empty()
            || self.confirm_password.is_empty()
        {
            return Err(AuthError::MissingFields);
        }
        if self.password != self.confirm_password {
            return Err(AuthError::PasswordMismatch);
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::PasswordTooShort {
                min: MIN_PASSWORD_LEN,
            });
        }
        Ok(())
    }
}

/// Body of `POST /api/auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup(name: &str, email: &str, pw: &str, confirm: &str) -> SignupRequest {
        SignupRequest {
            name: name.into(),
            email: email.into(),
            password: pw.into(),
            confirm_password: confirm.into(),
        }
    }

    #[test]
    fn signup_validation_messages() {
        let err = signup("", "a@b.c", "secret1", "secret1").validate().unwrap_err();
        assert_eq!(err.to_string(), "Please fill in all fields");

        let err = signup("Ann", "a@b.c", "secret1", "secret2").validate().unwrap_err();
        assert_eq!(err.to_string(), "Passwords do not match");

        let err = signup("Ann", "a@b.c", "abc", "abc").validate().unwrap_err();
        assert_eq!(err.to_string(), "Password must be at least 6 characters");

        assert!(signup("Ann", "a@b.c", "secret", "secret").validate().is_ok());
    }

    #[test]
    fn email_is_normalized() {
        let user = User::new("  Ann@Example.COM ", "hash".into(), "Ann");
        assert_eq!(user.email, "ann@example.com");
    }

    #[test]
    fn password_hash_never_serialized() {
        let user = User::new("a@b.c", "$argon2id$secret".into(), "Ann");
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(!json.contains("password_hash"));
    }
}
