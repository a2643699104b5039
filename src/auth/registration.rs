//! User registration for filevault.

use thiserror::Error;
use tracing::info;
use validator::ValidateEmail;

use crate::auth::{hash_password, PasswordError};
use crate::db::{NewUser, User, UserRepository};

/// Registration-specific errors.
///
/// The display strings are returned to clients as-is.
#[derive(Error, Debug)]
pub enum RegistrationError {
    #[error("Missing email")]
    MissingEmail,

    #[error("Missing password")]
    MissingPassword,

    #[error("Invalid email")]
    InvalidEmail,

    #[error("Already exist")]
    EmailExists,

    /// Password hashing failed.
    #[error("password error: {0}")]
    Password(#[from] PasswordError),

    /// Database error.
    #[error("database error: {0}")]
    Database(String),
}

/// Registration request data.
#[derive(Debug, Clone, Default)]
pub struct RegistrationRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl RegistrationRequest {
    /// Create a new registration request.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            password: Some(password.into()),
        }
    }
}

/// Register a new user.
///
/// Checks run in order: email present, password present, email well-formed,
/// email not taken. The password is hashed before the user is stored.
pub async fn register(
    repo: &UserRepository<'_>,
    request: RegistrationRequest,
) -> std::result::Result<User, RegistrationError> {
    let email = request
        .email
        .filter(|e| !e.is_empty())
        .ok_or(RegistrationError::MissingEmail)?;
    let password = request
        .password
        .filter(|p| !p.is_empty())
        .ok_or(RegistrationError::MissingPassword)?;

    if !email.validate_email() {
        return Err(RegistrationError::InvalidEmail);
    }

    if repo
        .email_exists(&email)
        .await
        .map_err(|e| RegistrationError::Database(e.to_string()))?
    {
        return Err(RegistrationError::EmailExists);
    }

    let password_hash = hash_password(&password)?;

    // A concurrent registration can still win the race; the UNIQUE
    // constraint turns that into a database error here.
    let user = repo
        .create(&NewUser::new(&email, password_hash))
        .await
        .map_err(|e| RegistrationError::Database(e.to_string()))?;

    info!(email = %user.email, user_id = user.id, "New user registered");

    Ok(user)
}
