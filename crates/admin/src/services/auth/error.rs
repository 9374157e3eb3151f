//! Admin authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

#[derive(Debug, Error)]
pub enum AdminAuthError {
    /// Unknown email or wrong password. The two are not distinguished.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The account exists but has been deactivated.
    #[error("account is deactivated")]
    Inactive,

    /// Admin user already exists.
    #[error("admin user already exists")]
    UserAlreadyExists,

    /// Password does not meet requirements.
    #[error("weak password: {0}")]
    WeakPassword(String),

    /// Invalid name or email on account creation.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Hashing failed.
    #[error("password hashing failed")]
    PasswordHash,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
