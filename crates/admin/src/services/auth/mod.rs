//! Staff authentication with email and password.
//!
//! Passwords are hashed with Argon2id. Accounts are created by a super admin
//! from the staff page or with `hearth-cli admin create`.

mod error;

pub use error::AdminAuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use hearth_core::models::AdminUser;
use hearth_core::{AdminRole, Email};

use crate::db::RepositoryError;
use crate::db::admin_users::AdminUserRepository;

/// Minimum password length for staff accounts.
pub const MIN_PASSWORD_LENGTH: usize = 10;

const MAX_NAME_LENGTH: usize = 100;

/// Input for a new staff account.
#[derive(Debug, Clone, Copy)]
pub struct NewAdmin<'a> {
    pub email: &'a str,
    pub name: &'a str,
    pub role: AdminRole,
    pub password: &'a str,
}

pub struct AdminAuthService<'a> {
    users: AdminUserRepository<'a>,
}

impl<'a> AdminAuthService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: AdminUserRepository::new(pool),
        }
    }

    /// Verify credentials and stamp the login time.
    ///
    /// # Errors
    ///
    /// Returns `AdminAuthError::InvalidCredentials` if the email or password is wrong.
    /// Returns `AdminAuthError::Inactive` if the password is right but the account is disabled.
    pub async fn login(&self, email: &str, password: &str) -> Result<AdminUser, AdminAuthError> {
        let email = Email::parse(email).map_err(|_| AdminAuthError::InvalidCredentials)?;

        let (admin, password_hash) = self
            .users
            .get_with_password_hash(&email)
            .await?
            .ok_or(AdminAuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        if !admin.is_active {
            return Err(AdminAuthError::Inactive);
        }

        if let Err(e) = self.users.record_login(admin.id).await {
            tracing::warn!(error = %e, admin_id = %admin.id, "Failed to record admin login");
        }

        Ok(admin)
    }

    /// Create a staff account.
    ///
    /// # Errors
    ///
    /// Returns `AdminAuthError::InvalidInput` for a bad email or name.
    /// Returns `AdminAuthError::WeakPassword` if the password is too short.
    /// Returns `AdminAuthError::UserAlreadyExists` if the email is taken.
    pub async fn create(&self, input: NewAdmin<'_>) -> Result<AdminUser, AdminAuthError> {
        let email =
            Email::parse(input.email).map_err(|e| AdminAuthError::InvalidInput(e.to_string()))?;
        let name = validate_name(input.name)?;
        validate_password(input.password)?;
        let password_hash = hash_password(input.password)?;

        self.users
            .create(&email, name, input.role, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AdminAuthError::UserAlreadyExists,
                other => AdminAuthError::Repository(other),
            })
    }
}

fn validate_name(name: &str) -> Result<&str, AdminAuthError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AdminAuthError::InvalidInput("name is required".to_owned()));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(AdminAuthError::InvalidInput(format!(
            "name must be at most {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(name)
}

/// # Errors
///
/// Returns `AdminAuthError::WeakPassword` if the password is shorter than
/// [`MIN_PASSWORD_LENGTH`].
pub fn validate_password(password: &str) -> Result<(), AdminAuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AdminAuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password with Argon2id and a random salt.
///
/// # Errors
///
/// Returns `AdminAuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AdminAuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AdminAuthError::PasswordHash)
}

fn verify_password(password: &str, hash: &str) -> Result<(), AdminAuthError> {
    let parsed = PasswordHash::new(hash).map_err(|_| AdminAuthError::InvalidCredentials)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AdminAuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_password_round_trip() {
        let hash = hash_password("laminated-dough").unwrap();
        assert!(hash.starts_with("$argon2id"));
        assert!(verify_password("laminated-dough", &hash).is_ok());
        assert!(matches!(
            verify_password("laminated-doug", &hash),
            Err(AdminAuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_garbage_hash_is_invalid_credentials() {
        assert!(matches!(
            verify_password("whatever", "not-a-hash"),
            Err(AdminAuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_validate_password_length() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("exactly10!").is_ok());
    }

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("  Maya  ").unwrap(), "Maya");
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"x".repeat(101)).is_err());
    }
}
