//! Staff account management.
//!
//! ```bash
//! hearth-cli admin create -e owner@hearthbakery.shop -n "Owner" -r super_admin -p '<password>'
//! ```
//!
//! This is how the first super admin is created. Later accounts can be added
//! from the staff page in the back office.

use thiserror::Error;

use hearth_admin::services::{AdminAuthError, AdminAuthService, NewAdmin};
use hearth_core::{AdminRole, AdminUserId};

use super::{ConnectError, connect};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    /// Invalid role.
    #[error("Invalid role: {0}. Valid roles: super_admin, admin, editor, viewer")]
    InvalidRole(String),

    /// Admin user already exists.
    #[error("Admin user already exists with email: {0}")]
    UserExists(String),

    #[error(transparent)]
    Auth(AdminAuthError),
}

/// Parse a role name given on the command line.
///
/// # Errors
///
/// Returns `AdminError::InvalidRole` for anything but the four known roles.
pub fn parse_role(role: &str) -> Result<AdminRole, AdminError> {
    role.trim()
        .parse()
        .map_err(|_| AdminError::InvalidRole(role.to_owned()))
}

/// Create a staff account with an Argon2id-hashed password.
///
/// # Errors
///
/// Returns an error if the role is unknown, the email or password is
/// rejected, the account already exists or the database is unreachable.
pub async fn create_user(
    email: &str,
    name: &str,
    role: &str,
    password: &str,
) -> Result<AdminUserId, AdminError> {
    let role = parse_role(role)?;
    let pool = connect().await?;

    tracing::info!("Creating admin user: {} ({})", email, role);

    let user = AdminAuthService::new(&pool)
        .create(NewAdmin {
            email,
            name,
            role,
            password,
        })
        .await
        .map_err(|e| match e {
            AdminAuthError::UserAlreadyExists => AdminError::UserExists(email.to_owned()),
            other => AdminError::Auth(other),
        })?;

    tracing::info!(
        "Admin user created successfully! ID: {}, Email: {}, Role: {}",
        user.id,
        user.email,
        user.role
    );

    Ok(user.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_role() {
        assert!(matches!(parse_role("super_admin"), Ok(AdminRole::SuperAdmin)));
        assert!(matches!(parse_role(" editor "), Ok(AdminRole::Editor)));
        assert!(matches!(parse_role("owner"), Err(AdminError::InvalidRole(r)) if r == "owner"));
    }
}
