//! Admin user database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use hearth_core::models::AdminUser;
use hearth_core::rows::RowError;
use hearth_core::{AdminRole, AdminUserId, Email};

use super::{RepositoryError, conflict_on_unique, expect_one};

const ADMIN_USER_COLUMNS: &str = "id, email, name, role, is_active, last_login_at, created_at";

/// Internal row type for admin user queries.
#[derive(Debug, sqlx::FromRow)]
struct AdminUserRow {
    id: AdminUserId,
    email: String,
    name: String,
    role: Option<String>,
    is_active: bool,
    last_login_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<AdminUserRow> for AdminUser {
    type Error = RowError;

    fn try_from(row: AdminUserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| RowError {
            column: "email",
            id: row.id.as_i32(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            id: row.id,
            email,
            name: row.name,
            role: AdminRole::from_db(row.role.as_deref()),
            is_active: row.is_active,
            last_login_at: row.last_login_at,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AdminUserWithHashRow {
    #[sqlx(flatten)]
    user: AdminUserRow,
    password_hash: String,
}

/// Repository for admin user database operations.
pub struct AdminUserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AdminUserRepository<'a> {
    /// Create a new admin user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all admin users, super admins first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn list_all(&self) -> Result<Vec<AdminUser>, RepositoryError> {
        let rows = sqlx::query_as::<_, AdminUserRow>(&format!(
            r"
            SELECT {ADMIN_USER_COLUMNS}
            FROM bakery.admin_user
            ORDER BY role = 'super_admin' DESC, name
            "
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|r| AdminUser::try_from(r).map_err(RepositoryError::from))
            .collect()
    }

    /// Get an admin user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_by_id(&self, id: AdminUserId) -> Result<Option<AdminUser>, RepositoryError> {
        let row = sqlx::query_as::<_, AdminUserRow>(&format!(
            "SELECT {ADMIN_USER_COLUMNS} FROM bakery.admin_user WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(AdminUser::try_from).transpose()?)
    }

    /// Get an admin user and their password hash by email, for login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_with_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(AdminUser, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, AdminUserWithHashRow>(&format!(
            r"
            SELECT {ADMIN_USER_COLUMNS}, password_hash
            FROM bakery.admin_user
            WHERE lower(email) = lower($1)
            "
        ))
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some((AdminUser::try_from(r.user)?, r.password_hash))),
            None => Ok(None),
        }
    }

    /// Create a new admin user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        email: &Email,
        name: &str,
        role: AdminRole,
        password_hash: &str,
    ) -> Result<AdminUser, RepositoryError> {
        let row = sqlx::query_as::<_, AdminUserRow>(&format!(
            r"
            INSERT INTO bakery.admin_user (email, name, role, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING {ADMIN_USER_COLUMNS}
            "
        ))
        .bind(email.as_str())
        .bind(name)
        .bind(role.as_str())
        .bind(password_hash)
        .fetch_one(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "admin with this email"))?;

        Ok(AdminUser::try_from(row)?)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such admin exists.
    pub async fn update_role(&self, id: AdminUserId, role: AdminRole) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE bakery.admin_user SET role = $2 WHERE id = $1")
            .bind(id)
            .bind(role.as_str())
            .execute(self.pool)
            .await?;
        expect_one(result.rows_affected())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such admin exists.
    pub async fn set_active(&self, id: AdminUserId, is_active: bool) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE bakery.admin_user SET is_active = $2 WHERE id = $1")
            .bind(id)
            .bind(is_active)
            .execute(self.pool)
            .await?;
        expect_one(result.rows_affected())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such admin exists.
    pub async fn delete(&self, id: AdminUserId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM bakery.admin_user WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        expect_one(result.rows_affected())
    }

    /// Replace the password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such admin exists.
    pub async fn set_password_hash(
        &self,
        id: AdminUserId,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE bakery.admin_user SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(self.pool)
            .await?;
        expect_one(result.rows_affected())
    }

    /// Stamp a successful login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn record_login(&self, id: AdminUserId) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE bakery.admin_user SET last_login_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Number of active super admins.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_active_super_admins(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM bakery.admin_user WHERE role = 'super_admin' AND is_active",
        )
        .fetch_one(self.pool)
        .await?;
        Ok(count)
    }
}
