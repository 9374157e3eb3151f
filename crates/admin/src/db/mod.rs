//! Database operations for the back office.
//!
//! # Database: schema `bakery`
//!
//! The back office shares the storefront's schema and owns most writes to it.
//!
//! ## Tables
//!
//! - `admin_user` - Staff accounts with argon2 password hashes and roles
//! - `admin_session` - Tower-sessions storage for the back office
//! - `customer_order`, `order_item` - Order workflow
//! - `custom_request` - Custom cake quotes
//! - `review`, `testimonial` - Moderation queues
//! - `category`, `product` - Catalog management
//! - `announcement`, `hero_slide`, `page` - Site content
//! - `settings` - Site settings (JSONB under key `site`)
//! - `user` - Customers (read only)
//! - `notification` - In-app notices written on status changes
//!
//! # Migrations
//!
//! Migrations are stored in `migrations/` at the workspace root and run via:
//! ```bash
//! cargo run -p hearth-cli -- migrate
//! ```

pub mod admin_users;
pub mod catalog;
pub mod content;
pub mod custom_requests;
pub mod customers;
pub mod notifications;
pub mod orders;
pub mod reviews;
pub mod settings;
pub mod testimonials;

use std::time::Duration;

use hearth_core::rows::RowError;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use admin_users::AdminUserRepository;
pub use catalog::CatalogRepository;
pub use content::ContentRepository;
pub use custom_requests::CustomRequestRepository;
pub use customers::CustomerRepository;
pub use notifications::NotificationRepository;
pub use orders::OrderRepository;
pub use reviews::ReviewRepository;
pub use settings::SettingsRepository;
pub use testimonials::TestimonialRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl From<RowError> for RepositoryError {
    fn from(e: RowError) -> Self {
        Self::DataCorruption(e.to_string())
    }
}

/// Map a unique violation to `Conflict`, anything else to `Database`.
pub(crate) fn conflict_on_unique(e: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(e)
}

/// `NotFound` when an update or delete touched no rows.
pub(crate) const fn expect_one(rows_affected: u64) -> Result<(), RepositoryError> {
    if rows_affected == 0 {
        Err(RepositoryError::NotFound)
    } else {
        Ok(())
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(5)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expect_one() {
        assert!(expect_one(1).is_ok());
        assert!(matches!(expect_one(0), Err(RepositoryError::NotFound)));
    }

    #[test]
    fn test_row_error_is_data_corruption() {
        let err = RepositoryError::from(RowError {
            column: "email",
            id: 4,
            reason: "missing @".to_owned(),
        });
        assert!(matches!(err, RepositoryError::DataCorruption(_)));
        assert!(err.to_string().contains("row 4"));
    }
}
