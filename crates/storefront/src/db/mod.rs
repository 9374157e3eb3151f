//! Database operations for the storefront.
//!
//! # Database: schema `bakery`
//!
//! The storefront reads the catalog and site content and writes customer
//! data. The back office owns everything else in the same schema.
//!
//! ## Tables touched here
//!
//! - `user`, `user_password` - Customer accounts
//! - `category`, `product` - Catalog (read only)
//! - `customer_order`, `order_item` - Placed orders
//! - `custom_request` - Custom cake requests
//! - `review`, `testimonial` - Submissions awaiting moderation
//! - `announcement`, `hero_slide`, `page`, `settings` - Site content (read only)
//! - `notification`, `wishlist_item` - Per-customer account data
//! - `session` - Tower-sessions storage
//!
//! # Migrations
//!
//! Migrations are stored in `migrations/` at the workspace root and run via:
//! ```bash
//! cargo run -p hearth-cli -- migrate
//! ```

pub mod catalog;
pub mod content;
pub mod custom_requests;
pub mod notifications;
pub mod orders;
pub mod reviews;
pub mod settings;
pub mod testimonials;
pub mod users;
pub mod wishlist;

use std::time::Duration;

use hearth_core::rows::RowError;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use catalog::CatalogRepository;
pub use content::ContentRepository;
pub use custom_requests::CustomRequestRepository;
pub use notifications::NotificationRepository;
pub use orders::OrderRepository;
pub use reviews::ReviewRepository;
pub use settings::SettingsRepository;
pub use testimonials::TestimonialRepository;
pub use users::UserRepository;
pub use wishlist::WishlistRepository;

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
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
