//! Session layer backed by `bakery.session`.
//!
//! The cart, the custom cake wizard, flash messages and the signed-in
//! customer all live in the session.

use sqlx::PgPool;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::StorefrontConfig;

pub const SESSION_COOKIE_NAME: &str = "hearth_session";

const SESSION_SCHEMA: &str = "bakery";
const SESSION_TABLE: &str = "session";

/// Thirty days, so carts survive between visits.
const SESSION_EXPIRY_SECONDS: i64 = 30 * 24 * 60 * 60;

/// Create the session layer. The table is created by the CLI migrations.
///
/// # Errors
///
/// Returns the store's message if the schema or table name is rejected.
pub fn create_session_layer(
    pool: &PgPool,
    config: &StorefrontConfig,
) -> Result<SessionManagerLayer<PostgresStore>, String> {
    let store = PostgresStore::new(pool.clone())
        .with_schema_name(SESSION_SCHEMA)?
        .with_table_name(SESSION_TABLE)?;

    Ok(SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.base_url.starts_with("https://"))
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/"))
}
