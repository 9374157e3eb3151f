//! Session layer backed by `bakery.admin_session`.
//!
//! Separate cookie and table from the storefront, with a shorter expiry and
//! `SameSite=Strict`.

use sqlx::PgPool;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::AdminConfig;

pub const SESSION_COOKIE_NAME: &str = "hearth_admin_session";

const SESSION_SCHEMA: &str = "bakery";
const SESSION_TABLE: &str = "admin_session";

/// 24 hours of inactivity.
const SESSION_EXPIRY_SECONDS: i64 = 24 * 60 * 60;

/// Create the session layer. The table is created by the CLI migrations.
///
/// # Errors
///
/// Returns the store's message if the schema or table name is rejected.
pub fn create_session_layer(
    pool: &PgPool,
    config: &AdminConfig,
) -> Result<SessionManagerLayer<PostgresStore>, String> {
    let store = PostgresStore::new(pool.clone())
        .with_schema_name(SESSION_SCHEMA)?
        .with_table_name(SESSION_TABLE)?;

    let is_secure = config.base_url.starts_with("https://") || config.tls.is_some();

    Ok(SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(is_secure)
        .with_same_site(tower_sessions::cookie::SameSite::Strict)
        .with_http_only(true)
        .with_path("/"))
}
