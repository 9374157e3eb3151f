//! Site settings stored as a JSON document under a single key.

use serde_json::Value as JsonValue;
use sqlx::PgPool;

use hearth_core::pricing::SiteSettings;

use super::RepositoryError;

/// Key of the settings row holding [`SiteSettings`].
pub const SITE_SETTINGS_KEY: &str = "site";

pub struct SettingsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SettingsRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Current site settings. A missing row or missing fields read as defaults.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored JSON has the wrong shape.
    pub async fn site_settings(&self) -> Result<SiteSettings, RepositoryError> {
        let value: Option<JsonValue> =
            sqlx::query_scalar("SELECT value FROM bakery.settings WHERE key = $1")
                .bind(SITE_SETTINGS_KEY)
                .fetch_optional(self.pool)
                .await?;

        match value {
            Some(json) => serde_json::from_value(json).map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid site settings: {e}"))
            }),
            None => Ok(SiteSettings::default()),
        }
    }
}
