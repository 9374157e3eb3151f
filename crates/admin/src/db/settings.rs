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

    /// Whether a settings document has been stored yet.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn has_site_settings(&self) -> Result<bool, RepositoryError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM bakery.settings WHERE key = $1)")
                .bind(SITE_SETTINGS_KEY)
                .fetch_one(self.pool)
                .await?;
        Ok(exists)
    }

    /// Overwrite the settings document.
    ///
    /// The storefront caches settings briefly, so changes reach it within a
    /// minute.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn save_site_settings(&self, settings: &SiteSettings) -> Result<(), RepositoryError> {
        let value = serde_json::to_value(settings)
            .map_err(|e| RepositoryError::DataCorruption(format!("unserializable settings: {e}")))?;

        sqlx::query(
            r"
            INSERT INTO bakery.settings (key, value)
            VALUES ($1, $2)
            ON CONFLICT (key) DO UPDATE SET value = $2, updated_at = NOW()
            ",
        )
        .bind(SITE_SETTINGS_KEY)
        .bind(value)
        .execute(self.pool)
        .await?;
        Ok(())
    }
}
