//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;

use hearth_core::pricing::SiteSettings;

use crate::config::StorefrontConfig;
use crate::db::{RepositoryError, SettingsRepository};
use crate::services::{EmailService, Notifier, WhatsAppClient};

/// How long settings edited in the back office take to reach the storefront.
const SETTINGS_TTL: Duration = Duration::from_secs(60);

/// Cheaply cloneable handle to the pool, configuration, settings cache and
/// outbound clients.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    settings: Cache<(), SiteSettings>,
    email: Option<EmailService>,
    whatsapp: Option<WhatsAppClient>,
}

impl AppState {
    /// Build state. Email and WhatsApp are enabled when configured and fall
    /// back to disabled with a warning when their clients fail to build.
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        let email = config
            .email
            .as_ref()
            .and_then(|c| match EmailService::new(c, &config.base_url) {
                Ok(service) => Some(service),
                Err(e) => {
                    tracing::warn!(error = %e, "Email disabled: SMTP setup failed");
                    None
                }
            });
        let whatsapp = config
            .whatsapp
            .as_ref()
            .and_then(|c| match WhatsAppClient::new(c) {
                Ok(client) => Some(client),
                Err(e) => {
                    tracing::warn!(error = %e, "WhatsApp alerts disabled");
                    None
                }
            });

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                settings: Cache::builder()
                    .max_capacity(1)
                    .time_to_live(SETTINGS_TTL)
                    .build(),
                email,
                whatsapp,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Site settings through the cache. Failed reads are not cached.
    ///
    /// # Errors
    ///
    /// Returns the repository error when the row cannot be read or parsed.
    pub async fn site_settings(&self) -> Result<SiteSettings, RepositoryError> {
        if let Some(settings) = self.inner.settings.get(&()).await {
            return Ok(settings);
        }
        let settings = SettingsRepository::new(&self.inner.pool)
            .site_settings()
            .await?;
        self.inner.settings.insert((), settings.clone()).await;
        Ok(settings)
    }

    #[must_use]
    pub fn notifier(&self) -> Notifier<'_> {
        Notifier::new(
            &self.inner.pool,
            self.inner.email.as_ref(),
            self.inner.whatsapp.as_ref(),
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;
    use sqlx::postgres::PgPoolOptions;

    use super::*;

    fn unreachable_state() -> AppState {
        let config = StorefrontConfig {
            database_url: SecretString::from("postgres://hearth@127.0.0.1:1/hearth"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            session_secret: SecretString::from("x".repeat(32)),
            email: None,
            whatsapp: None,
            sentry_dsn: None,
        };
        let pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_secs(1))
            .connect_lazy("postgres://hearth@127.0.0.1:1/hearth")
            .unwrap();
        AppState::new(config, pool)
    }

    #[tokio::test]
    async fn test_site_settings_surfaces_database_failure() {
        let state = unreachable_state();
        assert!(matches!(
            state.site_settings().await,
            Err(RepositoryError::Database(_))
        ));
        assert!(state.inner.settings.get(&()).await.is_none());
    }

    #[tokio::test]
    async fn test_site_settings_served_from_cache() {
        let state = unreachable_state();
        let cached = SiteSettings {
            store_name: "Corner Oven".to_owned(),
            ..SiteSettings::default()
        };
        state.inner.settings.insert((), cached.clone()).await;
        assert_eq!(state.site_settings().await.unwrap(), cached);
    }
}
