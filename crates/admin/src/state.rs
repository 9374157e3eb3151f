//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use hearth_core::pricing::SiteSettings;

use crate::config::AdminConfig;
use crate::db::{RepositoryError, SettingsRepository};
use crate::services::{EmailService, ImageHostClient, Notifier};

/// Cheaply cloneable handle to the pool, configuration and outbound clients.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
    email: Option<EmailService>,
    image_host: Option<ImageHostClient>,
}

impl AppState {
    /// Build state. Email and uploads are enabled when configured; a client
    /// that fails to build is disabled with a warning.
    #[must_use]
    pub fn new(config: AdminConfig, pool: PgPool) -> Self {
        let email = config.email.as_ref().and_then(|c| {
            EmailService::new(c, config.storefront_url())
                .inspect_err(|e| tracing::warn!(error = %e, "Email disabled: SMTP setup failed"))
                .ok()
        });
        let image_host = config.image_host.as_ref().and_then(|c| {
            ImageHostClient::new(c)
                .inspect_err(|e| tracing::warn!(error = %e, "Image uploads disabled"))
                .ok()
        });

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                email,
                image_host,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    #[must_use]
    pub fn image_host(&self) -> Option<&ImageHostClient> {
        self.inner.image_host.as_ref()
    }

    /// Current site settings, read fresh so edits show immediately.
    ///
    /// # Errors
    ///
    /// Returns the repository error when the row cannot be read or parsed.
    pub async fn site_settings(&self) -> Result<SiteSettings, RepositoryError> {
        SettingsRepository::new(&self.inner.pool).site_settings().await
    }

    #[must_use]
    pub fn notifier(&self) -> Notifier<'_> {
        Notifier::new(&self.inner.pool, self.inner.email.as_ref())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use secrecy::SecretString;
    use sqlx::postgres::PgPoolOptions;

    use super::*;

    fn unreachable_state() -> AppState {
        let config = AdminConfig {
            database_url: SecretString::from("postgres://hearth@127.0.0.1:1/hearth"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3001,
            base_url: "http://localhost:3001".to_string(),
            storefront_url: None,
            session_secret: SecretString::from("x".repeat(32)),
            email: None,
            image_host: None,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
            tls: None,
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
    }
}
