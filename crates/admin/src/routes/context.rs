//! Layout context for back office pages.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use rust_decimal::Decimal;
use tower_sessions::Session;

use hearth_core::pricing::SiteSettings;

use crate::middleware::CspNonce;
use crate::models::{CurrentAdmin, Flash, session_keys};
use crate::state::AppState;

/// Sidebar, header and toast data rendered by `base.html`.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub nonce: String,
    pub admin: Option<CurrentAdmin>,
    pub flash: Option<Flash>,
    pub settings: SiteSettings,
    pub current_path: String,
    /// An image host is configured, so forms show an upload button.
    pub uploads_enabled: bool,
    /// Public site root, for "view on site" links.
    pub storefront_url: String,
}

impl PageContext {
    /// Format an amount in the store currency.
    #[must_use]
    pub fn money(&self, amount: &Decimal) -> String {
        self.settings.format(*amount)
    }

    /// Highlight a sidebar entry when the current path sits under `prefix`.
    #[must_use]
    pub fn nav_active(&self, prefix: &str) -> bool {
        if prefix == "/" {
            self.current_path == "/"
        } else {
            self.current_path.starts_with(prefix)
        }
    }

    #[must_use]
    pub fn can_edit(&self) -> bool {
        self.admin.as_ref().is_some_and(CurrentAdmin::can_edit)
    }

    #[must_use]
    pub fn can_manage_orders(&self) -> bool {
        self.admin.as_ref().is_some_and(CurrentAdmin::can_manage_orders)
    }

    #[must_use]
    pub fn can_manage_users(&self) -> bool {
        self.admin.as_ref().is_some_and(CurrentAdmin::can_manage_users)
    }

    /// Assemble the context for a handler that re-renders a form after a
    /// failed POST.
    pub async fn build(
        state: &AppState,
        session: Option<&Session>,
        nonce: String,
        current_path: &str,
    ) -> Self {
        // Header and money formatting only; pages that act on settings read
        // them through `AppState::site_settings` and fail on error.
        let settings = state.site_settings().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load site settings for layout");
            SiteSettings::default()
        });

        let (admin, flash) = match session {
            Some(session) => {
                let admin = session
                    .get::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
                    .await
                    .ok()
                    .flatten();
                (admin, Flash::take(session).await)
            }
            None => (None, None),
        };

        Self {
            nonce,
            admin,
            flash,
            settings,
            current_path: current_path.to_owned(),
            uploads_enabled: state.image_host().is_some(),
            storefront_url: state.config().storefront_url().to_owned(),
        }
    }
}

impl FromRequestParts<AppState> for PageContext {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let nonce = parts
            .extensions
            .get::<CspNonce>()
            .map(|n| n.value().to_owned())
            .unwrap_or_default();
        let session = parts.extensions.get::<Session>().cloned();
        let path = parts.uri.path().to_owned();
        Ok(Self::build(state, session.as_ref(), nonce, &path).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(path: &str) -> PageContext {
        PageContext {
            nonce: String::new(),
            admin: None,
            flash: None,
            settings: SiteSettings::default(),
            current_path: path.to_owned(),
            uploads_enabled: false,
            storefront_url: "http://localhost:3000".to_owned(),
        }
    }

    #[test]
    fn test_nav_active() {
        assert!(ctx("/").nav_active("/"));
        assert!(!ctx("/orders").nav_active("/"));
        assert!(ctx("/orders/4").nav_active("/orders"));
        assert!(ctx("/content/pages/about").nav_active("/content"));
    }

    #[test]
    fn test_permissions_without_admin() {
        let c = ctx("/");
        assert!(!c.can_edit());
        assert!(!c.can_manage_orders());
        assert!(!c.can_manage_users());
    }
}
