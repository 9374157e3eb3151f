//! Data every full page needs: the layout context.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tower_sessions::Session;

use hearth_core::pricing::SiteSettings;

use crate::middleware::CspNonce;
use crate::models::{Cart, CurrentUser, Flash, session_keys};
use crate::state::AppState;

/// Header, footer and toast data rendered by `base.html`.
///
/// Extracting it consumes the pending flash message, so only handlers that
/// render a full page should take it.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub nonce: String,
    pub settings: SiteSettings,
    pub user: Option<CurrentUser>,
    pub flash: Option<Flash>,
    pub cart_count: u32,
}

impl PageContext {
    /// Format an amount in the store currency.
    #[must_use]
    pub fn money(&self, amount: &rust_decimal::Decimal) -> String {
        self.settings.format(*amount)
    }

    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }
}

impl PageContext {
    /// Assemble the context directly, for handlers that must touch the
    /// session (and possibly queue a flash message) before rendering.
    pub async fn build(state: &AppState, session: Option<&Session>, nonce: String) -> Self {
        // Header and money formatting only; handlers that price or submit
        // read `AppState::site_settings` and fail on error.
        let settings = state.site_settings().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load site settings for layout");
            SiteSettings::default()
        });
        let (user, flash, cart_count) = match session {
            Some(session) => {
                let user = session
                    .get::<CurrentUser>(session_keys::CURRENT_USER)
                    .await
                    .ok()
                    .flatten();
                let flash = Flash::take(session).await;
                let cart_count = Cart::load(session).await.map_or(0, |c| c.item_count());
                (user, flash, cart_count)
            }
            None => (None, None, 0),
        };

        Self {
            nonce,
            settings,
            user,
            flash,
            cart_count,
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
        Ok(Self::build(state, session.as_ref(), nonce).await)
    }
}
