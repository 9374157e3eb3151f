//! JSON endpoints called from back office pages.

pub mod uploads;

use axum::Router;

use crate::state::AppState;

/// Build the complete API router.
pub fn router() -> Router<AppState> {
    Router::new().merge(uploads::router())
}
