//! CMS pages edited in the back office.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use tracing::instrument;

use crate::content::RenderedPage;
use crate::db::ContentRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::routes::context::PageContext;
use crate::state::AppState;

#[derive(Template, WebTemplate)]
#[template(path = "pages/content.html")]
pub struct ContentPageTemplate {
    pub ctx: PageContext,
    pub page: RenderedPage,
}

/// Render a published page such as `about` or `faq`.
///
/// # Errors
///
/// Returns 404 if the page doesn't exist or is unpublished.
#[instrument(skip(state, ctx))]
pub async fn show(
    State(state): State<AppState>,
    ctx: PageContext,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse> {
    let page = ContentRepository::new(state.pool())
        .published_page(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("page {slug}")))?;

    Ok(ContentPageTemplate {
        ctx,
        page: RenderedPage::from(page),
    })
}
