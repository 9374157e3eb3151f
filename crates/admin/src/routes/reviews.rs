//! Product review moderation.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use rust_decimal::Decimal;
use tower_sessions::Session;
use tracing::instrument;

use hearth_core::analytics::{average_rating, moderation_counts};
use hearth_core::filters::{ModerationFilter, Moderated};
use hearth_core::{ModerationStatus, ReviewId};

use crate::components::{StatusTab, status_tabs};
use crate::db::ReviewRepository;
use crate::db::reviews::ReviewWithProduct;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{RequireAdminAuth, RequireEditor};
use crate::models::Flash;
use crate::routes::context::PageContext;
use crate::routes::testimonials::{ModerationQuery, StatusForm};
use crate::state::AppState;

impl Moderated for ReviewWithProduct {
    fn moderation_status(&self) -> ModerationStatus {
        self.review.status
    }

    fn search_fields(&self) -> [&str; 2] {
        [self.review.author_name.as_str(), self.review.comment.as_str()]
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "reviews/index.html")]
pub struct ReviewsIndexTemplate {
    pub ctx: PageContext,
    pub reviews: Vec<ReviewWithProduct>,
    pub tabs: Vec<StatusTab>,
    pub q: String,
    /// Mean of approved ratings.
    pub average: Option<Decimal>,
}

/// Build the reviews router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/reviews", get(index))
        .route("/reviews/{id}/status", post(set_status))
        .route("/reviews/{id}/delete", post(delete))
}

/// GET /reviews
#[instrument(skip_all)]
async fn index(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ctx: PageContext,
    Query(query): Query<ModerationQuery>,
) -> Result<ReviewsIndexTemplate> {
    let reviews = ReviewRepository::new(state.pool()).list().await?;
    let filter = ModerationFilter::from_params(query.status.as_deref(), query.q.as_deref());

    let average = average_rating(
        reviews
            .iter()
            .filter(|r| r.review.status.is_public())
            .map(|r| r.review.rating),
    );
    let q = query.q.unwrap_or_default();
    let tabs = status_tabs(
        "/reviews",
        &moderation_counts(&reviews),
        filter.status,
        &[("q", &q)],
    );

    Ok(ReviewsIndexTemplate {
        ctx,
        reviews: filter.apply(&reviews).into_iter().cloned().collect(),
        tabs,
        q,
        average,
    })
}

/// POST /reviews/{id}/status
#[instrument(skip_all, fields(review_id = %id))]
async fn set_status(
    RequireEditor(admin): RequireEditor,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<ReviewId>,
    Form(form): Form<StatusForm>,
) -> Result<Response> {
    let status: ModerationStatus = form
        .status
        .parse()
        .map_err(|_| AppError::BadRequest(format!("unknown status {}", form.status)))?;

    ReviewRepository::new(state.pool()).set_status(id, status).await?;
    tracing::info!(admin_id = %admin.id, status = %status, "Review moderated");

    Flash::success(format!("Review {}", status.label().to_lowercase()))
        .push(&session)
        .await?;
    Ok(Redirect::to("/reviews").into_response())
}

/// POST /reviews/{id}/delete
#[instrument(skip_all, fields(review_id = %id))]
async fn delete(
    RequireEditor(admin): RequireEditor,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<ReviewId>,
) -> Result<Response> {
    ReviewRepository::new(state.pool()).delete(id).await?;
    tracing::info!(admin_id = %admin.id, "Review deleted");

    Flash::success("Review deleted").push(&session).await?;
    Ok(Redirect::to("/reviews").into_response())
}
