//! Dashboard route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Router, extract::State, routing::get};
use chrono::Utc;
use tracing::instrument;

use hearth_core::analytics::{OrderStats, status_counts};
use hearth_core::models::{CustomRequest, Order};
use hearth_core::{ModerationStatus, OrderStatus};

use crate::db::{CustomRequestRepository, OrderRepository, ReviewRepository, TestimonialRepository};
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::routes::context::PageContext;
use crate::state::AppState;

const RECENT_ORDERS: usize = 8;

#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub ctx: PageContext,
    pub stats: OrderStats,
    pub status_counts: Vec<(OrderStatus, usize)>,
    pub recent_orders: Vec<Order>,
    pub pending_requests: Vec<CustomRequest>,
    pub pending_reviews: usize,
    pub pending_testimonials: usize,
}

/// Build the dashboard router.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(index))
}

/// GET /
#[instrument(skip_all)]
async fn index(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ctx: PageContext,
) -> Result<DashboardTemplate> {
    let pool = state.pool();
    let orders = OrderRepository::new(pool).list().await?;
    let requests = CustomRequestRepository::new(pool).list().await?;
    let reviews = ReviewRepository::new(pool).list().await?;
    let testimonials = TestimonialRepository::new(pool).list().await?;

    let stats = OrderStats::compute(&orders, Utc::now().date_naive());
    let counts = status_counts(&orders);
    let pending_requests = requests
        .into_iter()
        .filter(|r| r.status.is_open())
        .collect();
    let pending_reviews = reviews
        .iter()
        .filter(|r| r.review.status == ModerationStatus::Pending)
        .count();
    let pending_testimonials = testimonials
        .iter()
        .filter(|t| t.status == ModerationStatus::Pending)
        .count();

    Ok(DashboardTemplate {
        ctx,
        stats,
        status_counts: counts,
        recent_orders: orders.into_iter().take(RECENT_ORDERS).collect(),
        pending_requests,
        pending_reviews,
        pending_testimonials,
    })
}
