//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use chrono::Utc;
use tracing::instrument;

use hearth_core::models::{Announcement, HeroSlide, Product, Testimonial};

use crate::db::{CatalogRepository, ContentRepository, TestimonialRepository};
use crate::error::Result;
use crate::filters;
use crate::routes::context::PageContext;
use crate::state::AppState;

const FEATURED_PRODUCTS: i64 = 8;
const FEATURED_TESTIMONIALS: i64 = 3;

#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct HomeTemplate {
    pub ctx: PageContext,
    pub announcements: Vec<Announcement>,
    pub slides: Vec<HeroSlide>,
    pub featured: Vec<Product>,
    pub testimonials: Vec<Testimonial>,
}

/// Hero slides, live announcements, featured products and testimonials.
///
/// # Errors
///
/// Returns an error if any of the content queries fail.
#[instrument(skip_all)]
pub async fn home(State(state): State<AppState>, ctx: PageContext) -> Result<impl IntoResponse> {
    let pool = state.pool();
    let content = ContentRepository::new(pool);

    let catalog = CatalogRepository::new(pool);
    let testimonial_repo = TestimonialRepository::new(pool);

    let (announcements, slides, featured, testimonials) = tokio::try_join!(
        content.live_announcements(Utc::now()),
        content.hero_slides(),
        catalog.featured(FEATURED_PRODUCTS),
        testimonial_repo.featured(FEATURED_TESTIMONIALS),
    )?;

    Ok(HomeTemplate {
        ctx,
        announcements,
        slides,
        featured,
        testimonials,
    })
}
