//! Catalog and product detail route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use hearth_core::analytics::average_rating;
use hearth_core::models::{Category, Product, Review};
use hearth_core::Rating;

use crate::db::{CatalogRepository, ReviewRepository, WishlistRepository};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::Flash;
use crate::routes::context::PageContext;
use crate::state::AppState;

const MAX_REVIEW_LENGTH: usize = 2000;
const MAX_AUTHOR_LENGTH: usize = 100;

#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    pub category: Option<String>,
    pub q: Option<String>,
}

impl CatalogQuery {
    fn category(&self) -> Option<&str> {
        self.category.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    fn search(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub ctx: PageContext,
    pub categories: Vec<Category>,
    pub products: Vec<Product>,
    pub active_category: Option<String>,
    pub search: String,
}

impl ProductsIndexTemplate {
    #[must_use]
    pub fn is_active(&self, slug: &str) -> bool {
        self.active_category.as_deref() == Some(slug)
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub ctx: PageContext,
    pub product: Product,
    pub reviews: Vec<Review>,
    pub average_rating: Option<Decimal>,
    pub in_wishlist: bool,
}

/// Product listing with optional category filter and search.
///
/// # Errors
///
/// Returns an error if the catalog query fails.
#[instrument(skip(state, ctx))]
pub async fn index(
    State(state): State<AppState>,
    ctx: PageContext,
    Query(query): Query<CatalogQuery>,
) -> Result<impl IntoResponse> {
    let catalog = CatalogRepository::new(state.pool());
    let (categories, products) = tokio::try_join!(
        catalog.categories(),
        catalog.list_products(query.category(), query.search()),
    )?;

    Ok(ProductsIndexTemplate {
        ctx,
        categories,
        products,
        active_category: query.category().map(str::to_owned),
        search: query.search().unwrap_or_default().to_owned(),
    })
}

async fn available_product(state: &AppState, slug: &str) -> Result<Product> {
    CatalogRepository::new(state.pool())
        .get_by_slug(slug)
        .await?
        .filter(|p| p.is_available)
        .ok_or_else(|| AppError::NotFound(format!("product {slug}")))
}

/// Product detail with approved reviews.
///
/// # Errors
///
/// Returns 404 if the product doesn't exist or is unavailable.
#[instrument(skip(state, ctx))]
pub async fn show(
    State(state): State<AppState>,
    ctx: PageContext,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse> {
    let product = available_product(&state, &slug).await?;
    let reviews = ReviewRepository::new(state.pool())
        .approved_for_product(product.id)
        .await?;

    let in_wishlist = match &ctx.user {
        Some(user) => WishlistRepository::new(state.pool())
            .product_ids(user.id)
            .await?
            .contains(&product.id),
        None => false,
    };

    Ok(ProductShowTemplate {
        average_rating: average_rating(reviews.iter().map(|r| r.rating)),
        ctx,
        product,
        reviews,
        in_wishlist,
    })
}

#[derive(Debug, Deserialize)]
pub struct ReviewForm {
    #[serde(default)]
    pub author_name: String,
    pub rating: String,
    #[serde(default)]
    pub comment: String,
}

/// Check a review submission, returning the author, rating and comment.
fn check_review<'a>(
    form: &'a ReviewForm,
    signed_in_name: Option<&'a str>,
) -> std::result::Result<(&'a str, Rating, &'a str), String> {
    let author = signed_in_name.unwrap_or_else(|| form.author_name.trim());
    if author.is_empty() {
        return Err("Please tell us your name".to_owned());
    }
    if author.chars().count() > MAX_AUTHOR_LENGTH {
        return Err(format!("Name must be at most {MAX_AUTHOR_LENGTH} characters"));
    }
    let rating = form
        .rating
        .trim()
        .parse::<i32>()
        .map_err(|_| "Choose a rating from 1 to 5".to_owned())
        .and_then(|r| Rating::new(r).map_err(|e| e.to_string()))?;
    let comment = form.comment.trim();
    if comment.is_empty() {
        return Err("Please write a short review".to_owned());
    }
    if comment.chars().count() > MAX_REVIEW_LENGTH {
        return Err(format!("Reviews must be at most {MAX_REVIEW_LENGTH} characters"));
    }
    Ok((author, rating, comment))
}

/// Submit a review. It is stored as pending until approved in the back office.
///
/// # Errors
///
/// Returns 404 for an unknown product, or an error if the insert fails.
#[instrument(skip(state, session, user, form))]
pub async fn submit_review(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Path(slug): Path<String>,
    Form(form): Form<ReviewForm>,
) -> Result<Response> {
    let product = available_product(&state, &slug).await?;
    let back = format!("/products/{slug}#reviews");

    let (author, rating, comment) = match check_review(&form, user.as_ref().map(|u| u.name.as_str())) {
        Ok(checked) => checked,
        Err(message) => {
            Flash::error(message).push(&session).await?;
            return Ok(Redirect::to(&back).into_response());
        }
    };

    ReviewRepository::new(state.pool())
        .create(product.id, user.as_ref().map(|u| u.id), author, rating, comment)
        .await?;
    tracing::info!(product_id = %product.id, rating = rating.get(), "Review submitted");

    Flash::success("Thanks! Your review will appear once it has been approved.")
        .push(&session)
        .await?;
    Ok(Redirect::to(&back).into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(author: &str, rating: &str, comment: &str) -> ReviewForm {
        ReviewForm {
            author_name: author.to_owned(),
            rating: rating.to_owned(),
            comment: comment.to_owned(),
        }
    }

    #[test]
    fn test_review_rating_bounds() {
        assert!(check_review(&form("Jo", "0", "Nice"), None).is_err());
        assert!(check_review(&form("Jo", "6", "Nice"), None).is_err());
        assert!(check_review(&form("Jo", "five", "Nice"), None).is_err());
        let (_, rating, _) = check_review(&form("Jo", "5", "Nice"), None).unwrap();
        assert_eq!(rating.get(), 5);
    }

    #[test]
    fn test_signed_in_name_wins() {
        let f = form("", "4", "Lovely crumb");
        let (author, _, comment) = check_review(&f, Some("Ada")).unwrap();
        assert_eq!(author, "Ada");
        assert_eq!(comment, "Lovely crumb");
        assert!(check_review(&f, None).is_err());
    }

    #[test]
    fn test_empty_comment_rejected() {
        assert!(check_review(&form("Jo", "3", "   "), None).is_err());
    }

    #[test]
    fn test_blank_query_params_are_ignored() {
        let q = CatalogQuery {
            category: Some("  ".to_owned()),
            q: Some("rye".to_owned()),
        };
        assert_eq!(q.category(), None);
        assert_eq!(q.search(), Some("rye"));
    }
}
