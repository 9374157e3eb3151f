//! Catalog management: products.

use std::str::FromStr;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use hearth_core::models::{Category, Product};
use hearth_core::slug::{is_valid_slug, slugify};
use hearth_core::validation::ValidationErrors;
use hearth_core::{CategoryId, ProductId};

use crate::db::catalog::ProductInput;
use crate::db::{CatalogRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{CspNonce, RequireAdminAuth, RequireEditor};
use crate::models::Flash;
use crate::routes::context::PageContext;
use crate::state::AppState;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductForm {
    #[serde(default)]
    pub name: String,
    /// Blank means "derive from the name".
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub category_id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub image_url: String,
    pub is_available: Option<String>,
    pub is_featured: Option<String>,
}

/// Validated product fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedProduct {
    pub category_id: Option<CategoryId>,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub is_available: bool,
    pub is_featured: bool,
}

impl ParsedProduct {
    fn as_input(&self) -> ProductInput<'_> {
        ProductInput {
            category_id: self.category_id,
            name: &self.name,
            slug: &self.slug,
            description: &self.description,
            price: self.price,
            image_url: self.image_url.as_deref(),
            is_available: self.is_available,
            is_featured: self.is_featured,
        }
    }
}

impl ProductForm {
    fn blank() -> Self {
        Self {
            is_available: Some("on".to_owned()),
            ..Self::default()
        }
    }

    fn from_product(p: &Product) -> Self {
        Self {
            name: p.name.clone(),
            slug: p.slug.clone(),
            category_id: p.category_id.map(|c| c.to_string()).unwrap_or_default(),
            description: p.description.clone(),
            price: p.price.to_string(),
            image_url: p.image_url.clone().unwrap_or_default(),
            is_available: p.is_available.then(|| "on".to_owned()),
            is_featured: p.is_featured.then(|| "on".to_owned()),
        }
    }

    /// # Errors
    ///
    /// Returns every invalid field.
    pub fn parse(&self) -> std::result::Result<ParsedProduct, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.add("name", "Name is required");
        }

        let slug = match self.slug.trim() {
            "" => slugify(name),
            given => given.to_lowercase(),
        };
        if !name.is_empty() && !is_valid_slug(&slug) {
            errors.add(
                "slug",
                "Use lowercase letters, numbers and hyphens only",
            );
        }

        let price = match Decimal::from_str(self.price.trim()) {
            Ok(p) if p.is_sign_negative() || p.is_zero() => {
                errors.add("price", "Price must be more than zero");
                Decimal::ZERO
            }
            Ok(p) => p.round_dp(2),
            Err(_) => {
                errors.add("price", "Enter a price such as 24.50");
                Decimal::ZERO
            }
        };

        let category_id = match self.category_id.trim() {
            "" => None,
            raw => raw.parse().map_or_else(
                |_| {
                    errors.add("category_id", "Choose a category");
                    None
                },
                Some,
            ),
        };

        let image_url = Some(self.image_url.trim())
            .filter(|u| !u.is_empty())
            .map(str::to_owned);
        if image_url
            .as_deref()
            .is_some_and(|u| !u.starts_with("https://") && !u.starts_with("http://"))
        {
            errors.add("image_url", "Image must be a web address");
        }

        errors.into_result()?;
        Ok(ParsedProduct {
            category_id,
            name: name.to_owned(),
            slug,
            description: self.description.trim().to_owned(),
            price,
            image_url,
            is_available: self.is_available.is_some(),
            is_featured: self.is_featured.is_some(),
        })
    }
}

/// A product row with its category name resolved.
#[derive(Debug, Clone)]
pub struct ProductRow {
    pub product: Product,
    pub category: Option<String>,
}

#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub ctx: PageContext,
    pub products: Vec<ProductRow>,
}

#[derive(Template, WebTemplate)]
#[template(path = "products/form.html")]
pub struct ProductFormTemplate {
    pub ctx: PageContext,
    pub id: Option<ProductId>,
    pub form: ProductForm,
    pub categories: Vec<Category>,
    pub errors: ValidationErrors,
}

impl ProductFormTemplate {
    fn action(&self) -> String {
        self.id.map_or_else(
            || "/products/new".to_owned(),
            |id| format!("/products/{id}/edit"),
        )
    }

    fn category_selected(&self, category: &Category) -> bool {
        self.form.category_id.trim() == category.id.to_string()
    }
}

/// Build the products router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(index))
        .route("/products/new", get(new_form).post(create))
        .route("/products/{id}/edit", get(edit_form).post(update))
        .route("/products/{id}/delete", post(delete))
}

async fn render_form(
    state: &AppState,
    ctx: PageContext,
    id: Option<ProductId>,
    form: ProductForm,
    errors: ValidationErrors,
) -> Result<ProductFormTemplate> {
    let categories = CatalogRepository::new(state.pool()).categories().await?;
    Ok(ProductFormTemplate {
        ctx,
        id,
        form,
        categories,
        errors,
    })
}

/// Turn a slug conflict into a form error; pass anything else through.
fn slug_conflict(
    e: RepositoryError,
) -> std::result::Result<ValidationErrors, AppError> {
    match e {
        RepositoryError::Conflict(_) => {
            let mut errors = ValidationErrors::new();
            errors.add("slug", "Another product already uses this slug");
            Ok(errors)
        }
        other => Err(other.into()),
    }
}

/// GET /products
#[instrument(skip_all)]
async fn index(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ctx: PageContext,
) -> Result<ProductsIndexTemplate> {
    let repo = CatalogRepository::new(state.pool());
    let categories = repo.categories().await?;
    let products = repo
        .products()
        .await?
        .into_iter()
        .map(|product| ProductRow {
            category: product.category_id.and_then(|cid| {
                categories
                    .iter()
                    .find(|c| c.id == cid)
                    .map(|c| c.name.clone())
            }),
            product,
        })
        .collect();

    Ok(ProductsIndexTemplate { ctx, products })
}

/// GET /products/new
#[instrument(skip_all)]
async fn new_form(
    RequireEditor(_admin): RequireEditor,
    State(state): State<AppState>,
    ctx: PageContext,
) -> Result<ProductFormTemplate> {
    render_form(&state, ctx, None, ProductForm::blank(), ValidationErrors::new()).await
}

/// POST /products/new
#[instrument(skip_all)]
async fn create(
    RequireEditor(admin): RequireEditor,
    State(state): State<AppState>,
    session: Session,
    CspNonce(nonce): CspNonce,
    Form(form): Form<ProductForm>,
) -> Result<Response> {
    let errors = match form.parse() {
        Ok(parsed) => match CatalogRepository::new(state.pool())
            .create_product(&parsed.as_input())
            .await
        {
            Ok(product) => {
                tracing::info!(admin_id = %admin.id, product_id = %product.id, "Product created");
                Flash::success(format!("{} added to the catalog", product.name))
                    .push(&session)
                    .await?;
                return Ok(Redirect::to("/products").into_response());
            }
            Err(e) => slug_conflict(e)?,
        },
        Err(errors) => errors,
    };

    let ctx = PageContext::build(&state, Some(&session), nonce, "/products/new").await;
    Ok(render_form(&state, ctx, None, form, errors)
        .await?
        .into_response())
}

/// GET /products/{id}/edit
#[instrument(skip_all, fields(product_id = %id))]
async fn edit_form(
    RequireEditor(_admin): RequireEditor,
    State(state): State<AppState>,
    ctx: PageContext,
    Path(id): Path<ProductId>,
) -> Result<ProductFormTemplate> {
    let product = CatalogRepository::new(state.pool())
        .product(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;
    render_form(
        &state,
        ctx,
        Some(id),
        ProductForm::from_product(&product),
        ValidationErrors::new(),
    )
    .await
}

/// POST /products/{id}/edit
#[instrument(skip_all, fields(product_id = %id))]
async fn update(
    RequireEditor(admin): RequireEditor,
    State(state): State<AppState>,
    session: Session,
    CspNonce(nonce): CspNonce,
    Path(id): Path<ProductId>,
    Form(form): Form<ProductForm>,
) -> Result<Response> {
    let errors = match form.parse() {
        Ok(parsed) => match CatalogRepository::new(state.pool())
            .update_product(id, &parsed.as_input())
            .await
        {
            Ok(product) => {
                tracing::info!(admin_id = %admin.id, "Product updated");
                Flash::success(format!("{} saved", product.name))
                    .push(&session)
                    .await?;
                return Ok(Redirect::to("/products").into_response());
            }
            Err(e) => slug_conflict(e)?,
        },
        Err(errors) => errors,
    };

    let path = format!("/products/{id}/edit");
    let ctx = PageContext::build(&state, Some(&session), nonce, &path).await;
    Ok(render_form(&state, ctx, Some(id), form, errors)
        .await?
        .into_response())
}

/// POST /products/{id}/delete
#[instrument(skip_all, fields(product_id = %id))]
async fn delete(
    RequireEditor(admin): RequireEditor,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<ProductId>,
) -> Result<Response> {
    CatalogRepository::new(state.pool()).delete_product(id).await?;
    tracing::info!(admin_id = %admin.id, "Product deleted");

    Flash::success("Product deleted").push(&session).await?;
    Ok(Redirect::to("/products").into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(name: &str, slug: &str, price: &str) -> ProductForm {
        ProductForm {
            name: name.to_owned(),
            slug: slug.to_owned(),
            price: price.to_owned(),
            ..ProductForm::blank()
        }
    }

    #[test]
    fn test_blank_slug_is_derived_from_name() {
        let parsed = form("Lemon Drizzle Loaf", "", "12.5").parse().unwrap();
        assert_eq!(parsed.slug, "lemon-drizzle-loaf");
        assert_eq!(parsed.price, Decimal::new(1250, 2));
        assert!(parsed.is_available);
        assert!(!parsed.is_featured);
        assert_eq!(parsed.category_id, None);
    }

    #[test]
    fn test_price_must_be_positive() {
        assert!(form("Scone", "", "0").parse().unwrap_err().has("price"));
        assert!(form("Scone", "", "-1").parse().unwrap_err().has("price"));
        assert!(form("Scone", "", "abc").parse().unwrap_err().has("price"));
    }

    #[test]
    fn test_invalid_slug_and_category() {
        let mut f = form("Scone", "Has Spaces", "3");
        f.category_id = "bread".to_owned();
        let errors = f.parse().unwrap_err();
        assert!(errors.has("slug"));
        assert!(errors.has("category_id"));
    }
}
