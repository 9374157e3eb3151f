//! Catalog management: categories.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use hearth_core::CategoryId;
use hearth_core::slug::slugify;

use crate::db::{CatalogRepository, RepositoryError};
use crate::db::catalog::CategorySummary;
use crate::error::Result;
use crate::filters;
use crate::middleware::{RequireAdminAuth, RequireEditor};
use crate::models::Flash;
use crate::routes::context::PageContext;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CategoryForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub sort_order: String,
}

/// Validated category fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCategory {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub sort_order: i32,
}

impl CategoryForm {
    /// A blank sort order reads as 0.
    ///
    /// # Errors
    ///
    /// Returns a message for the first problem found.
    pub fn parse(&self) -> std::result::Result<ParsedCategory, String> {
        let name = self.name.trim();
        let slug = slugify(name);
        if slug.is_empty() {
            return Err("Category name needs at least one letter or number".to_owned());
        }
        let sort_order = match self.sort_order.trim() {
            "" => 0,
            raw => raw
                .parse()
                .map_err(|_| "Sort order must be a whole number".to_owned())?,
        };
        let description = self.description.trim();
        Ok(ParsedCategory {
            name: name.to_owned(),
            slug,
            description: (!description.is_empty()).then(|| description.to_owned()),
            sort_order,
        })
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "categories/index.html")]
pub struct CategoriesTemplate {
    pub ctx: PageContext,
    pub categories: Vec<CategorySummary>,
}

/// Build the categories router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(index).post(create))
        .route("/categories/{id}/delete", post(delete))
}

/// GET /categories
#[instrument(skip_all)]
async fn index(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ctx: PageContext,
) -> Result<CategoriesTemplate> {
    let categories = CatalogRepository::new(state.pool())
        .category_summaries()
        .await?;
    Ok(CategoriesTemplate { ctx, categories })
}

/// POST /categories
#[instrument(skip_all)]
async fn create(
    RequireEditor(admin): RequireEditor,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CategoryForm>,
) -> Result<Response> {
    let flash = match form.parse() {
        Ok(parsed) => match CatalogRepository::new(state.pool())
            .create_category(
                &parsed.name,
                &parsed.slug,
                parsed.description.as_deref(),
                parsed.sort_order,
            )
            .await
        {
            Ok(category) => {
                tracing::info!(admin_id = %admin.id, category_id = %category.id, "Category created");
                Flash::success(format!("Category {} added", category.name))
            }
            Err(RepositoryError::Conflict(_)) => {
                Flash::error(format!("A category called {} already exists", parsed.name))
            }
            Err(e) => return Err(e.into()),
        },
        Err(message) => Flash::error(message),
    };

    flash.push(&session).await?;
    Ok(Redirect::to("/categories").into_response())
}

/// POST /categories/{id}/delete
#[instrument(skip_all, fields(category_id = %id))]
async fn delete(
    RequireEditor(admin): RequireEditor,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<CategoryId>,
) -> Result<Response> {
    CatalogRepository::new(state.pool()).delete_category(id).await?;
    tracing::info!(admin_id = %admin.id, "Category deleted");

    Flash::success("Category deleted; its products are now uncategorised")
        .push(&session)
        .await?;
    Ok(Redirect::to("/categories").into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(name: &str, sort: &str) -> CategoryForm {
        CategoryForm {
            name: name.to_owned(),
            description: String::new(),
            sort_order: sort.to_owned(),
        }
    }

    #[test]
    fn test_parse_category() {
        let parsed = form(" Celebration Cakes ", "").parse().unwrap();
        assert_eq!(parsed.name, "Celebration Cakes");
        assert_eq!(parsed.slug, "celebration-cakes");
        assert_eq!(parsed.sort_order, 0);
        assert_eq!(parsed.description, None);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(form("!!!", "").parse().is_err());
        assert_eq!(
            form("Bread", "first").parse().unwrap_err(),
            "Sort order must be a whole number"
        );
    }
}
