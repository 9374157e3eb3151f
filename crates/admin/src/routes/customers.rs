//! Customer list with order totals.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;
use tracing::instrument;

use crate::db::CustomerRepository;
use crate::db::customers::CustomerSummary;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::routes::context::PageContext;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CustomerQuery {
    pub q: Option<String>,
}

#[derive(Template, WebTemplate)]
#[template(path = "customers.html")]
pub struct CustomersTemplate {
    pub ctx: PageContext,
    pub customers: Vec<CustomerSummary>,
    pub q: String,
}

/// Build the customers router.
pub fn router() -> Router<AppState> {
    Router::new().route("/customers", get(index))
}

/// GET /customers
#[instrument(skip_all)]
async fn index(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ctx: PageContext,
    Query(query): Query<CustomerQuery>,
) -> Result<CustomersTemplate> {
    let q = query.q.unwrap_or_default().trim().to_owned();
    let search = (!q.is_empty()).then_some(q.as_str());
    let customers = CustomerRepository::new(state.pool()).list(search).await?;

    Ok(CustomersTemplate { ctx, customers, q })
}
