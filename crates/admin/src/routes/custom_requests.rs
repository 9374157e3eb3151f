//! Custom cake requests: triage, quoting and decisions.

use std::str::FromStr;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use hearth_core::analytics::request_status_counts;
use hearth_core::filters::{CustomRequestFilter, filter_custom_requests};
use hearth_core::models::CustomRequest;
use hearth_core::validation::ValidationErrors;
use hearth_core::{CustomRequestId, CustomRequestStatus};

use crate::components::{SelectOption, StatusTab, status_tabs};
use crate::db::CustomRequestRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{CspNonce, RequireAdminAuth, RequireOrderManager};
use crate::models::Flash;
use crate::routes::context::PageContext;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct RequestListQuery {
    pub status: Option<String>,
    pub q: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReviewForm {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub quoted_price: String,
    #[serde(default)]
    pub admin_notes: String,
}

/// Parsed staff decision on a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewUpdate {
    pub status: CustomRequestStatus,
    pub quoted_price: Option<Decimal>,
    pub admin_notes: Option<String>,
}

impl ReviewForm {
    fn from_request(request: &CustomRequest) -> Self {
        Self {
            status: request.status.as_str().to_owned(),
            quoted_price: request
                .quoted_price
                .map(|p| p.to_string())
                .unwrap_or_default(),
            admin_notes: request.admin_notes.clone().unwrap_or_default(),
        }
    }

    /// A quote needs a price; a price is never negative.
    ///
    /// # Errors
    ///
    /// Returns every invalid field.
    pub fn parse(&self) -> std::result::Result<ReviewUpdate, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let status = CustomRequestStatus::from_str(&self.status).unwrap_or_else(|_| {
            errors.add("status", "Choose a status");
            CustomRequestStatus::default()
        });

        let raw_price = self.quoted_price.trim();
        let quoted_price = if raw_price.is_empty() {
            None
        } else {
            match Decimal::from_str(raw_price) {
                Ok(p) if p.is_sign_negative() => {
                    errors.add("quoted_price", "Price cannot be negative");
                    None
                }
                Ok(p) => Some(p.round_dp(2)),
                Err(_) => {
                    errors.add("quoted_price", "Enter a price such as 85.00");
                    None
                }
            }
        };

        if status == CustomRequestStatus::Quoted
            && quoted_price.is_none()
            && !errors.has("quoted_price")
        {
            errors.add("quoted_price", "Enter the quoted price");
        }

        let notes = self.admin_notes.trim();
        errors.into_result()?;
        Ok(ReviewUpdate {
            status,
            quoted_price,
            admin_notes: (!notes.is_empty()).then(|| notes.to_owned()),
        })
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "custom_requests/index.html")]
pub struct CustomRequestsIndexTemplate {
    pub ctx: PageContext,
    pub requests: Vec<CustomRequest>,
    pub tabs: Vec<StatusTab>,
    pub status: String,
    pub q: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "custom_requests/show.html")]
pub struct CustomRequestShowTemplate {
    pub ctx: PageContext,
    pub request: CustomRequest,
    pub form: ReviewForm,
    pub statuses: Vec<SelectOption>,
    pub errors: ValidationErrors,
}

impl CustomRequestShowTemplate {
    fn new(
        ctx: PageContext,
        request: CustomRequest,
        form: ReviewForm,
        errors: ValidationErrors,
    ) -> Self {
        let selected = form.status.parse().ok();
        Self {
            ctx,
            statuses: SelectOption::for_statuses(CustomRequestStatus::ALL, selected),
            request,
            form,
            errors,
        }
    }
}

/// Build the custom requests router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/custom-requests", get(index))
        .route("/custom-requests/{id}", get(show).post(update))
}

/// GET /custom-requests
#[instrument(skip_all)]
async fn index(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ctx: PageContext,
    Query(query): Query<RequestListQuery>,
) -> Result<CustomRequestsIndexTemplate> {
    let requests = CustomRequestRepository::new(state.pool()).list().await?;
    let filter = CustomRequestFilter::from_params(query.status.as_deref(), query.q.as_deref());

    let q = query.q.unwrap_or_default();
    let tabs = status_tabs(
        "/custom-requests",
        &request_status_counts(&requests),
        filter.status,
        &[("q", &q)],
    );

    Ok(CustomRequestsIndexTemplate {
        ctx,
        requests: filter_custom_requests(&requests, &filter)
            .into_iter()
            .cloned()
            .collect(),
        tabs,
        status: filter.status.map(|s| s.as_str().to_owned()).unwrap_or_default(),
        q,
    })
}

async fn load(state: &AppState, id: CustomRequestId) -> Result<CustomRequest> {
    CustomRequestRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("custom request {id}")))
}

/// GET /custom-requests/{id}
#[instrument(skip_all, fields(request_id = %id))]
async fn show(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ctx: PageContext,
    Path(id): Path<CustomRequestId>,
) -> Result<CustomRequestShowTemplate> {
    let request = load(&state, id).await?;
    let form = ReviewForm::from_request(&request);
    Ok(CustomRequestShowTemplate::new(
        ctx,
        request,
        form,
        ValidationErrors::new(),
    ))
}

/// POST /custom-requests/{id}
#[instrument(skip_all, fields(request_id = %id))]
async fn update(
    RequireOrderManager(admin): RequireOrderManager,
    State(state): State<AppState>,
    session: Session,
    CspNonce(nonce): CspNonce,
    Path(id): Path<CustomRequestId>,
    Form(form): Form<ReviewForm>,
) -> Result<Response> {
    let request = load(&state, id).await?;

    let update = match form.parse() {
        Ok(update) => update,
        Err(errors) => {
            let path = format!("/custom-requests/{id}");
            let ctx = PageContext::build(&state, Some(&session), nonce, &path).await;
            return Ok(CustomRequestShowTemplate::new(ctx, request, form, errors).into_response());
        }
    };

    let settings = state.site_settings().await?;
    let previous = request.status;
    let updated = CustomRequestRepository::new(state.pool())
        .update_review(
            id,
            update.status,
            update.quoted_price,
            update.admin_notes.as_deref(),
        )
        .await?;
    tracing::info!(
        admin_id = %admin.id,
        from = %previous,
        to = %updated.status,
        "Custom request updated"
    );

    state
        .notifier()
        .custom_request_updated(&updated, previous, &settings)
        .await;

    Flash::success("Custom request saved").push(&session).await?;
    Ok(Redirect::to(&format!("/custom-requests/{id}")).into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(status: &str, price: &str, notes: &str) -> ReviewForm {
        ReviewForm {
            status: status.to_owned(),
            quoted_price: price.to_owned(),
            admin_notes: notes.to_owned(),
        }
    }

    #[test]
    fn test_quote_requires_price() {
        let errors = form("quoted", "", "").parse().unwrap_err();
        assert!(errors.has("quoted_price"));

        let update = form("quoted", "85", "  Two tiers, fondant  ").parse().unwrap();
        assert_eq!(update.status, CustomRequestStatus::Quoted);
        assert_eq!(update.quoted_price, Some(Decimal::new(85, 0)));
        assert_eq!(update.admin_notes.as_deref(), Some("Two tiers, fondant"));
    }

    #[test]
    fn test_rejects_bad_price_and_status() {
        let errors = form("approved-ish", "-5", "").parse().unwrap_err();
        assert!(errors.has("status"));
        assert!(errors.has("quoted_price"));

        let errors = form("reviewing", "eighty", "").parse().unwrap_err();
        assert_eq!(errors.get("quoted_price"), Some("Enter a price such as 85.00"));
    }

    #[test]
    fn test_blank_fields_are_none() {
        let update = form("rejected", "", "   ").parse().unwrap();
        assert_eq!(update.quoted_price, None);
        assert_eq!(update.admin_notes, None);
    }
}
