//! Order workflow: list, detail, status changes and deletion.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use hearth_core::OrderId;
use hearth_core::OrderStatus;
use hearth_core::analytics::status_counts;
use hearth_core::filters::{OrderFilter, filter_orders};
use hearth_core::models::{Order, OrderItem};

use crate::components::{SelectOption, StatusTab, status_tabs};
use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{RequireAdminAuth, RequireOrderManager};
use crate::models::Flash;
use crate::routes::context::PageContext;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct OrderListQuery {
    pub status: Option<String>,
    pub q: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusForm {
    #[serde(default)]
    pub status: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct OrdersIndexTemplate {
    pub ctx: PageContext,
    pub orders: Vec<Order>,
    pub tabs: Vec<StatusTab>,
    pub status: String,
    pub q: String,
    pub from: String,
    pub to: String,
    pub filtered: bool,
}

#[derive(Template, WebTemplate)]
#[template(path = "orders/show.html")]
pub struct OrderShowTemplate {
    pub ctx: PageContext,
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub transitions: Vec<SelectOption>,
}

/// Build the orders router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(index))
        .route("/orders/{id}", get(show))
        .route("/orders/{id}/status", post(update_status))
        .route("/orders/{id}/delete", post(delete))
}

/// GET /orders
#[instrument(skip_all)]
async fn index(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ctx: PageContext,
    Query(query): Query<OrderListQuery>,
) -> Result<OrdersIndexTemplate> {
    let orders = OrderRepository::new(state.pool()).list().await?;
    let filter = OrderFilter::from_params(
        query.status.as_deref(),
        query.q.as_deref(),
        query.from.as_deref(),
        query.to.as_deref(),
    );

    let q = query.q.unwrap_or_default();
    let from = query.from.unwrap_or_default();
    let to = query.to.unwrap_or_default();
    let tabs = status_tabs(
        "/orders",
        &status_counts(&orders),
        filter.status,
        &[("q", &q), ("from", &from), ("to", &to)],
    );

    Ok(OrdersIndexTemplate {
        ctx,
        orders: filter_orders(&orders, &filter).into_iter().cloned().collect(),
        tabs,
        status: filter.status.map(|s| s.as_str().to_owned()).unwrap_or_default(),
        filtered: filter.is_active(),
        q,
        from,
        to,
    })
}

/// GET /orders/{id}
#[instrument(skip_all, fields(order_id = %id))]
async fn show(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ctx: PageContext,
    Path(id): Path<OrderId>,
) -> Result<OrderShowTemplate> {
    let repo = OrderRepository::new(state.pool());
    let order = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;
    let items = repo.items(id).await?;
    let transitions = SelectOption::order_transitions(order.status);

    Ok(OrderShowTemplate {
        ctx,
        order,
        items,
        transitions,
    })
}

/// Parse a requested status and check the move is allowed.
fn parse_transition(current: OrderStatus, raw: &str) -> std::result::Result<OrderStatus, String> {
    let next: OrderStatus = raw
        .parse()
        .map_err(|_| format!("Unknown order status \"{}\"", raw.trim()))?;
    if current.can_transition_to(next) {
        Ok(next)
    } else {
        Err(format!(
            "An order that is {} cannot be moved to {}",
            current.label().to_lowercase(),
            next.label().to_lowercase()
        ))
    }
}

/// POST /orders/{id}/status
#[instrument(skip_all, fields(order_id = %id))]
async fn update_status(
    RequireOrderManager(admin): RequireOrderManager,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<OrderId>,
    Form(form): Form<StatusForm>,
) -> Result<Response> {
    let repo = OrderRepository::new(state.pool());
    let order = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    let next = match parse_transition(order.status, &form.status) {
        Ok(next) => next,
        Err(message) => {
            Flash::error(message).push(&session).await?;
            return Ok(Redirect::to(&format!("/orders/{id}")).into_response());
        }
    };

    let settings = state.site_settings().await?;
    let updated = repo.update_status(id, next).await?;
    tracing::info!(
        admin_id = %admin.id,
        from = %order.status,
        to = %updated.status,
        "Order status changed"
    );

    state
        .notifier()
        .order_status_changed(&updated, &settings)
        .await;

    Flash::success(format!(
        "Order {} marked {}",
        updated.order_number,
        updated.status.label().to_lowercase()
    ))
    .push(&session)
    .await?;
    Ok(Redirect::to(&format!("/orders/{id}")).into_response())
}

/// POST /orders/{id}/delete
#[instrument(skip_all, fields(order_id = %id))]
async fn delete(
    RequireOrderManager(admin): RequireOrderManager,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<OrderId>,
) -> Result<Response> {
    OrderRepository::new(state.pool()).delete(id).await?;
    tracing::info!(admin_id = %admin.id, "Order deleted");

    Flash::success("Order deleted").push(&session).await?;
    Ok(Redirect::to("/orders").into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_transition_accepts_open_moves() {
        assert_eq!(
            parse_transition(OrderStatus::Pending, "confirmed").unwrap(),
            OrderStatus::Confirmed
        );
        assert_eq!(
            parse_transition(OrderStatus::Ready, "out_for_delivery").unwrap(),
            OrderStatus::OutForDelivery
        );
        // Staff may step back to correct a mistake.
        assert_eq!(
            parse_transition(OrderStatus::Baking, "confirmed").unwrap(),
            OrderStatus::Confirmed
        );
    }

    #[test]
    fn test_parse_transition_rejects_terminal_and_unknown() {
        let err = parse_transition(OrderStatus::Delivered, "pending").unwrap_err();
        assert_eq!(err, "An order that is delivered cannot be moved to pending");

        assert!(parse_transition(OrderStatus::Pending, "pending").is_err());
        assert!(parse_transition(OrderStatus::Pending, "teleported").is_err());
    }
}
