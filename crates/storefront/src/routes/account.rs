//! Account route handlers. Every route requires a signed-in customer.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use hearth_core::models::{Customer, CustomRequest, Notification, Order, OrderItem, WishlistEntry};
use hearth_core::{NotificationId, Phone, ProductId};

use crate::db::{
    CatalogRepository, CustomRequestRepository, NotificationRepository, OrderRepository,
    UserRepository, WishlistRepository,
};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{CurrentUser, Flash, session_keys};
use crate::routes::context::PageContext;
use crate::state::AppState;

const RECENT_ORDERS: usize = 5;
const MAX_NAME_LENGTH: usize = 100;

// =============================================================================
// Templates
// =============================================================================

#[derive(Template, WebTemplate)]
#[template(path = "account/index.html")]
pub struct AccountIndexTemplate {
    pub ctx: PageContext,
    pub customer: Customer,
    pub recent_orders: Vec<Order>,
    pub unread_notifications: i64,
    pub wishlist_count: usize,
}

#[derive(Template, WebTemplate)]
#[template(path = "account/orders.html")]
pub struct OrdersTemplate {
    pub ctx: PageContext,
    pub orders: Vec<Order>,
}

#[derive(Template, WebTemplate)]
#[template(path = "account/order.html")]
pub struct OrderTemplate {
    pub ctx: PageContext,
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Template, WebTemplate)]
#[template(path = "account/custom_requests.html")]
pub struct CustomRequestsTemplate {
    pub ctx: PageContext,
    pub requests: Vec<CustomRequest>,
}

#[derive(Template, WebTemplate)]
#[template(path = "account/wishlist.html")]
pub struct WishlistTemplate {
    pub ctx: PageContext,
    pub entries: Vec<WishlistEntry>,
}

#[derive(Template, WebTemplate)]
#[template(path = "account/notifications.html")]
pub struct NotificationsTemplate {
    pub ctx: PageContext,
    pub notifications: Vec<Notification>,
}

#[derive(Template, WebTemplate)]
#[template(path = "partials/wishlist_button.html")]
pub struct WishlistButtonTemplate {
    pub product_id: ProductId,
    pub in_wishlist: bool,
}

// =============================================================================
// Overview and profile
// =============================================================================

/// Account overview.
///
/// # Errors
///
/// Returns an error if a query fails, or 404 if the account was deleted.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ctx: PageContext,
) -> Result<impl IntoResponse> {
    let pool = state.pool();
    let customer = UserRepository::new(pool)
        .get_by_id(user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("account".to_owned()))?;

    let orders = OrderRepository::new(pool);
    let notifications = NotificationRepository::new(pool);
    let wishlists = WishlistRepository::new(pool);
    let (mut recent_orders, unread_notifications, wishlist) = tokio::try_join!(
        orders.list_for_user(user.id),
        notifications.unread_count(user.id),
        wishlists.product_ids(user.id),
    )?;
    recent_orders.truncate(RECENT_ORDERS);

    Ok(AccountIndexTemplate {
        ctx,
        customer,
        recent_orders,
        unread_notifications,
        wishlist_count: wishlist.len(),
    })
}

#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    pub name: String,
    #[serde(default)]
    pub phone: String,
}

fn check_profile(form: &ProfileForm) -> std::result::Result<(&str, Option<Phone>), String> {
    let name = form.name.trim();
    if name.is_empty() {
        return Err("Name is required".to_owned());
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(format!("Name must be at most {MAX_NAME_LENGTH} characters"));
    }
    let phone = match form.phone.trim() {
        "" => None,
        raw => Some(Phone::parse(raw).map_err(|e| format!("Phone: {e}"))?),
    };
    Ok((name, phone))
}

/// Update name and phone.
///
/// # Errors
///
/// Returns an error if the session or the update fails.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn update_profile(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<ProfileForm>,
) -> Result<Response> {
    match check_profile(&form) {
        Ok((name, phone)) => {
            UserRepository::new(state.pool())
                .update_profile(user.id, name, phone.as_ref().map(Phone::as_str))
                .await?;
            let updated = CurrentUser {
                name: name.to_owned(),
                ..user
            };
            session.insert(session_keys::CURRENT_USER, &updated).await?;
            Flash::success("Your profile was updated.").push(&session).await?;
        }
        Err(message) => Flash::error(message).push(&session).await?,
    }
    Ok(Redirect::to("/account").into_response())
}

// =============================================================================
// Orders and requests
// =============================================================================

/// # Errors
///
/// Returns an error if the query fails.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn orders(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ctx: PageContext,
) -> Result<impl IntoResponse> {
    let orders = OrderRepository::new(state.pool()).list_for_user(user.id).await?;
    Ok(OrdersTemplate { ctx, orders })
}

/// One of the customer's orders.
///
/// # Errors
///
/// Returns 404 if the order doesn't exist or belongs to someone else.
#[instrument(skip(state, ctx, user), fields(user_id = %user.id))]
pub async fn order(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ctx: PageContext,
    Path(number): Path<String>,
) -> Result<impl IntoResponse> {
    let repo = OrderRepository::new(state.pool());
    let order = repo
        .get_by_number(&number)
        .await?
        .filter(|o| o.user_id == Some(user.id))
        .ok_or_else(|| AppError::NotFound(format!("order {number}")))?;
    let items = repo.items(order.id).await?;
    Ok(OrderTemplate { ctx, order, items })
}

/// # Errors
///
/// Returns an error if the query fails.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn custom_requests(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ctx: PageContext,
) -> Result<impl IntoResponse> {
    let requests = CustomRequestRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;
    Ok(CustomRequestsTemplate { ctx, requests })
}

// =============================================================================
// Wishlist
// =============================================================================

/// # Errors
///
/// Returns an error if the query fails.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn wishlist(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ctx: PageContext,
) -> Result<impl IntoResponse> {
    let entries = WishlistRepository::new(state.pool()).list(user.id).await?;
    Ok(WishlistTemplate { ctx, entries })
}

fn wishlist_response(headers: &HeaderMap, product_id: ProductId, in_wishlist: bool) -> Response {
    if headers.contains_key("hx-request") {
        return WishlistButtonTemplate {
            product_id,
            in_wishlist,
        }
        .into_response();
    }
    let back = headers
        .get("referer")
        .and_then(|v| v.to_str().ok())
        .and_then(|r| url::Url::parse(r).ok())
        .map_or_else(|| "/account/wishlist".to_owned(), |u| u.path().to_owned());
    Redirect::to(&back).into_response()
}

/// Save a product to the wishlist. Adding twice is a no-op.
///
/// # Errors
///
/// Returns 404 for unknown products.
#[instrument(skip(state, headers, user), fields(user_id = %user.id))]
pub async fn wishlist_add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    headers: HeaderMap,
    Path(product_id): Path<ProductId>,
) -> Result<Response> {
    CatalogRepository::new(state.pool())
        .get_by_id(product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {product_id}")))?;
    WishlistRepository::new(state.pool())
        .add(user.id, product_id)
        .await?;
    Ok(wishlist_response(&headers, product_id, true))
}

/// # Errors
///
/// Returns an error if the delete fails.
#[instrument(skip(state, headers, user), fields(user_id = %user.id))]
pub async fn wishlist_remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    headers: HeaderMap,
    Path(product_id): Path<ProductId>,
) -> Result<Response> {
    WishlistRepository::new(state.pool())
        .remove(user.id, product_id)
        .await?;
    Ok(wishlist_response(&headers, product_id, false))
}

// =============================================================================
// Notifications
// =============================================================================

/// # Errors
///
/// Returns an error if the query fails.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn notifications(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ctx: PageContext,
) -> Result<impl IntoResponse> {
    let notifications = NotificationRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;
    Ok(NotificationsTemplate { ctx, notifications })
}

/// # Errors
///
/// Returns 404 if the notification belongs to someone else.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn notification_read(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<NotificationId>,
) -> Result<Response> {
    NotificationRepository::new(state.pool())
        .mark_read(user.id, id)
        .await?;
    Ok(Redirect::to("/account/notifications").into_response())
}

/// # Errors
///
/// Returns an error if the update fails.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn notifications_read_all(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<Response> {
    let updated = NotificationRepository::new(state.pool())
        .mark_all_read(user.id)
        .await?;
    if updated > 0 {
        Flash::success("All notifications marked as read.")
            .push(&session)
            .await?;
    }
    Ok(Redirect::to("/account/notifications").into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_phone_is_optional() {
        let form = ProfileForm {
            name: " Ada ".to_owned(),
            phone: String::new(),
        };
        let (name, phone) = check_profile(&form).unwrap();
        assert_eq!(name, "Ada");
        assert!(phone.is_none());
    }

    #[test]
    fn test_profile_rejects_bad_phone_and_blank_name() {
        let bad_phone = ProfileForm {
            name: "Ada".to_owned(),
            phone: "12".to_owned(),
        };
        assert!(check_profile(&bad_phone).is_err());

        let blank = ProfileForm {
            name: "  ".to_owned(),
            phone: String::new(),
        };
        assert!(check_profile(&blank).is_err());
    }
}
