//! Checkout and order confirmation route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use tower_sessions::Session;
use tracing::instrument;

use hearth_core::models::{Order, OrderItem};
use hearth_core::pricing::{self, OrderTotals, SiteSettings};
use hearth_core::validation::ValidationErrors;
use hearth_core::FulfillmentMethod;

use crate::db::{OrderRepository, UserRepository};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{CspNonce, OptionalAuth};
use crate::models::{CurrentUser, Flash, PricedCart, session_keys};
use crate::routes::cart::load_priced_cart;
use crate::routes::context::PageContext;
use crate::services::checkout::{self, CheckoutForm};
use crate::state::AppState;

/// Guest confirmation pages stay reachable for this many recent orders.
const MAX_RECENT_ORDERS: usize = 10;

#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutTemplate {
    pub ctx: PageContext,
    pub cart: PricedCart,
    pub form: CheckoutForm,
    pub errors: ValidationErrors,
    pub delivery_totals: OrderTotals,
    pub pickup_totals: OrderTotals,
    pub methods: &'static [FulfillmentMethod],
}

#[derive(Template, WebTemplate)]
#[template(path = "checkout/confirmation.html")]
pub struct ConfirmationTemplate {
    pub ctx: PageContext,
    pub order: Order,
    pub items: Vec<OrderItem>,
}

impl CheckoutTemplate {
    fn new(
        ctx: PageContext,
        settings: &SiteSettings,
        cart: PricedCart,
        form: CheckoutForm,
        errors: ValidationErrors,
    ) -> Self {
        let delivery_totals =
            pricing::order_totals(cart.subtotal, FulfillmentMethod::Delivery, settings);
        let pickup_totals =
            pricing::order_totals(cart.subtotal, FulfillmentMethod::Pickup, settings);
        Self {
            ctx,
            cart,
            form,
            errors,
            delivery_totals,
            pickup_totals,
            methods: FulfillmentMethod::ALL,
        }
    }

    #[must_use]
    pub fn is_method(&self, method: &FulfillmentMethod) -> bool {
        self.form.fulfillment_method == method.as_str()
    }

    #[must_use]
    pub fn is_slot(&self, slot: &str) -> bool {
        self.form.delivery_slot == slot
    }
}

/// Pre-fill contact fields for a signed-in customer.
async fn prefilled_form(state: &AppState, user: Option<&CurrentUser>) -> Result<CheckoutForm> {
    let mut form = CheckoutForm {
        fulfillment_method: FulfillmentMethod::Delivery.as_str().to_owned(),
        ..CheckoutForm::default()
    };
    if let Some(user) = user {
        form.name.clone_from(&user.name);
        form.email = user.email.as_str().to_owned();
        if let Some(customer) = UserRepository::new(state.pool()).get_by_id(user.id).await? {
            form.phone = customer.phone.unwrap_or_default();
        }
    }
    Ok(form)
}

/// Send the shopper back to the cart with a message.
async fn back_to_cart(session: &Session, message: String) -> Result<Response> {
    Flash::error(message).push(session).await?;
    Ok(Redirect::to("/cart").into_response())
}

/// Checkout form with totals for both fulfillment methods.
///
/// # Errors
///
/// Returns an error if the cart or profile cannot be loaded.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    CspNonce(nonce): CspNonce,
) -> Result<Response> {
    let (_, cart) = load_priced_cart(&state, &session).await?;
    let settings = state.site_settings().await?;
    if let Err(e) = pricing::check_minimum_order(cart.subtotal, &settings) {
        return back_to_cart(&session, capitalize(&e.to_string())).await;
    }

    let form = prefilled_form(&state, user.as_ref()).await?;
    let ctx = PageContext::build(&state, Some(&session), nonce).await;
    Ok(CheckoutTemplate::new(ctx, &settings, cart, form, ValidationErrors::new()).into_response())
}

/// Place the order.
///
/// Validation failures re-render the form. Once the order is stored the cart
/// is cleared and notifications go out; a notification failure never fails
/// the order.
///
/// # Errors
///
/// Returns an error if the order cannot be stored.
#[instrument(skip_all)]
pub async fn place(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    CspNonce(nonce): CspNonce,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    let (mut cart, priced) = load_priced_cart(&state, &session).await?;
    let settings = state.site_settings().await?;
    if let Err(e) = pricing::check_minimum_order(priced.subtotal, &settings) {
        return back_to_cart(&session, capitalize(&e.to_string())).await;
    }

    let today = Utc::now().date_naive();
    let valid = match form.validate(today, &settings) {
        Ok(valid) => valid,
        Err(errors) => {
            tracing::debug!(errors = %errors, "Checkout form rejected");
            let ctx = PageContext::build(&state, Some(&session), nonce).await;
            let page = CheckoutTemplate::new(ctx, &settings, priced, form, errors);
            return Ok(page.into_response());
        }
    };

    let (order, items) = checkout::place_order(
        state.pool(),
        &valid,
        &priced,
        &settings,
        user.as_ref().map(|u| u.id),
        today,
    )
    .await?;
    tracing::info!(order_number = %order.order_number, total = %order.total, "Order placed");
    add_breadcrumb("checkout", "Order placed", Some(&[("order_number", &order.order_number)]));

    cart.clear();
    cart.save(&session).await?;
    remember_order(&session, &order.order_number).await?;

    state.notifier().order_placed(&order, &items, &settings).await;

    Ok(Redirect::to(&format!("/orders/{}/confirmation", order.order_number)).into_response())
}

async fn remember_order(
    session: &Session,
    order_number: &str,
) -> std::result::Result<(), tower_sessions::session::Error> {
    let mut recent: Vec<String> = session
        .get(session_keys::RECENT_ORDERS)
        .await?
        .unwrap_or_default();
    recent.insert(0, order_number.to_owned());
    recent.truncate(MAX_RECENT_ORDERS);
    session.insert(session_keys::RECENT_ORDERS, recent).await
}

/// Order confirmation. Visible to the account that placed the order or the
/// session that placed it as a guest.
///
/// # Errors
///
/// Returns 404 for unknown orders and orders this visitor did not place.
#[instrument(skip(state, session, ctx))]
pub async fn confirmation(
    State(state): State<AppState>,
    session: Session,
    ctx: PageContext,
    Path(number): Path<String>,
) -> Result<impl IntoResponse> {
    let repo = OrderRepository::new(state.pool());
    let not_found = || AppError::NotFound(format!("order {number}"));
    let order = repo.get_by_number(&number).await?.ok_or_else(not_found)?;

    let placed_here = session
        .get::<Vec<String>>(session_keys::RECENT_ORDERS)
        .await?
        .unwrap_or_default()
        .contains(&order.order_number);
    let owned = ctx
        .user
        .as_ref()
        .is_some_and(|u| order.user_id == Some(u.id));
    if !placed_here && !owned {
        return Err(not_found());
    }

    let items = repo.items(order.id).await?;
    Ok(ConfirmationTemplate { ctx, order, items })
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
