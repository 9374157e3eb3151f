//! Cart route handlers.
//!
//! The cart lives in the session. Mutations answer HTMX requests with a
//! fragment plus `HX-Trigger: cart-updated`, and plain form posts with a
//! redirect back to the cart page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::HeaderMap,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use hearth_core::pricing::{self, OrderTotals, SiteSettings};
use hearth_core::{FulfillmentMethod, ProductId};

use crate::db::CatalogRepository;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::CspNonce;
use crate::models::{Cart, Flash, PricedCart};
use crate::routes::context::PageContext;
use crate::state::AppState;

const CART_UPDATED: (&str, &str) = ("HX-Trigger", "cart-updated");

/// Totals shown under the cart lines. Delivery is assumed until the shopper
/// picks a method at checkout.
pub struct CartSummary {
    pub cart: PricedCart,
    pub totals: OrderTotals,
    pub until_free_delivery: Option<Decimal>,
    pub settings: SiteSettings,
}

impl CartSummary {
    #[must_use]
    pub fn new(cart: PricedCart, settings: SiteSettings) -> Self {
        let totals = pricing::order_totals(cart.subtotal, FulfillmentMethod::Delivery, &settings);
        let until_free_delivery = if cart.is_empty() {
            None
        } else {
            pricing::amount_until_free_delivery(cart.subtotal, &settings)
        };
        Self {
            cart,
            totals,
            until_free_delivery,
            settings,
        }
    }

    #[must_use]
    pub fn money(&self, amount: &Decimal) -> String {
        self.settings.format(*amount)
    }
}

/// Load the session cart and price it against the live catalog.
///
/// Lines for products that were removed or made unavailable are dropped from
/// the stored cart and the shopper is told on the next page.
///
/// # Errors
///
/// Returns an error if the session or catalog query fails.
pub async fn load_priced_cart(state: &AppState, session: &Session) -> Result<(Cart, PricedCart)> {
    let mut cart = Cart::load(session).await?;
    if cart.is_empty() {
        return Ok((cart, PricedCart::default()));
    }

    let products = CatalogRepository::new(state.pool())
        .available_by_ids(&cart.product_ids())
        .await?;
    if cart.retain_available(&products) {
        cart.save(session).await?;
        Flash::info("Some items in your cart are no longer available and were removed.")
            .push(session)
            .await?;
    }

    let priced = cart.price(&products);
    Ok((cart, priced))
}

fn is_htmx(headers: &HeaderMap) -> bool {
    headers.contains_key("hx-request")
}

#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub ctx: PageContext,
    pub summary: CartSummary,
}

#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub summary: CartSummary,
}

#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
    pub quantity: Option<u32>,
    pub cake_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: ProductId,
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: ProductId,
}

/// Cart page.
///
/// # Errors
///
/// Returns an error if the cart cannot be loaded.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    CspNonce(nonce): CspNonce,
) -> Result<impl IntoResponse> {
    // Price first so a dropped-item notice lands in this page's context.
    let (_, priced) = load_priced_cart(&state, &session).await?;
    let settings = state.site_settings().await?;
    let ctx = PageContext::build(&state, Some(&session), nonce).await;
    let summary = CartSummary::new(priced, settings);
    Ok(CartShowTemplate { ctx, summary })
}

/// Add a product to the cart.
///
/// # Errors
///
/// Returns 404 if the product is unknown or unavailable.
#[instrument(skip(state, session, headers))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let product = CatalogRepository::new(state.pool())
        .get_by_id(form.product_id)
        .await?
        .filter(|p| p.is_available)
        .ok_or_else(|| AppError::NotFound(format!("product {}", form.product_id)))?;

    let mut cart = Cart::load(&session).await?;
    cart.add(
        product.id,
        form.quantity.unwrap_or(1),
        form.cake_message.as_deref(),
    );
    cart.save(&session).await?;

    let product_id = product.id.to_string();
    add_breadcrumb("cart", "Added to cart", Some(&[("product_id", &product_id)]));

    if is_htmx(&headers) {
        return Ok((
            AppendHeaders([CART_UPDATED]),
            CartCountTemplate {
                count: cart.item_count(),
            },
        )
            .into_response());
    }

    Flash::success(format!("{} added to your cart.", product.name))
        .push(&session)
        .await?;
    Ok(Redirect::to("/cart").into_response())
}

async fn cart_changed(state: &AppState, session: &Session, headers: &HeaderMap) -> Result<Response> {
    if !is_htmx(headers) {
        return Ok(Redirect::to("/cart").into_response());
    }
    let (_, priced) = load_priced_cart(state, session).await?;
    let summary = CartSummary::new(priced, state.site_settings().await?);
    Ok((AppendHeaders([CART_UPDATED]), CartItemsTemplate { summary }).into_response())
}

/// Set a line's quantity; zero removes it.
///
/// # Errors
///
/// Returns an error if the session cannot be written.
#[instrument(skip(state, session, headers))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response> {
    let mut cart = Cart::load(&session).await?;
    if cart.update(form.product_id, form.quantity) {
        cart.save(&session).await?;
    }
    cart_changed(&state, &session, &headers).await
}

/// Remove a line.
///
/// # Errors
///
/// Returns an error if the session cannot be written.
#[instrument(skip(state, session, headers))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response> {
    let mut cart = Cart::load(&session).await?;
    if cart.remove(form.product_id) {
        cart.save(&session).await?;
    }
    cart_changed(&state, &session, &headers).await
}

/// Header badge fragment, refreshed on `cart-updated`.
///
/// # Errors
///
/// Returns an error if the session cannot be read.
#[instrument(skip_all)]
pub async fn count(session: Session) -> Result<impl IntoResponse> {
    let cart = Cart::load(&session).await?;
    Ok(CartCountTemplate {
        count: cart.item_count(),
    })
}
