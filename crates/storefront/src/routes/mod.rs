//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                                   Home page
//! GET  /health, /health/ready              Probes
//!
//! # Catalog
//! GET  /products?category=&q=              Product listing
//! GET  /products/{slug}                    Product detail with reviews
//! POST /products/{slug}/reviews            Submit a review (moderated)
//!
//! # Cart (HTMX fragments, HX-Trigger: cart-updated)
//! GET  /cart                               Cart page
//! POST /cart/add | /cart/update | /cart/remove
//! GET  /cart/count                         Header badge fragment
//!
//! # Checkout
//! GET  /checkout                           Checkout form
//! POST /checkout                           Place order
//! GET  /orders/{number}/confirmation       Confirmation
//!
//! # Custom cakes
//! GET  /custom-cake?step=                  Wizard step
//! POST /custom-cake                        Submit step (action = next | back | submit)
//! POST /custom-cake/reset                  Discard the draft
//! GET  /custom-cake/submitted              Thank-you page
//!
//! # Content
//! GET  /testimonials, POST /testimonials
//! GET  /pages/{slug}
//!
//! # Auth
//! GET|POST /auth/login, GET|POST /auth/register, POST /auth/logout
//!
//! # Account (requires auth)
//! GET  /account, POST /account/profile
//! GET  /account/orders, /account/orders/{number}
//! GET  /account/custom-requests
//! GET  /account/wishlist, POST /account/wishlist/{product_id}/add|remove
//! GET  /account/notifications
//! POST /account/notifications/{id}/read, /account/notifications/read-all
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod context;
pub mod custom_cake;
pub mod health;
pub mod home;
pub mod pages;
pub mod products;
pub mod testimonials;

use axum::{
    Router,
    routing::{get, post},
};

use crate::error::AppError;
use crate::middleware::{auth_rate_limiter, checkout_rate_limiter};
use crate::state::AppState;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .layer(auth_rate_limiter())
        .route("/logout", post(auth::logout))
}

pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{slug}", get(products::show))
        .route("/{slug}/reviews", post(products::submit_review))
}

pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
}

/// Checkout and custom cake submission share the stricter limiter.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/checkout", get(checkout::show).post(checkout::place))
        .route(
            "/custom-cake",
            get(custom_cake::show).post(custom_cake::submit_step),
        )
        .layer(checkout_rate_limiter())
        .route("/custom-cake/reset", post(custom_cake::reset))
        .route("/custom-cake/submitted", get(custom_cake::submitted))
        .route(
            "/orders/{number}/confirmation",
            get(checkout::confirmation),
        )
}

pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::index))
        .route("/profile", post(account::update_profile))
        .route("/orders", get(account::orders))
        .route("/orders/{number}", get(account::order))
        .route("/custom-requests", get(account::custom_requests))
        .route("/wishlist", get(account::wishlist))
        .route("/wishlist/{product_id}/add", post(account::wishlist_add))
        .route(
            "/wishlist/{product_id}/remove",
            post(account::wishlist_remove),
        )
        .route("/notifications", get(account::notifications))
        .route(
            "/notifications/read-all",
            post(account::notifications_read_all),
        )
        .route(
            "/notifications/{id}/read",
            post(account::notification_read),
        )
}

/// All storefront routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .merge(order_routes())
        .route(
            "/testimonials",
            get(testimonials::index).post(testimonials::submit),
        )
        .route("/pages/{slug}", get(pages::show))
        .nest("/auth", auth_routes())
        .nest("/account", account_routes())
        .fallback(not_found)
}

async fn not_found() -> AppError {
    AppError::NotFound("that page".to_owned())
}
