//! HTTP route handlers for the back office.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health, /health/ready              Probes
//! GET  /                                   Dashboard
//!
//! # Auth (email and password, rate limited)
//! GET|POST /auth/login, POST /auth/logout
//!
//! # Orders (status changes need the order manager role)
//! GET  /orders?status=&q=&from=&to=        Filtered list with status tabs
//! GET  /orders/{id}                        Detail with line items
//! POST /orders/{id}/status                 Move through the workflow
//! POST /orders/{id}/delete
//!
//! # Custom cake requests
//! GET  /custom-requests?status=&q=
//! GET|POST /custom-requests/{id}           Review, quote, accept or reject
//!
//! # Moderation (editor role)
//! GET  /reviews?status=&q=, POST /reviews/{id}/status|delete
//! GET|POST /testimonials, GET /testimonials/new, GET /testimonials/{id}/edit
//! POST /testimonials/{id}, /testimonials/{id}/status|feature|delete
//!
//! # Catalog (editor role)
//! GET  /products, GET|POST /products/new, GET|POST /products/{id}/edit
//! POST /products/{id}/delete
//! GET|POST /categories, POST /categories/{id}/delete
//!
//! # Content (editor role)
//! GET|POST /content/announcements, POST /content/announcements/{id}/toggle|delete
//! GET|POST /content/hero-slides
//! GET  /content/pages, GET|POST /content/pages/{slug}
//!
//! # Store
//! GET|POST /settings                       Site settings (order manager role)
//! GET  /customers?q=
//! GET  /analytics?days=
//! GET|POST /admin-users, POST /admin-users/{id}/role|active|delete (super admin)
//!
//! # API
//! POST /api/uploads                        Multipart `image`, returns `{"url"}`
//! ```

pub mod admin_users;
pub mod analytics;
pub mod api;
pub mod auth;
pub mod categories;
pub mod content;
pub mod context;
pub mod custom_requests;
pub mod customers;
pub mod dashboard;
pub mod health;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod settings;
pub mod testimonials;

use axum::Router;

use crate::state::AppState;

/// All back office routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(dashboard::router())
        .merge(orders::router())
        .merge(custom_requests::router())
        .merge(reviews::router())
        .merge(testimonials::router())
        .merge(products::router())
        .merge(categories::router())
        .merge(content::router())
        .merge(settings::router())
        .merge(customers::router())
        .merge(analytics::router())
        .merge(admin_users::router())
        .merge(api::router())
}
