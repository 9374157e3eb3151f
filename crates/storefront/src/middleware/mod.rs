//! HTTP middleware for the storefront.
//!
//! # Layer order (outermost first)
//!
//! 1. Sentry hub and HTTP transaction
//! 2. Request ID (tags the span and Sentry scope)
//! 3. Security headers, including the nonce-based CSP
//! 4. CSP nonce generation
//! 5. Session (tower-sessions with the `PostgreSQL` store)
//! 6. Rate limiting on login, registration and checkout routes

pub mod auth;
pub mod csp;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{OptionalAuth, RequireAuth, clear_current_user, set_current_user};
pub use csp::{CspNonce, csp_nonce_middleware};
pub use rate_limit::{auth_rate_limiter, checkout_rate_limiter};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
