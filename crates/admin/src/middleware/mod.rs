//! HTTP middleware for the back office.
//!
//! # Layer order (outermost first)
//!
//! 1. Sentry hub and HTTP transaction
//! 2. `TraceLayer` with status and latency
//! 3. Request ID (tags the span and Sentry scope)
//! 4. Security headers, including the nonce-based CSP
//! 5. CSP nonce generation
//! 6. Session (`admin_session` table, `SameSite=Strict`)
//! 7. Rate limiting on the login form
//!
//! Authentication is per handler through the extractors in [`auth`].

pub mod auth;
pub mod csp;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{
    OptionalAdminAuth, RequireAdminAuth, RequireEditor, RequireOrderManager, RequireSuperAdmin,
    clear_current_admin, set_current_admin,
};
pub use csp::{CspNonce, csp_nonce_middleware};
pub use rate_limit::login_rate_limiter;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
