//! Integration tests for Hearth Bakery.
//!
//! The tests talk to running servers over HTTP and are `#[ignore]`d so a
//! plain `cargo test` stays hermetic.
//!
//! ```bash
//! cargo test -p hearth-integration-tests -- --ignored
//! ```

use reqwest::{Client, redirect};

/// Storefront base URL, `STOREFRONT_BASE_URL` or `http://localhost:3000`.
#[must_use]
pub fn storefront_base_url() -> String {
    base_url("STOREFRONT_BASE_URL", "http://localhost:3000")
}

/// Back office base URL, `ADMIN_BASE_URL` or `http://localhost:3001`.
#[must_use]
pub fn admin_base_url() -> String {
    base_url("ADMIN_BASE_URL", "http://localhost:3001")
}

fn base_url(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map_or_else(|| default.to_owned(), |v| v.trim_end_matches('/').to_owned())
}

/// A client that keeps cookies and does not follow redirects, so tests can
/// assert on `Location` headers.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialised.
pub fn client() -> reqwest::Result<Client> {
    Client::builder()
        .cookie_store(true)
        .redirect(redirect::Policy::none())
        .build()
}

/// The `Location` header of a response, if any.
#[must_use]
pub fn location(resp: &reqwest::Response) -> Option<&str> {
    resp.headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
}
