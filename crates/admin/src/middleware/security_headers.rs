//! Response security headers. Stricter than the storefront: no third-party
//! scripts and HSTS when served over TLS.

use axum::{
    extract::Request,
    http::{
        HeaderName, HeaderValue,
        header::{
            CACHE_CONTROL, CONTENT_SECURITY_POLICY, REFERRER_POLICY, STRICT_TRANSPORT_SECURITY,
            X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS,
        },
    },
    middleware::Next,
    response::Response,
};

use super::csp::CspNonce;

/// Build the CSP. Uploaded images live on the image host, so `img-src`
/// allows any HTTPS origin.
#[must_use]
pub fn content_security_policy(nonce: Option<&str>) -> String {
    let script_src = nonce
        .filter(|n| !n.is_empty())
        .map_or_else(|| "'self'".to_owned(), |n| format!("'self' 'nonce-{n}'"));
    format!(
        "default-src 'none'; \
         script-src {script_src}; \
         style-src 'self'; \
         img-src 'self' https: data:; \
         connect-src 'self'; \
         object-src 'none'; \
         base-uri 'self'; \
         form-action 'self'; \
         frame-ancestors 'none'"
    )
}

/// Add security headers to every response. Nothing in the back office is
/// cacheable except static files.
pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let is_static = request.uri().path().starts_with("/static/");
    let is_https = request.uri().scheme_str() == Some("https")
        || request
            .headers()
            .get("x-forwarded-proto")
            .is_some_and(|v| v.as_bytes() == b"https");
    let mut response = next.run(request).await;

    let csp = content_security_policy(
        response
            .extensions()
            .get::<CspNonce>()
            .map(CspNonce::value),
    );

    let headers = response.headers_mut();
    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(REFERRER_POLICY, HeaderValue::from_static("same-origin"));
    if let Ok(value) = HeaderValue::from_str(&csp) {
        headers.insert(CONTENT_SECURITY_POLICY, value);
    }
    headers.insert(
        HeaderName::from_static("cross-origin-opener-policy"),
        HeaderValue::from_static("same-origin"),
    );
    headers.insert(
        HeaderName::from_static("x-robots-tag"),
        HeaderValue::from_static("noindex, nofollow"),
    );
    if is_https {
        headers.insert(
            STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=31536000; includeSubDomains"),
        );
    }
    if !is_static {
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store, max-age=0"));
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csp_has_no_third_party_scripts() {
        let csp = content_security_policy(Some("n0nce"));
        assert!(csp.contains("script-src 'self' 'nonce-n0nce';"));
        assert!(!csp.contains("unpkg"));
    }

    #[test]
    fn test_csp_without_nonce() {
        assert!(content_security_policy(None).contains("script-src 'self';"));
    }
}
