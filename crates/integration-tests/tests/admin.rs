//! Back office access control.
//!
//! Requires the admin server running: `cargo run -p hearth-admin`.

#![allow(clippy::unwrap_used)]

use hearth_integration_tests::{admin_base_url, client, location};
use reqwest::StatusCode;

#[tokio::test]
#[ignore = "requires a running admin server"]
async fn test_health() {
    let resp = client()
        .unwrap()
        .get(format!("{}/health", admin_base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "requires a running admin server"]
async fn test_login_page_renders() {
    let resp = client()
        .unwrap()
        .get(format!("{}/auth/login", admin_base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("content-security-policy"));
}

#[tokio::test]
#[ignore = "requires a running admin server"]
async fn test_pages_redirect_to_login() {
    let client = client().unwrap();
    for path in ["/", "/orders", "/custom-requests", "/products", "/settings"] {
        let resp = client
            .get(format!("{}{path}", admin_base_url()))
            .send()
            .await
            .unwrap();
        assert!(resp.status().is_redirection(), "GET {path}");
        assert_eq!(location(&resp), Some("/auth/login"), "GET {path}");
    }
}

#[tokio::test]
#[ignore = "requires a running admin server"]
async fn test_upload_api_is_unauthorized() {
    let resp = client()
        .unwrap()
        .post(format!("{}/api/uploads", admin_base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "requires a running admin server and database"]
async fn test_bad_credentials_stay_on_login() {
    let resp = client()
        .unwrap()
        .post(format!("{}/auth/login", admin_base_url()))
        .form(&[("email", "nobody@hearth.test"), ("password", "not-the-password")])
        .send()
        .await
        .unwrap();
    assert!(!resp.status().is_server_error());
    if resp.status().is_redirection() {
        assert_ne!(location(&resp), Some("/"));
    }
}

#[tokio::test]
#[ignore = "requires a running admin server and database"]
async fn test_readiness_reports_database() {
    let resp = client()
        .unwrap()
        .get(format!("{}/health/ready", admin_base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}
