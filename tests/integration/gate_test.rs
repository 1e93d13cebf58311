//! Integration tests for the admission gate.

use http::StatusCode;

use console_auth::token::UserRole;

use crate::helpers::{self, TestApp};

#[tokio::test]
async fn test_page_without_session_redirects_to_login() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/dashboard", None, None).await;

    assert_eq!(response.status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.location().as_deref(),
        Some("/auth/login?redirect=%2Fdashboard")
    );
}

#[tokio::test]
async fn test_api_without_session_is_unauthorized() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/api/documents", None, None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_non_admin_session_is_rejected_and_cleared() {
    let app = TestApp::new().await;
    let cookie = helpers::session_cookie(&helpers::bundle_with_role(UserRole::User, 3600, 86400));

    let response = app
        .request("GET", "/api/documents", None, Some(&cookie))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert!(response.clears_session(), "role mismatch must clear the cookie");

    // Pages redirect instead.
    let response = app.request("GET", "/users", None, Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::TEMPORARY_REDIRECT);
}

#[tokio::test]
async fn test_super_admin_is_not_admitted() {
    let app = TestApp::new().await;
    let cookie =
        helpers::session_cookie(&helpers::bundle_with_role(UserRole::SuperAdmin, 3600, 86400));

    let response = app
        .request("GET", "/api/documents", None, Some(&cookie))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_access_token_is_rejected_without_clearing() {
    let app = TestApp::new().await;
    // Access token past expiry; refresh token still valid. The gate cannot
    // refresh mid-navigation, so it rejects and keeps the cookie for the
    // interceptor to recover later.
    let cookie = helpers::session_cookie(&helpers::admin_bundle(-10, 86400));

    let api = app
        .request("GET", "/api/documents", None, Some(&cookie))
        .await;
    assert_eq!(api.status, StatusCode::UNAUTHORIZED);
    assert!(api.set_cookie().is_none());

    let page = app.request("GET", "/documents", None, Some(&cookie)).await;
    assert_eq!(page.status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        page.location().as_deref(),
        Some("/auth/login?redirect=%2Fdocuments")
    );
}

#[tokio::test]
async fn test_corrupt_cookie_fails_closed_and_clears() {
    let app = TestApp::new().await;

    let response = app
        .request("GET", "/api/documents", None, Some("session=%7Bnot-json"))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert!(response.clears_session());
}

#[tokio::test]
async fn test_admitted_admin_passes_with_rewritten_headers() {
    let app = TestApp::new().await;
    let cookie = helpers::session_cookie(&helpers::admin_bundle(3600, 86400));

    let response = app
        .request("GET", "/api/documents", None, Some(&cookie))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        app.upstream
            .last_authorization
            .lock()
            .expect("lock poisoned")
            .as_deref(),
        Some("Bearer access-forged")
    );
    assert_eq!(
        app.upstream
            .last_tenant
            .lock()
            .expect("lock poisoned")
            .as_deref(),
        Some("7")
    );
}

#[tokio::test]
async fn test_admitted_admin_reaches_pages() {
    let app = TestApp::new().await;
    let cookie = helpers::session_cookie(&helpers::admin_bundle(3600, 86400));

    for path in ["/", "/dashboard", "/documents", "/users", "/settings"] {
        let response = app.request("GET", path, None, Some(&cookie)).await;
        assert_eq!(response.status, StatusCode::OK, "page {path} not served");
    }
}

#[tokio::test]
async fn test_public_routes_bypass_the_gate() {
    let app = TestApp::new().await;

    let login_page = app.request("GET", "/auth/login", None, None).await;
    assert_eq!(login_page.status, StatusCode::OK);

    let health = app.request("GET", "/api/health", None, None).await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.body["status"], "ok");
}
