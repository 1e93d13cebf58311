//! Integration tests for the login, refresh, and logout flows.

use std::sync::atomic::Ordering;

use chrono::{DateTime, Utc};
use http::StatusCode;
use serde_json::json;

use crate::helpers::{self, TestApp};

#[tokio::test]
async fn test_login_success_sets_session_cookie() {
    let app = TestApp::new().await;

    let response = app.login("admin@acme.test", "password123", "acme").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["user_role"], "ADMIN");
    assert_eq!(response.body["tenant_slug"], "acme");

    let expires_at: DateTime<Utc> = response.body["expires_at"]
        .as_str()
        .expect("expires_at present")
        .parse()
        .expect("expires_at parses");
    assert!(expires_at > Utc::now());

    assert!(response.sets_session(), "login must issue a session cookie");
    assert_eq!(app.upstream.login_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_login_invalid_password_is_rejected() {
    let app = TestApp::new().await;

    let response = app.login("admin@acme.test", "wrong", "acme").await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["message"], "Invalid credentials");
    assert!(response.set_cookie().is_none());
}

#[tokio::test]
async fn test_login_unknown_tenant_is_distinguished() {
    let app = TestApp::new().await;

    let response = app.login("admin@acme.test", "password123", "globex").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["message"], "Tenant not found");
}

#[tokio::test]
async fn test_login_non_admin_is_rejected_without_cookie() {
    let app = TestApp::new().await;

    let response = app.login("user@acme.test", "password123", "acme").await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert!(
        response.set_cookie().is_none(),
        "no session may be issued to a non-admin"
    );
}

#[tokio::test]
async fn test_refresh_success_replaces_session_cookie() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(json!({ "refresh_token": "refresh-good-1" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["access_token"], "access-refreshed-1");
    assert!(response.sets_session());
}

#[tokio::test]
async fn test_refresh_failure_clears_session_cookie() {
    let app = TestApp::new().await;
    let cookie = helpers::session_cookie(&helpers::admin_bundle(3600, 86400));

    let response = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(json!({ "refresh_token": "refresh-revoked" })),
            Some(&cookie),
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "SESSION_EXPIRED");
    assert!(response.clears_session());
}

#[tokio::test]
async fn test_logout_clears_session_regardless_of_prior_state() {
    let app = TestApp::new().await;

    // With a live session.
    let cookie = helpers::session_cookie(&helpers::admin_bundle(3600, 86400));
    let response = app
        .request("POST", "/api/auth/logout", None, Some(&cookie))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.clears_session());

    // Without any session: still succeeds, still clears.
    let response = app.request("POST", "/api/auth/logout", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.clears_session());
}
