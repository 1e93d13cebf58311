//! Integration tests for the document proxies and the refresh-and-retry
//! interceptor behavior behind them.

use std::sync::atomic::Ordering;

use futures::future::join_all;
use http::StatusCode;

use crate::helpers::{self, TestApp};

#[tokio::test]
async fn test_list_documents_normalizes_upstream_array() {
    let app = TestApp::new().await;
    let cookie = helpers::session_cookie(&helpers::admin_bundle(3600, 86400));

    let response = app
        .request("GET", "/api/documents", None, Some(&cookie))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["total"], 2);
    assert_eq!(response.body["items"][0]["filename"], "report-1.pdf");
    assert_eq!(response.body["items"][1]["status"], "COMPLETED");
}

#[tokio::test]
async fn test_upload_document_passthrough() {
    let app = TestApp::new().await;
    let cookie = helpers::session_cookie(&helpers::admin_bundle(3600, 86400));

    let body = b"--boundary\r\ncontent-disposition: form-data; name=\"file\"\r\n\r\npdf-bytes\r\n--boundary--\r\n";
    let response = app
        .request_raw(
            "POST",
            "/api/documents",
            Some("multipart/form-data; boundary=boundary".to_string()),
            body.to_vec(),
            Some(&cookie),
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["id"], 3);
}

#[tokio::test]
async fn test_delete_document_returns_no_content() {
    let app = TestApp::new().await;
    let cookie = helpers::session_cookie(&helpers::admin_bundle(3600, 86400));

    let response = app
        .request("DELETE", "/api/documents/3", None, Some(&cookie))
        .await;

    assert_eq!(response.status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_document_status_passthrough() {
    let app = TestApp::new().await;
    let cookie = helpers::session_cookie(&helpers::admin_bundle(3600, 86400));

    let response = app
        .request("GET", "/api/documents/9/status", None, Some(&cookie))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["id"], 9);
    assert_eq!(response.body["status"], "PENDING");
}

#[tokio::test]
async fn test_stale_access_token_recovers_transparently() {
    let app = TestApp::new().await;
    // Unexpired as far as the client knows, but the upstream rejects it
    // (e.g. revoked server-side). One refresh-and-retry must recover.
    let mut bundle = helpers::admin_bundle(3600, 86400);
    bundle.access_token = "stale-token".to_string();
    let cookie = helpers::session_cookie(&bundle);

    let response = app
        .request("GET", "/api/documents", None, Some(&cookie))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.sets_session(), "recovered session must be persisted");
    assert_eq!(app.upstream.document_calls.load(Ordering::SeqCst), 2);
    assert_eq!(app.upstream.refresh_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_concurrent_stale_requests_share_one_refresh_exchange() {
    let app = TestApp::new().await;
    app.upstream.refresh_delay_ms.store(100, Ordering::SeqCst);

    // Inside the proactive-refresh margin but not literally expired, so the
    // gate admits the requests and every one of them wants a refresh.
    let cookie = helpers::session_cookie(&helpers::admin_bundle(30, 86400));

    let requests = (0..5).map(|_| app.request("GET", "/api/documents", None, Some(&cookie)));
    let responses = join_all(requests).await;

    for response in &responses {
        assert_eq!(response.status, StatusCode::OK);
        assert!(response.sets_session());
    }
    assert_eq!(
        app.upstream.refresh_calls.load(Ordering::SeqCst),
        1,
        "five concurrent staleness events must collapse into one exchange"
    );
}

#[tokio::test]
async fn test_second_401_terminates_the_session() {
    let app = TestApp::new().await;
    // The upstream rejects both the original and the retried request.
    app.upstream.reject_documents.store(2, Ordering::SeqCst);
    let cookie = helpers::session_cookie(&helpers::admin_bundle(3600, 86400));

    let response = app
        .request("GET", "/api/documents", None, Some(&cookie))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert!(response.clears_session(), "second 401 must log the session out");
    // One original send plus exactly one retry; never a third.
    assert_eq!(app.upstream.document_calls.load(Ordering::SeqCst), 2);
    assert_eq!(app.upstream.refresh_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_refresh_failure_during_retry_propagates_and_clears() {
    let app = TestApp::new().await;
    app.upstream.reject_documents.store(1, Ordering::SeqCst);

    // The refresh token is unknown to the stub, so the recovery refresh
    // fails and the session is terminal.
    let mut bundle = helpers::admin_bundle(3600, 86400);
    bundle.refresh_token = "refresh-revoked".to_string();
    let cookie = helpers::session_cookie(&bundle);

    let response = app
        .request("GET", "/api/documents", None, Some(&cookie))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "SESSION_EXPIRED");
    assert!(response.clears_session());
    assert_eq!(app.upstream.document_calls.load(Ordering::SeqCst), 1);
}
