//! Document proxy handlers.
//!
//! Thin passthroughs to the upstream document API. Every call goes through
//! the authorized upstream client, and the session consequence of the call
//! (refreshed or terminated) is applied to the response cookie jar.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;
use serde_json::Value;
use tracing::{error, warn};

use console_core::error::ErrorKind;
use console_core::{AppError, AppResult};

use crate::dto::response::{DocumentListResponse, DocumentResponse, DocumentStatusResponse};
use crate::error::{ApiError, ApiErrorResponse};
use crate::state::AppState;
use crate::upstream::{AuthorizedReply, ProxyRequest, UpstreamResponse};

/// GET /api/documents
pub async fn list_documents(State(state): State<AppState>, jar: CookieJar) -> Response {
    let Some(bundle) = state.store.load(&jar).bundle() else {
        return unauthenticated(&state, jar);
    };

    let request = ProxyRequest::get("/api/documents/?sort=-created_at");
    match state.upstream.send_authorized(request, bundle).await {
        Ok(AuthorizedReply { response, session }) => {
            let jar = state.store.apply(jar, session);
            if !response.status.is_success() {
                return (jar, proxy_failure("list documents", &response)).into_response();
            }
            match normalize_document_list(&response.body) {
                Ok(list) => (jar, Json(list)).into_response(),
                Err(err) => (jar, ApiError(err)).into_response(),
            }
        }
        Err(err) => failed_call(&state, jar, err),
    }
}

/// POST /api/documents
///
/// Multipart upload passthrough: the raw body and its content type (with
/// the multipart boundary) are forwarded verbatim.
pub async fn upload_document(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(bundle) = state.store.load(&jar).bundle() else {
        return unauthenticated(&state, jar);
    };

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(String::from);

    let request = ProxyRequest::post("/api/documents/", content_type, body);
    match state.upstream.send_authorized(request, bundle).await {
        Ok(AuthorizedReply { response, session }) => {
            let jar = state.store.apply(jar, session);
            if !response.status.is_success() {
                return (jar, proxy_failure("upload document", &response)).into_response();
            }
            (jar, response.into_response()).into_response()
        }
        Err(err) => failed_call(&state, jar, err),
    }
}

/// DELETE /api/documents/{id}
pub async fn delete_document(
    State(state): State<AppState>,
    Path(document_id): Path<i64>,
    jar: CookieJar,
) -> Response {
    let Some(bundle) = state.store.load(&jar).bundle() else {
        return unauthenticated(&state, jar);
    };

    let request = ProxyRequest::delete(format!("/api/documents/{document_id}"));
    match state.upstream.send_authorized(request, bundle).await {
        Ok(AuthorizedReply { response, session }) => {
            let jar = state.store.apply(jar, session);
            if !response.status.is_success() {
                return (jar, proxy_failure("delete document", &response)).into_response();
            }
            (jar, StatusCode::NO_CONTENT).into_response()
        }
        Err(err) => failed_call(&state, jar, err),
    }
}

/// GET /api/documents/{id}/status
pub async fn document_status(
    State(state): State<AppState>,
    Path(document_id): Path<i64>,
    jar: CookieJar,
) -> Response {
    let Some(bundle) = state.store.load(&jar).bundle() else {
        return unauthenticated(&state, jar);
    };

    let request = ProxyRequest::get(format!("/api/documents/{document_id}/status"));
    match state.upstream.send_authorized(request, bundle).await {
        Ok(AuthorizedReply { response, session }) => {
            let jar = state.store.apply(jar, session);
            if !response.status.is_success() {
                return (jar, proxy_failure("poll document status", &response)).into_response();
            }
            match serde_json::from_slice::<DocumentStatusResponse>(&response.body) {
                Ok(status) => (jar, Json(status)).into_response(),
                Err(err) => {
                    error!(document_id, error = %err, "status payload does not match the backend contract");
                    let err = AppError::external_service("Document status payload is malformed");
                    (jar, ApiError(err)).into_response()
                }
            }
        }
        Err(err) => failed_call(&state, jar, err),
    }
}

/// Defensive fallback: the gate guarantees a session on these routes, so a
/// missing bundle here means the cookie vanished mid-flight. Fail closed.
fn unauthenticated(state: &AppState, jar: CookieJar) -> Response {
    let jar = state.store.delete(jar);
    (jar, ApiError(AppError::authentication("Not authenticated"))).into_response()
}

/// A terminal session error clears the cookie; everything else passes the
/// mapped error through unchanged.
fn failed_call(state: &AppState, jar: CookieJar, err: AppError) -> Response {
    let jar = if err.kind == ErrorKind::Session {
        state.store.delete(jar)
    } else {
        jar
    };
    (jar, ApiError(err)).into_response()
}

/// Surface an upstream failure with its status code, logging the detail
/// server-side only.
fn proxy_failure(op: &str, response: &UpstreamResponse) -> Response {
    let detail = String::from_utf8_lossy(&response.body);
    warn!(
        op,
        status = response.status.as_u16(),
        detail = %detail,
        "upstream call failed"
    );

    let body = ApiErrorResponse {
        error: "UPSTREAM_ERROR".to_string(),
        message: format!("Failed to {op}"),
    };
    (response.status, Json(body)).into_response()
}

/// The upstream historically returned either a bare array or an
/// `{items, total}` object; normalize both to [`DocumentListResponse`].
fn normalize_document_list(body: &[u8]) -> AppResult<DocumentListResponse> {
    let value: Value = serde_json::from_slice(body).map_err(|err| {
        AppError::with_source(
            ErrorKind::ExternalService,
            "Document list is not valid JSON",
            err,
        )
    })?;

    let (items, total) = match value {
        Value::Array(items) => {
            let total = items.len() as u64;
            (items, total)
        }
        Value::Object(mut object) => {
            let items = match object.remove("items") {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            };
            let total = object
                .get("total")
                .and_then(Value::as_u64)
                .unwrap_or(items.len() as u64);
            (items, total)
        }
        _ => {
            return Err(AppError::external_service(
                "Document list has an unexpected shape",
            ));
        }
    };

    let items: Vec<DocumentResponse> = serde_json::from_value(Value::Array(items)).map_err(|err| {
        error!(error = %err, "document list entries do not match the backend contract");
        AppError::with_source(
            ErrorKind::ExternalService,
            "Document list entries are malformed",
            err,
        )
    })?;

    Ok(DocumentListResponse { items, total })
}
