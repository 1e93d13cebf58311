//! Authorized upstream client — the request authorization interceptor.
//!
//! Every proxied call to the backend goes through [`UpstreamClient`]: the
//! bearer credential and tenant header are attached before dispatch, and a
//! 401 triggers exactly one refresh-and-retry cycle. The retry state is an
//! explicit value in the send loop, and the session consequence of the call
//! is reported back to the handler as a [`SessionUpdate`] so it can be
//! persisted onto the response.

use std::sync::Arc;

use axum::body::Body;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use chrono::Utc;
use http::{Method, StatusCode, header};
use tracing::{debug, warn};

use console_auth::refresh::RefreshCoordinator;
use console_auth::store::SessionUpdate;
use console_auth::token::TokenBundle;
use console_core::error::ErrorKind;
use console_core::{AppError, AppResult};

/// Header carrying the tenant context to the backend.
pub const TENANT_HEADER: &str = "x-tenant-id";

/// Paths for which a 401 is a genuine credential rejection rather than a
/// staleness signal; the refresh-and-retry flow is skipped entirely.
fn is_auth_endpoint(path: &str) -> bool {
    path.starts_with("/api/auth/")
}

/// An outbound request to the backend, already reduced to the parts the
/// proxy forwards.
#[derive(Debug, Clone)]
pub struct ProxyRequest {
    /// HTTP method.
    pub method: Method,
    /// Upstream path including any query string.
    pub path: String,
    /// Content type of the body, forwarded verbatim (multipart boundaries
    /// included).
    pub content_type: Option<String>,
    /// Raw request body.
    pub body: Bytes,
}

impl ProxyRequest {
    /// A bodyless GET.
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            content_type: None,
            body: Bytes::new(),
        }
    }

    /// A POST carrying a body passthrough.
    pub fn post(path: impl Into<String>, content_type: Option<String>, body: Bytes) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            content_type,
            body,
        }
    }

    /// A bodyless DELETE.
    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            method: Method::DELETE,
            path: path.into(),
            content_type: None,
            body: Bytes::new(),
        }
    }
}

/// A buffered upstream response: status, content type, and body.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    /// Upstream status code.
    pub status: StatusCode,
    /// Upstream content type, when present.
    pub content_type: Option<String>,
    /// Raw response body.
    pub body: Bytes,
}

impl UpstreamResponse {
    /// Rebuild the upstream response for the browser, passing status and
    /// body through unchanged.
    pub fn into_response(self) -> Response {
        let mut builder = http::Response::builder().status(self.status);
        if let Some(content_type) = &self.content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        match builder.body(Body::from(self.body)) {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "failed to rebuild upstream response");
                StatusCode::BAD_GATEWAY.into_response()
            }
        }
    }
}

/// Result of an authorized send: the upstream response plus the session
/// consequence the handler must persist.
#[derive(Debug)]
pub struct AuthorizedReply {
    /// The (possibly retried) upstream response.
    pub response: UpstreamResponse,
    /// How the session cookie must change.
    pub session: SessionUpdate,
}

/// HTTP client for proxied backend calls, with credential attachment and
/// one refresh-and-retry cycle per original request.
#[derive(Debug)]
pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: String,
    coordinator: Arc<RefreshCoordinator>,
}

impl UpstreamClient {
    /// Create a client against the given backend base URL.
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        coordinator: Arc<RefreshCoordinator>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            coordinator,
        }
    }

    /// Send `request` with the session's bearer credential attached.
    ///
    /// The access token is proactively refreshed when inside the expiry
    /// margin. A 401 from a non-auth endpoint triggers exactly one refresh
    /// and re-send; a second 401 terminates the session. Errors from this
    /// method are terminal for the session when their kind is `Session`.
    pub async fn send_authorized(
        &self,
        request: ProxyRequest,
        bundle: TokenBundle,
    ) -> AppResult<AuthorizedReply> {
        let (mut bundle, refreshed) = self.coordinator.ensure_fresh(bundle, Utc::now()).await?;
        let mut session = if refreshed {
            SessionUpdate::Refreshed(bundle.clone())
        } else {
            SessionUpdate::Unchanged
        };
        let mut retried = false;

        loop {
            let response = self.dispatch(&request, &bundle).await?;

            if response.status != StatusCode::UNAUTHORIZED || is_auth_endpoint(&request.path) {
                return Ok(AuthorizedReply { response, session });
            }

            if retried {
                warn!(
                    path = %request.path,
                    "retried request was rejected again; terminating session"
                );
                return Ok(AuthorizedReply {
                    response,
                    session: SessionUpdate::Cleared,
                });
            }

            debug!(path = %request.path, "upstream returned 401; refreshing and retrying once");
            bundle = self.coordinator.refresh(&bundle).await?;
            session = SessionUpdate::Refreshed(bundle.clone());
            retried = true;
        }
    }

    async fn dispatch(
        &self,
        request: &ProxyRequest,
        bundle: &TokenBundle,
    ) -> AppResult<UpstreamResponse> {
        let url = format!("{}{}", self.base_url, request.path);

        let mut builder = self.http.request(request.method.clone(), url).header(
            header::AUTHORIZATION,
            format!("Bearer {}", bundle.access_token),
        );
        if let Some(tenant_id) = bundle.tenant_id {
            builder = builder.header(TENANT_HEADER, tenant_id.to_string());
        }
        if let Some(content_type) = &request.content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type.clone());
        }
        if !request.body.is_empty() {
            builder = builder.body(request.body.clone());
        }

        let response = builder.send().await.map_err(|err| {
            AppError::with_source(
                ErrorKind::ExternalService,
                format!("upstream request failed: {err}"),
                err,
            )
        })?;

        let status =
            StatusCode::from_u16(response.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(String::from);
        let body = response.bytes().await.map_err(|err| {
            AppError::with_source(
                ErrorKind::ExternalService,
                format!("failed to read upstream response body: {err}"),
                err,
            )
        })?;

        Ok(UpstreamResponse {
            status,
            content_type,
            body,
        })
    }
}
