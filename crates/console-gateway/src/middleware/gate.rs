//! Admission gate — the checkpoint run before any protected route.
//!
//! Re-validates the session cookie on every inbound navigation and API
//! call. API-style routes are rejected with a structured 401; page routes
//! are redirected to the login entry point with the original path preserved
//! as a return target. On admission, `/api` routes get their authorization
//! headers rewritten from the validated bundle so downstream proxies never
//! re-derive them.

use axum::Json;
use axum::extract::{Request, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use tracing::debug;

use console_auth::policy;
use console_auth::store::LoadedSession;
use console_auth::token::TokenBundle;

use crate::error::ApiErrorResponse;
use crate::state::AppState;
use crate::upstream::TENANT_HEADER;

/// Routes served without a session: the login page, the token issuance and
/// refresh endpoints, logout (which only destroys the session), and health.
const PUBLIC_ROUTES: &[&str] = &[
    "/auth/login",
    "/api/auth/tenant/token",
    "/api/auth/refresh",
    "/api/auth/logout",
    "/api/health",
];

/// Static assets are never gated.
const STATIC_PREFIXES: &[&str] = &["/assets/", "/favicon.ico"];

fn is_public(path: &str) -> bool {
    PUBLIC_ROUTES.iter().any(|route| path.starts_with(route))
        || STATIC_PREFIXES
            .iter()
            .any(|prefix| path.starts_with(prefix))
}

/// Gate middleware. Runs for every route; public routes bypass it.
pub async fn admission_gate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    if is_public(&path) {
        return next.run(request).await;
    }

    let jar = CookieJar::from_headers(request.headers());

    let bundle = match state.store.load(&jar) {
        LoadedSession::Present(bundle) => bundle,
        LoadedSession::Absent => {
            debug!(path = %path, "no session cookie; rejecting");
            return reject(&state, jar, &path, false, "Not authenticated");
        }
        LoadedSession::Corrupt => {
            return reject(&state, jar, &path, true, "Not authenticated");
        }
    };

    if !bundle.user_role.is_admin() {
        debug!(path = %path, role = %bundle.user_role, "non-admin session; rejecting");
        return reject(&state, jar, &path, true, "Administrator access required");
    }

    // Strict check, no refresh margin: the gate cannot persist a refreshed
    // bundle into the triggering navigation, so it only rejects tokens that
    // are literally expired and lets the interceptor recover the session on
    // the next request.
    if policy::is_access_expired_strict(&bundle, Utc::now()) {
        debug!(path = %path, "access token expired; rejecting");
        return reject(&state, jar, &path, false, "Access token expired");
    }

    if path.starts_with("/api") && rewrite_headers(&mut request, &bundle).is_err() {
        return reject(&state, jar, &path, true, "Not authenticated");
    }

    next.run(request).await
}

/// Rewrite the outgoing authorization headers from the validated bundle.
/// Fails only when the stored credential cannot form a header value, which
/// is treated as corrupt state.
fn rewrite_headers(request: &mut Request, bundle: &TokenBundle) -> Result<(), ()> {
    let bearer =
        HeaderValue::from_str(&format!("Bearer {}", bundle.access_token)).map_err(|_| ())?;
    request.headers_mut().insert(header::AUTHORIZATION, bearer);

    match bundle.tenant_id {
        Some(tenant_id) => {
            let value = HeaderValue::from_str(&tenant_id.to_string()).map_err(|_| ())?;
            request.headers_mut().insert(TENANT_HEADER, value);
        }
        None => {
            request.headers_mut().remove(TENANT_HEADER);
        }
    }

    Ok(())
}

fn reject(state: &AppState, jar: CookieJar, path: &str, clear: bool, message: &str) -> Response {
    let jar = if clear { state.store.delete(jar) } else { jar };

    if path.starts_with("/api") {
        let body = ApiErrorResponse {
            error: "UNAUTHORIZED".to_string(),
            message: message.to_string(),
        };
        return (StatusCode::UNAUTHORIZED, jar, Json(body)).into_response();
    }

    let target = format!("/auth/login?redirect={}", urlencoding::encode(path));
    (jar, Redirect::temporary(&target)).into_response()
}
