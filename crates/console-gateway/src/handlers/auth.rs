//! Auth handlers — login, refresh, logout.
//!
//! Login and refresh proxy the exchange to the upstream and own the session
//! cookie: a successful exchange replaces the bundle wholesale, a failed
//! refresh clears it.

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use tracing::{info, warn};

use console_auth::client::{LoginRequest, RefreshRequest};
use console_auth::token::TokenBundle;
use console_core::AppError;

use crate::dto::response::MessageResponse;
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/auth/tenant/token
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<(CookieJar, Json<TokenBundle>), ApiError> {
    let token = state.auth.login(&request).await?;

    // Only tenant admins may use this console. Rejected before anything is
    // persisted, so no cookie is issued.
    if !token.user_role.is_admin() {
        warn!(
            user_id = token.user_id,
            role = %token.user_role,
            tenant = %request.tenant_slug,
            "non-admin login rejected"
        );
        return Err(AppError::authorization("Administrator access required").into());
    }

    let bundle = token.into_bundle(Utc::now())?;
    let jar = state.store.save(jar, &bundle)?;

    info!(
        user_id = bundle.user_id,
        tenant = bundle.tenant_slug.as_deref().unwrap_or(""),
        "login succeeded"
    );

    Ok((jar, Json(bundle)))
}

/// POST /api/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<RefreshRequest>,
) -> Response {
    let exchanged = state
        .auth
        .refresh(&request.refresh_token)
        .await
        .and_then(|token| token.into_bundle(Utc::now()));

    match exchanged {
        Ok(bundle) => match state.store.save(jar, &bundle) {
            Ok(jar) => (jar, Json(bundle)).into_response(),
            Err(err) => ApiError(err).into_response(),
        },
        Err(err) => {
            warn!(error = %err, "refresh exchange failed; clearing session");
            let jar = state.store.delete(jar);
            (jar, ApiError(AppError::session("Session refresh failed"))).into_response()
        }
    }
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<MessageResponse>) {
    let jar = state.store.delete(jar);
    (
        jar,
        Json(MessageResponse {
            message: "Logged out".to_string(),
        }),
    )
}
