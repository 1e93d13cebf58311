//! Route definitions for the admin console gateway.
//!
//! API routes are mounted under `/api`; page shells sit at the root. The
//! admission gate wraps everything and internally bypasses its public
//! allowlist.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
};

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the Axum router with all routes and the admission gate.
///
/// Receives the fully-constructed `AppState` and threads it through
/// every route via `.with_state(state)`.
pub fn build_router(state: AppState) -> Router {
    let max_upload = state.config.server.max_upload_size_bytes as usize;

    let api_routes = Router::new()
        .merge(auth_routes())
        .merge(document_routes())
        .merge(health_routes());

    Router::new()
        .nest("/api", api_routes)
        .merge(page_routes())
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::gate::admission_gate,
        ))
        .layer(DefaultBodyLimit::max(max_upload))
        .with_state(state)
}

/// Auth endpoints: token issuance (login), refresh, logout
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/tenant/token", post(handlers::auth::login))
        .route("/auth/refresh", post(handlers::auth::refresh))
        .route("/auth/logout", post(handlers::auth::logout))
}

/// Document proxy endpoints
fn document_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/documents",
            get(handlers::documents::list_documents).post(handlers::documents::upload_document),
        )
        .route(
            "/documents/{id}",
            axum::routing::delete(handlers::documents::delete_document),
        )
        .route(
            "/documents/{id}/status",
            get(handlers::documents::document_status),
        )
}

/// Health check endpoints (no auth required)
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health_check))
}

/// Page shells: the public login page plus the gated console pages
fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::pages::dashboard))
        .route("/auth/login", get(handlers::pages::login))
        .route("/dashboard", get(handlers::pages::dashboard))
        .route("/documents", get(handlers::pages::documents))
        .route("/users", get(handlers::pages::users))
        .route("/settings", get(handlers::pages::settings))
}
