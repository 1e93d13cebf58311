//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use console_auth::client::TokenExchange;
use console_auth::store::CredentialStore;
use console_core::config::AppConfig;

use crate::upstream::UpstreamClient;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped or cheaply cloneable.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Session cookie store.
    pub store: CredentialStore,
    /// Token issuance/refresh exchanges (login and refresh handlers).
    pub auth: Arc<dyn TokenExchange>,
    /// Authorized upstream client (document proxy handlers).
    pub upstream: Arc<UpstreamClient>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("store", &self.store)
            .field("upstream", &self.upstream)
            .finish_non_exhaustive()
    }
}
