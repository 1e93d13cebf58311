//! Upstream auth client — login and token refresh exchanges.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use console_core::error::ErrorKind;
use console_core::{AppError, AppResult};

use crate::token::Token;

/// Login exchange payload for `POST /api/auth/tenant/token`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
    /// Tenant the user is logging into.
    pub tenant_slug: String,
}

/// Refresh exchange payload for `POST /api/auth/refresh`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshRequest {
    /// The refresh token to exchange.
    pub refresh_token: String,
}

/// Error body the upstream returns on non-2xx auth responses.
#[derive(Debug, Deserialize)]
struct ErrorDetail {
    detail: Option<String>,
}

/// Token issuance and refresh against the upstream backend.
///
/// A trait seam so the refresh coordinator and handlers can be tested with
/// fake exchanges instead of a live backend.
#[async_trait]
pub trait TokenExchange: Send + Sync {
    /// Exchange credentials for a token.
    async fn login(&self, request: &LoginRequest) -> AppResult<Token>;
    /// Exchange a refresh token for a new token.
    async fn refresh(&self, refresh_token: &str) -> AppResult<Token>;
}

/// HTTP implementation of [`TokenExchange`].
#[derive(Debug, Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
}

impl AuthClient {
    /// Create a client against the given upstream base URL (no trailing
    /// slash).
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    async fn exchange<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
        op: &str,
    ) -> AppResult<Token> {
        let url = format!("{}{}", self.base_url, path);

        let response = self.http.post(url).json(body).send().await.map_err(|err| {
            AppError::with_source(
                ErrorKind::ExternalService,
                format!("{op} request to the upstream failed: {err}"),
                err,
            )
        })?;

        let status = response.status();
        if status.is_success() {
            return response.json::<Token>().await.map_err(|err| {
                AppError::with_source(
                    ErrorKind::ExternalService,
                    format!("{op} returned an unreadable token payload"),
                    err,
                )
            });
        }

        let detail = response
            .json::<ErrorDetail>()
            .await
            .ok()
            .and_then(|body| body.detail);

        warn!(
            op,
            status = status.as_u16(),
            detail = detail.as_deref().unwrap_or(""),
            "upstream rejected the token exchange"
        );

        Err(match status.as_u16() {
            400 | 401 | 403 => {
                AppError::authentication(detail.unwrap_or_else(|| "Invalid credentials".into()))
            }
            404 => AppError::not_found(detail.unwrap_or_else(|| "Tenant not found".into())),
            _ => AppError::external_service(
                detail.unwrap_or_else(|| format!("{op} failed with status {status}")),
            ),
        })
    }
}

#[async_trait]
impl TokenExchange for AuthClient {
    async fn login(&self, request: &LoginRequest) -> AppResult<Token> {
        self.exchange("/api/auth/tenant/token", request, "login")
            .await
    }

    async fn refresh(&self, refresh_token: &str) -> AppResult<Token> {
        let request = RefreshRequest {
            refresh_token: refresh_token.to_string(),
        };
        self.exchange("/api/auth/refresh", &request, "refresh")
            .await
    }
}
