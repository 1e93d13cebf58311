//! Token refresh coordination with single-flight de-duplication.
//!
//! The upstream may rotate or invalidate a refresh token on use, so two
//! concurrent exchanges with the same refresh token are a correctness
//! hazard: the loser ends up holding a dead credential. The coordinator
//! keys in-flight exchanges by refresh token; concurrent callers await the
//! one live exchange and share its result.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tokio::sync::OnceCell;
use tracing::{error, info, warn};

use console_core::{AppError, AppResult};

use crate::client::TokenExchange;
use crate::policy;
use crate::token::TokenBundle;

/// One in-flight refresh exchange. The settled result lives in the cell so
/// followers that lost the race still observe the leader's outcome.
#[derive(Default)]
struct Flight {
    result: OnceCell<AppResult<TokenBundle>>,
}

/// Serializes refresh exchanges per refresh token and converts wire tokens
/// into persisted bundles.
pub struct RefreshCoordinator {
    exchanger: Arc<dyn TokenExchange>,
    flights: DashMap<String, Arc<Flight>>,
    margin: Duration,
}

impl std::fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("margin", &self.margin)
            .field("in_flight", &self.flights.len())
            .finish()
    }
}

impl RefreshCoordinator {
    /// Create a coordinator that exchanges tokens through `exchanger` and
    /// treats access tokens within `margin` of expiry as due for refresh.
    pub fn new(exchanger: Arc<dyn TokenExchange>, margin: Duration) -> Self {
        Self {
            exchanger,
            flights: DashMap::new(),
            margin,
        }
    }

    /// The configured proactive-refresh margin.
    pub fn margin(&self) -> Duration {
        self.margin
    }

    /// Exchange the bundle's refresh token for a new bundle.
    ///
    /// Fails with a session error when the refresh token is already expired
    /// or the upstream rejects the exchange; the caller is responsible for
    /// clearing the persisted session. Never retries internally.
    ///
    /// Concurrent calls holding the same refresh token are collapsed into a
    /// single upstream exchange whose result every caller shares.
    pub async fn refresh(&self, current: &TokenBundle) -> AppResult<TokenBundle> {
        if policy::is_refresh_expired(current, Utc::now()) {
            return Err(AppError::session("Refresh token has expired"));
        }

        let key = current.refresh_token.clone();
        let flight = {
            let entry = self.flights.entry(key.clone()).or_default();
            Arc::clone(entry.value())
        };

        let result = flight
            .result
            .get_or_init(|| self.exchange(current.clone()))
            .await
            .clone();

        // Retire the settled flight so the next staleness event starts a
        // fresh exchange instead of replaying this result forever.
        self.flights
            .remove_if(&key, |_, inflight| Arc::ptr_eq(inflight, &flight));

        result
    }

    /// Proactive path: return a bundle whose access token is usable,
    /// refreshing first when it is inside the expiry margin. The flag
    /// reports whether a refresh happened (and must be persisted).
    pub async fn ensure_fresh(
        &self,
        bundle: TokenBundle,
        now: DateTime<Utc>,
    ) -> AppResult<(TokenBundle, bool)> {
        if policy::is_refresh_expired(&bundle, now) {
            return Err(AppError::session("Refresh token has expired"));
        }

        if policy::is_access_expired(&bundle, now, self.margin) {
            let fresh = self.refresh(&bundle).await?;
            return Ok((fresh, true));
        }

        Ok((bundle, false))
    }

    async fn exchange(&self, current: TokenBundle) -> AppResult<TokenBundle> {
        match self.exchanger.refresh(&current.refresh_token).await {
            Ok(token) => match token.into_bundle(Utc::now()) {
                Ok(bundle) => {
                    info!(user_id = bundle.user_id, "access token refreshed");
                    Ok(bundle)
                }
                Err(err) => {
                    error!(error = %err, "refresh produced an unusable token payload");
                    Err(err)
                }
            },
            Err(err) => {
                warn!(error = %err, "token refresh rejected; session is terminal");
                Err(AppError::session("Session refresh failed"))
            }
        }
    }
}
