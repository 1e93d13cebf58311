//! Pure expiry and admission policy.
//!
//! Every function is deterministic given a bundle and a wall-clock `now`,
//! so tests can pin time without fake clocks.

use chrono::{DateTime, Duration, Utc};

use crate::token::TokenBundle;

/// Default lead time before literal expiry at which a proactive refresh is
/// triggered, so the server never sees an actually-expired access token.
pub const DEFAULT_REFRESH_MARGIN_SECS: i64 = 60;

/// The default refresh margin as a duration.
pub fn default_refresh_margin() -> Duration {
    Duration::seconds(DEFAULT_REFRESH_MARGIN_SECS)
}

/// True when the access token is due for refresh: `now` has reached
/// `expires_at - margin`.
///
/// Monotonic in `now`: once true it stays true for any later instant.
pub fn is_access_expired(bundle: &TokenBundle, now: DateTime<Utc>, margin: Duration) -> bool {
    now >= bundle.expires_at - margin
}

/// True when the access token is literally expired, with no margin.
///
/// This is the admission-gate check: the gate cannot persist a refreshed
/// bundle back into the triggering navigation, so it must not refresh
/// proactively; it only rejects tokens that are genuinely past expiry.
pub fn is_access_expired_strict(bundle: &TokenBundle, now: DateTime<Utc>) -> bool {
    now >= bundle.expires_at
}

/// True when the refresh token itself can no longer be exchanged.
pub fn is_refresh_expired(bundle: &TokenBundle, now: DateTime<Utc>) -> bool {
    now >= bundle.refresh_token_expires_at
}

/// True when the bundle admits its holder to the console: admin role and
/// an access token that is not literally expired.
pub fn is_admitted(bundle: &TokenBundle, now: DateTime<Utc>) -> bool {
    bundle.user_role.is_admin() && !is_access_expired_strict(bundle, now)
}
