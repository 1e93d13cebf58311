//! Cookie-backed credential store.
//!
//! The token bundle lives client-side in a single JSON cookie; the gateway
//! reads it from inbound requests and (re)writes it on responses through
//! the [`CookieJar`]. Absence is a normal state, never an error.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::OffsetDateTime;
use tracing::{error, warn};

use console_core::AppResult;

use crate::token::TokenBundle;

/// Result of reading the session cookie.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadedSession {
    /// A well-formed bundle was found.
    Present(TokenBundle),
    /// No session cookie exists.
    Absent,
    /// A cookie exists but does not deserialize; callers must clear it.
    Corrupt,
}

impl LoadedSession {
    /// Collapse into the bundle, treating `Corrupt` as absent.
    pub fn bundle(self) -> Option<TokenBundle> {
        match self {
            Self::Present(bundle) => Some(bundle),
            Self::Absent | Self::Corrupt => None,
        }
    }
}

/// How a request's outcome changes the persisted session.
///
/// Produced by the upstream interceptor and applied to the response jar by
/// the handler, so retry/refresh state is threaded explicitly instead of
/// mutated on a shared request object.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionUpdate {
    /// Keep the existing cookie.
    Unchanged,
    /// A refresh succeeded; persist the new bundle.
    Refreshed(TokenBundle),
    /// The session is terminal; remove the cookie.
    Cleared,
}

/// Reads and writes the session cookie holding the serialized
/// [`TokenBundle`].
#[derive(Debug, Clone)]
pub struct CredentialStore {
    cookie_name: String,
    secure: bool,
}

impl CredentialStore {
    /// Create a store for the given cookie name. `secure` marks the cookie
    /// HTTPS-only and should be enabled in production.
    pub fn new(cookie_name: impl Into<String>, secure: bool) -> Self {
        Self {
            cookie_name: cookie_name.into(),
            secure,
        }
    }

    /// The configured session cookie name.
    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Persist the bundle, overwriting any prior session cookie. The cookie
    /// lifetime is capped at the bundle's refresh-token expiry.
    pub fn save(&self, jar: CookieJar, bundle: &TokenBundle) -> AppResult<CookieJar> {
        Ok(jar.add(self.session_cookie(bundle)?))
    }

    /// Read the current session from a jar. Fails closed: a malformed
    /// cookie is reported as [`LoadedSession::Corrupt`], never an error.
    pub fn load(&self, jar: &CookieJar) -> LoadedSession {
        let Some(cookie) = jar.get(&self.cookie_name) else {
            return LoadedSession::Absent;
        };

        match serde_json::from_str::<TokenBundle>(cookie.value()) {
            Ok(bundle) => LoadedSession::Present(bundle),
            Err(err) => {
                warn!(
                    cookie = %self.cookie_name,
                    error = %err,
                    "session cookie is malformed; treating as absent"
                );
                LoadedSession::Corrupt
            }
        }
    }

    /// Remove the session cookie. Idempotent: removing an absent cookie is
    /// a no-op on the client.
    pub fn delete(&self, jar: CookieJar) -> CookieJar {
        jar.remove(
            Cookie::build((self.cookie_name.clone(), ""))
                .path("/")
                .build(),
        )
    }

    /// Apply an interceptor outcome to the response jar.
    pub fn apply(&self, jar: CookieJar, update: SessionUpdate) -> CookieJar {
        match update {
            SessionUpdate::Unchanged => jar,
            SessionUpdate::Refreshed(bundle) => match self.session_cookie(&bundle) {
                Ok(cookie) => jar.add(cookie),
                Err(err) => {
                    error!(error = %err, "failed to serialize refreshed session; clearing");
                    self.delete(jar)
                }
            },
            SessionUpdate::Cleared => self.delete(jar),
        }
    }

    fn session_cookie(&self, bundle: &TokenBundle) -> AppResult<Cookie<'static>> {
        let value = serde_json::to_string(bundle)?;

        let mut cookie = Cookie::new(self.cookie_name.clone(), value);
        cookie.set_path("/");
        cookie.set_http_only(true);
        cookie.set_same_site(SameSite::Strict);
        cookie.set_secure(self.secure);
        // Cap the cookie lifetime at the refresh token's validity; past
        // that point the bundle can never be used again.
        if let Ok(expires) =
            OffsetDateTime::from_unix_timestamp(bundle.refresh_token_expires_at.timestamp())
        {
            cookie.set_expires(expires);
        }

        Ok(cookie)
    }
}
