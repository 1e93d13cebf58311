//! Session and credential configuration.

use serde::{Deserialize, Serialize};

/// Session cookie and token-expiry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Name of the session cookie holding the serialized token bundle.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Whether the session cookie is marked `Secure` (HTTPS only).
    /// Enable in production.
    #[serde(default)]
    pub cookie_secure: bool,
    /// Lead time in seconds before literal access-token expiry at which
    /// a proactive refresh is triggered.
    #[serde(default = "default_refresh_margin")]
    pub refresh_margin_seconds: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            cookie_secure: false,
            refresh_margin_seconds: default_refresh_margin(),
        }
    }
}

fn default_cookie_name() -> String {
    "session".to_string()
}

fn default_refresh_margin() -> i64 {
    60
}
