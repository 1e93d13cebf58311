//! Upstream backend configuration.

use serde::{Deserialize, Serialize};

/// Connection settings for the upstream backend API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the backend, without a trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds applied to every upstream call,
    /// including login and token refresh.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_request_timeout() -> u64 {
    30
}
