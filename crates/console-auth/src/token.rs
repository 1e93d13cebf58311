//! Token wire format and the persisted token bundle.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{error, warn};

use console_core::{AppError, AppResult};

/// Roles the upstream backend assigns to users.
///
/// Only [`UserRole::Admin`] is admitted to the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    /// Cross-tenant platform administrator.
    SuperAdmin,
    /// Tenant administrator; the only role this console serves.
    Admin,
    /// Regular end user.
    User,
}

impl UserRole {
    /// Check if this role is a tenant admin.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Return the role as its wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "SUPER_ADMIN",
            Self::Admin => "ADMIN",
            Self::User => "USER",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SUPER_ADMIN" => Ok(Self::SuperAdmin),
            "ADMIN" => Ok(Self::Admin),
            "USER" => Ok(Self::User),
            _ => Err(AppError::validation(format!(
                "Invalid user role: '{s}'. Expected one of: SUPER_ADMIN, ADMIN, USER"
            ))),
        }
    }
}

/// Token payload exactly as the upstream issuance/refresh endpoints return
/// it. Lifetimes are *relative* (seconds); they are converted to absolute
/// timestamps exactly once, via [`Token::into_bundle`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// Opaque bearer credential.
    pub access_token: String,
    /// Longer-lived opaque credential used to obtain new access tokens.
    pub refresh_token: String,
    /// Token scheme tag (normally `"bearer"`).
    pub token_type: String,
    /// Role of the authenticated user.
    pub user_role: UserRole,
    /// Tenant context, forwarded as a header when present.
    pub tenant_id: Option<i64>,
    /// Human-readable tenant name.
    pub tenant_name: Option<String>,
    /// URL-safe tenant identifier.
    pub tenant_slug: Option<String>,
    /// Numeric user identifier.
    pub user_id: i64,
    /// Access token lifetime in seconds.
    pub expires_in: Option<i64>,
    /// Refresh token lifetime in seconds.
    pub refresh_token_expires_in: Option<i64>,
}

impl Token {
    /// Convert the wire token into a persistable bundle, deriving absolute
    /// expiry timestamps from the relative lifetimes at `now`.
    ///
    /// Missing lifetimes are a backend contract violation and fail the
    /// conversion; they are never silently defaulted.
    pub fn into_bundle(self, now: DateTime<Utc>) -> AppResult<TokenBundle> {
        let expires_in = self
            .expires_in
            .ok_or_else(|| contract_error("expires_in"))?;
        let refresh_expires_in = self
            .refresh_token_expires_in
            .ok_or_else(|| contract_error("refresh_token_expires_in"))?;

        let expires_at = now + Duration::seconds(expires_in);
        let refresh_token_expires_at = now + Duration::seconds(refresh_expires_in);

        if refresh_token_expires_at <= expires_at {
            warn!(
                user_id = self.user_id,
                expires_in,
                refresh_expires_in,
                "refresh token does not outlive the access token"
            );
        }

        Ok(TokenBundle {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            token_type: self.token_type,
            user_role: self.user_role,
            tenant_id: self.tenant_id,
            tenant_name: self.tenant_name,
            tenant_slug: self.tenant_slug,
            user_id: self.user_id,
            expires_at,
            refresh_token_expires_at,
        })
    }
}

/// The sole persisted entity: a wire token with its lifetimes resolved to
/// absolute timestamps. Serialized as JSON into the session cookie.
///
/// A bundle is replaced wholesale on every login and refresh; there is no
/// partial update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenBundle {
    /// Opaque bearer credential.
    pub access_token: String,
    /// Longer-lived opaque credential used to obtain new access tokens.
    pub refresh_token: String,
    /// Token scheme tag.
    pub token_type: String,
    /// Role of the authenticated user.
    pub user_role: UserRole,
    /// Tenant context, forwarded as a header when present.
    pub tenant_id: Option<i64>,
    /// Human-readable tenant name.
    pub tenant_name: Option<String>,
    /// URL-safe tenant identifier.
    pub tenant_slug: Option<String>,
    /// Numeric user identifier.
    pub user_id: i64,
    /// Absolute access-token expiry.
    pub expires_at: DateTime<Utc>,
    /// Absolute refresh-token expiry.
    pub refresh_token_expires_at: DateTime<Utc>,
}

fn contract_error(field: &str) -> AppError {
    error!(
        field,
        "token response omitted a lifetime; the backend must supply relative expiries"
    );
    AppError::external_service(format!("Token response omitted '{field}'"))
}
