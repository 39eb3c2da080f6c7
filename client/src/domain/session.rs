//! Session data: the signed-in user and the tokens that authorise requests.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// Role string that grants every permission.
pub const ADMIN_ROLE: &str = "admin";

/// Name reported when nobody is signed in.
pub const GUEST_NAME: &str = "Guest";

/// Authenticated user as returned by the auth API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    /// Server-assigned user identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Email address, when the server shares it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Role name; [`ADMIN_ROLE`] implies every permission.
    pub role: String,
    /// Explicit permission grants.
    #[serde(default)]
    pub permissions: BTreeSet<String>,
}

impl SessionUser {
    /// Whether the user holds the admin role.
    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }

    /// Admins hold every permission; everyone else needs an explicit grant.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.is_admin() || self.permissions.contains(permission)
    }
}

/// Bearer token kept out of logs and wiped on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(Zeroizing<String>);

impl AccessToken {
    /// Wrap a raw token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(Zeroizing::new(token.into()))
    }

    /// Raw token for the `Authorization` header.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

impl From<&str> for AccessToken {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for AccessToken {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Successful login payload.
#[derive(Clone, PartialEq, Eq)]
pub struct LoginResponse {
    /// Token used on subsequent requests.
    pub access_token: AccessToken,
    /// Token exchanged for a new access token, when issued.
    pub refresh_token: Option<AccessToken>,
    /// The user who signed in.
    pub user: SessionUser,
}

impl fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginResponse")
            .field("access_token", &self.access_token)
            .field("refresh_token", &self.refresh_token)
            .field("user", &self.user)
            .finish()
    }
}

/// Observable session lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    /// No token is held.
    Anonymous,
    /// A login is in flight.
    Authenticating,
    /// A token is held.
    Authenticated,
    /// The last login failed.
    Error,
}

/// Result of confirming the session against the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchUserOutcome {
    /// No token was held, so nothing was fetched.
    Skipped,
    /// The profile was refreshed.
    Refreshed(SessionUser),
    /// The server rejected the session and it was reset.
    SessionInvalidated,
    /// The session was reset while the fetch was in flight.
    Superseded,
}
