//! Driven port for the authentication endpoints.

use async_trait::async_trait;

use super::RemoteApiError;
use crate::domain::{AccessToken, LoginCredentials, LoginResponse, SessionUser};

/// Remote session operations.
///
/// Implementations attach the stored access token themselves; callers only
/// pass what the endpoint body needs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchange credentials for tokens and the signed-in user.
    async fn login(&self, credentials: &LoginCredentials) -> Result<LoginResponse, RemoteApiError>;

    /// Invalidate the current token server-side.
    async fn logout(&self) -> Result<(), RemoteApiError>;

    /// Exchange a refresh token for a new access token.
    async fn refresh(&self, refresh_token: &AccessToken) -> Result<AccessToken, RemoteApiError>;

    /// Fetch the profile of the token holder.
    async fn current_user(&self) -> Result<SessionUser, RemoteApiError>;
}
