//! [`AuthApi`] over HTTP.

use async_trait::async_trait;

use super::ApiClient;
use super::dto::{LoginRequestDto, LoginResponseDto, RefreshRequestDto, RefreshResponseDto};
use crate::domain::ports::{AuthApi, RemoteApiError};
use crate::domain::{AccessToken, LoginCredentials, LoginResponse, SessionUser};

#[async_trait]
impl AuthApi for ApiClient {
    async fn login(&self, credentials: &LoginCredentials) -> Result<LoginResponse, RemoteApiError> {
        let request = LoginRequestDto {
            email: credentials.email(),
            password: credentials.password(),
        };
        let response: LoginResponseDto = self
            .post_json(self.endpoint("auth/login")?, &request)
            .await?;
        Ok(response.into())
    }

    async fn logout(&self) -> Result<(), RemoteApiError> {
        self.post_empty(self.endpoint("auth/logout")?).await
    }

    async fn refresh(&self, refresh_token: &AccessToken) -> Result<AccessToken, RemoteApiError> {
        let request = RefreshRequestDto {
            refresh_token: refresh_token.expose(),
        };
        let response: RefreshResponseDto = self
            .post_json(self.endpoint("auth/refresh")?, &request)
            .await?;
        Ok(AccessToken::new(response.access_token))
    }

    async fn current_user(&self) -> Result<SessionUser, RemoteApiError> {
        self.get_json(self.endpoint("auth/me")?).await
    }
}
