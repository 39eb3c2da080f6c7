//! Wire DTOs for the auth endpoints and error bodies.
//!
//! Customer and analytics payloads decode straight into their domain types;
//! only the shapes that differ from the domain live here.

use serde::{Deserialize, Serialize};

use crate::domain::{AccessToken, LoginResponse, SessionUser};

#[derive(Debug, Deserialize)]
pub(super) struct ErrorBodyDto {
    #[serde(default)]
    pub(super) message: Option<String>,
}

#[derive(Serialize)]
pub(super) struct LoginRequestDto<'a> {
    pub(super) email: &'a str,
    pub(super) password: &'a str,
}

#[derive(Deserialize)]
pub(super) struct LoginResponseDto {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    user: SessionUser,
}

impl From<LoginResponseDto> for LoginResponse {
    fn from(value: LoginResponseDto) -> Self {
        Self {
            access_token: AccessToken::new(value.access_token),
            refresh_token: value.refresh_token.map(AccessToken::new),
            user: value.user,
        }
    }
}

#[derive(Serialize)]
pub(super) struct RefreshRequestDto<'a> {
    pub(super) refresh_token: &'a str,
}

#[derive(Deserialize)]
pub(super) struct RefreshResponseDto {
    pub(super) access_token: String,
}
