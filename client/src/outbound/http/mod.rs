//! Reqwest-backed adapters for the CRM REST API.
//!
//! [`ApiClient`] owns transport details only: URL joining against the base,
//! bearer authorisation from the token store, timeouts, HTTP error mapping and
//! JSON decoding. It implements the auth, customer and analytics ports.

mod analytics;
mod auth;
mod customers;
mod dto;

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use self::dto::ErrorBodyDto;
use crate::domain::ports::{RemoteApiError, TokenSlot, TokenStore};

/// Deadline applied to every request unless configured otherwise.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for the CRM API.
///
/// Clones share the connection pool and token store.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    tokens: Arc<dyn TokenStore>,
}

impl ApiClient {
    /// Build a client rooted at `base_url`.
    ///
    /// A missing trailing slash is added so relative endpoint paths resolve
    /// beneath the base path rather than replacing its last segment.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        base_url: Url,
        timeout: Duration,
        tokens: Arc<dyn TokenStore>,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: normalise_base_url(base_url),
            tokens,
        })
    }

    /// Base URL every endpoint is resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, RemoteApiError> {
        self.base_url
            .join(path)
            .map_err(|err| RemoteApiError::transport(format!("invalid endpoint '{path}': {err}")))
    }

    fn resource(&self, collection: &str, id: &str) -> Result<Url, RemoteApiError> {
        let mut url = self.endpoint(collection)?;
        url.path_segments_mut()
            .map_err(|()| RemoteApiError::transport("base URL cannot carry a path"))?
            .pop_if_empty()
            .push(id);
        Ok(url)
    }

    fn authorise(&self, request: RequestBuilder) -> RequestBuilder {
        match self.tokens.load(TokenSlot::Access) {
            Ok(Some(token)) => request.bearer_auth(token.expose()),
            Ok(None) => request,
            Err(err) => {
                debug!(error = %err, "sending request without bearer token");
                request
            }
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Vec<u8>, RemoteApiError> {
        let response = self
            .authorise(request)
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = response.status();
        let url = response.url().clone();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            let err = map_status_error(status, body.as_ref());
            debug!(%url, status = status.as_u16(), error = %err, "request rejected");
            return Err(err);
        }
        Ok(body.to_vec())
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, RemoteApiError> {
        let body = self.send(self.client.get(url)).await?;
        decode(&body)
    }

    async fn post_json<B, T>(&self, url: Url, payload: &B) -> Result<T, RemoteApiError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let body = self.send(self.client.post(url).json(payload)).await?;
        decode(&body)
    }

    async fn put_json<B, T>(&self, url: Url, payload: &B) -> Result<T, RemoteApiError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let body = self.send(self.client.put(url).json(payload)).await?;
        decode(&body)
    }

    async fn post_empty(&self, url: Url) -> Result<(), RemoteApiError> {
        self.send(self.client.post(url)).await.map(drop)
    }

    async fn delete_resource(&self, url: Url) -> Result<(), RemoteApiError> {
        self.send(self.client.delete(url)).await.map(drop)
    }
}

fn normalise_base_url(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, RemoteApiError> {
    serde_json::from_slice(body)
        .map_err(|err| RemoteApiError::decode(format!("invalid JSON payload: {err}")))
}

fn map_transport_error(error: reqwest::Error) -> RemoteApiError {
    if error.is_timeout() {
        RemoteApiError::timeout(error.to_string())
    } else if error.is_decode() {
        RemoteApiError::decode(error.to_string())
    } else {
        RemoteApiError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> RemoteApiError {
    let message = serde_json::from_slice::<ErrorBodyDto>(body)
        .ok()
        .and_then(|dto| dto.message)
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| {
            let preview = body_preview(body);
            if preview.is_empty() {
                format!("status {}", status.as_u16())
            } else {
                preview
            }
        });

    match status {
        StatusCode::UNAUTHORIZED => RemoteApiError::unauthorized(message),
        StatusCode::NOT_FOUND => RemoteApiError::not_found(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            RemoteApiError::timeout(message)
        }
        _ => RemoteApiError::status(status.as_u16(), message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
