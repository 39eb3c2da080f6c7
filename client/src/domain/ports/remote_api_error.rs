//! Error shared by every remote API port.

use super::define_port_error;
use crate::domain::ErrorCode;

define_port_error! {
    /// Failures surfaced while talking to the CRM service.
    pub enum RemoteApiError {
        /// The request never produced a response.
        Transport { message: String } => "network error: {message}",
        /// The request exceeded its deadline.
        Timeout { message: String } => "request timed out: {message}",
        /// The server rejected the credentials or token (HTTP 401).
        Unauthorized { message: String } => "not authorised: {message}",
        /// The resource does not exist (HTTP 404).
        NotFound { message: String } => "not found: {message}",
        /// Any other non-success status.
        Status { status: u16, message: String } =>
            "server responded with {status}: {message}",
        /// The response body did not match the expected shape.
        Decode { message: String } => "unexpected response: {message}",
    }
}

impl RemoteApiError {
    /// Domain error category for this failure.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Unauthorized { .. } => ErrorCode::Unauthorized,
            Self::NotFound { .. } => ErrorCode::NotFound,
            Self::Transport { .. }
            | Self::Timeout { .. }
            | Self::Status { .. }
            | Self::Decode { .. } => ErrorCode::Network,
        }
    }

    /// Message carried by the variant, without the category prefix.
    pub fn detail(&self) -> &str {
        match self {
            Self::Transport { message }
            | Self::Timeout { message }
            | Self::Unauthorized { message }
            | Self::NotFound { message }
            | Self::Status { message, .. }
            | Self::Decode { message } => message.as_str(),
        }
    }
}
