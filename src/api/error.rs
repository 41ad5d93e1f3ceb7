//! API error types

use thiserror::Error;

/// Fixed user-facing message for transport-level failures.
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please check your connection.";

/// Fallback message for error responses without a `detail` field.
pub const GENERIC_SERVER_ERROR: &str = "An error occurred";

/// API error with classification
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Request was sent but no usable response came back.
    pub fn network() -> Self {
        Self::new(ApiErrorKind::Network, NETWORK_ERROR_MESSAGE)
    }

    /// Server responded with a non-2xx status.
    pub fn server(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Server, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Unknown, message)
    }
}

/// Error classification for user-triggered retry decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// Request never reached the server or nothing came back (timeout,
    /// connection refused, DNS failure)
    Network,
    /// Non-2xx status with a server-supplied detail message
    Server,
    /// Anything else (request construction, undecodable body)
    Unknown,
}

impl ApiErrorKind {
    /// Whether an explicit user retry is worth offering. Nothing in this
    /// crate retries automatically.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network | Self::Server)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
