//! Error types for Aquila client operations

use reqwest::header::HeaderMap;
use thiserror::Error;

use crate::rest::ResponseData;

/// Result type alias for Aquila client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur while executing a request.
///
/// Three failure classes matter to callers: transport failures (no
/// response was obtained, [`ClientError::status`] is `None`), decode
/// failures (a body arrived but could not be parsed in the requested
/// mode), and HTTP failures (status >= 400, with the decoded body and
/// response headers preserved for inspection).
#[derive(Error, Debug)]
pub enum ClientError {
    /// The request never completed: connection refused, DNS failure,
    /// reset, timeout.
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// IO error (upload source or download destination)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A header name or value could not be encoded
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// Request body could not be serialized
    #[error("Failed to serialize request body: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Response body could not be decoded in the requested mode
    #[error("Failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),

    /// Server answered with an error status
    #[error("HTTP error - {status} {status_text}")]
    Http {
        status: u16,
        status_text: String,
        headers: HeaderMap,
        data: ResponseData,
    },
}

impl ClientError {
    /// Status code of an HTTP failure; `None` for transport, decode and
    /// local failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Decoded body of an HTTP failure, if any.
    pub fn data(&self) -> Option<&ResponseData> {
        match self {
            Self::Http { data, .. } => Some(data),
            _ => None,
        }
    }

    /// Response headers of an HTTP failure.
    pub fn headers(&self) -> Option<&HeaderMap> {
        match self {
            Self::Http { headers, .. } => Some(headers),
            _ => None,
        }
    }

    pub(crate) fn invalid_header(err: impl std::fmt::Display) -> Self {
        Self::InvalidHeader(err.to_string())
    }
}
