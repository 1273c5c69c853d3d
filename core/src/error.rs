//! Error types for the animal spotter client.
//!
//! # Design
//! `NoToken` and `Unauthorized` get dedicated variants because callers route
//! both to the sign-in screen, while `RequestFailed` is something the user can
//! simply retry. Every failure is returned as a value; nothing in the client
//! panics on bad input from the caller or the server.

/// Errors returned by `SpotterClient` operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Transport failure or an unexpected status code.
    #[error("request failed: {0}")]
    RequestFailed(String),

    /// The operation needs a session token and none is stored.
    #[error("not signed in")]
    NoToken,

    /// The server returned 401 for the presented token.
    #[error("session token rejected by server")]
    Unauthorized,

    /// The response carried no body where one was expected.
    #[error("response contained no data")]
    NoData,

    /// The body was present but did not have the expected shape.
    #[error("decoding response failed: {0}")]
    DecodeFailed(String),

    /// Caller-supplied URL text is not an absolute http(s) URL.
    #[error("malformed URL: {0}")]
    MalformedUrl(String),
}

impl ApiError {
    /// The caller must sign in again before this call can succeed.
    pub fn requires_sign_in(&self) -> bool {
        matches!(self, Self::NoToken | Self::Unauthorized)
    }

    /// Repeating the same call may succeed.
    pub fn retryable(&self) -> bool {
        matches!(self, Self::RequestFailed(_) | Self::NoData)
    }
}

/// Failure below the HTTP semantic layer.
///
/// `status` is set when the response head arrived before the failure, for
/// example when reading the body broke off mid-stream.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("transport error: {message}")]
pub struct TransportError {
    pub message: String,
    pub status: Option<u16>,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(message: impl Into<String>, status: u16) -> Self {
        Self {
            message: message.into(),
            status: Some(status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_in_routing() {
        assert!(ApiError::NoToken.requires_sign_in());
        assert!(ApiError::Unauthorized.requires_sign_in());
        assert!(!ApiError::NoData.requires_sign_in());
        assert!(!ApiError::RequestFailed("x".into()).requires_sign_in());
    }

    #[test]
    fn retryable_kinds() {
        assert!(ApiError::RequestFailed("timeout".into()).retryable());
        assert!(ApiError::NoData.retryable());
        assert!(!ApiError::Unauthorized.retryable());
        assert!(!ApiError::DecodeFailed("x".into()).retryable());
        assert!(!ApiError::MalformedUrl("x".into()).retryable());
    }

    #[test]
    fn display_includes_detail() {
        let err = ApiError::MalformedUrl("not a url".into());
        assert_eq!(err.to_string(), "malformed URL: not a url");
        let err = TransportError::with_status("connection reset", 401);
        assert_eq!(err.to_string(), "transport error: connection reset");
    }
}
