//! Backend error types

use thiserror::Error;

/// Backend error with classification
#[derive(Debug, Error)]
#[error("{message}")]
pub struct BackendError {
    pub kind: BackendErrorKind,
    pub message: String,
}

impl BackendError {
    pub fn new(kind: BackendErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Timeout, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Network, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Decode, message)
    }

    /// Non-2xx response; the body is kept short since it only goes to logs
    pub fn status(status: u16, body: &str) -> Self {
        let excerpt: String = body.chars().take(200).collect();
        Self::new(
            BackendErrorKind::Status(status),
            format!("HTTP {status}: {excerpt}"),
        )
    }

    pub fn from_reqwest(error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::timeout(format!("Request timeout: {error}"))
        } else if error.is_connect() {
            Self::network(format!("Connection failed: {error}"))
        } else {
            Self::network(format!("Request failed: {error}"))
        }
    }
}

/// Error classification for logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendErrorKind {
    /// The call did not finish within its deadline
    Timeout,
    /// Connection refused, reset, DNS failure
    Network,
    /// The backend answered with a non-2xx status
    Status(u16),
    /// The response body did not match the contract
    Decode,
}

impl std::fmt::Display for BackendErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendErrorKind::Timeout => write!(f, "timeout"),
            BackendErrorKind::Network => write!(f, "network"),
            BackendErrorKind::Status(code) => write!(f, "status {code}"),
            BackendErrorKind::Decode => write!(f, "decode"),
        }
    }
}
