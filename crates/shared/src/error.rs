use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The request never produced an HTTP response.
    Transport,
    /// The service answered with a non-success status.
    Service,
    /// The response arrived but lacked the fields the client expects.
    ValidationGap,
}

/// Body the dispatch service sends alongside a non-success status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ApiError {
    pub kind: ErrorKind,
    pub status: Option<u16>,
    pub message: String,
}

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: None,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Transport, message)
    }

    pub fn service(status: u16, message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Service,
            status: Some(status),
            message: message.into(),
        }
    }

    pub fn validation_gap(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ValidationGap, message)
    }

    /// Builds the error for a non-success response, preferring the service's
    /// own message and falling back to the bare status.
    pub fn from_response_body(status: u16, body: &[u8]) -> Self {
        match serde_json::from_slice::<ErrorBody>(body) {
            Ok(parsed) if !parsed.error.trim().is_empty() => Self::service(status, parsed.error),
            _ => Self::service(status, format!("HTTP error {status}")),
        }
    }

    pub fn is_validation_gap(&self) -> bool {
        self.kind == ErrorKind::ValidationGap
    }
}
