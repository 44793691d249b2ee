use thiserror::Error;

use crate::status::StatusClass;

/// Failures of a single backend round trip. None of them are retried here.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ClientError {
    #[error("backend responded with {0}")]
    Status(StatusClass),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("invalid backend endpoint: {0}")]
    InvalidEndpoint(String),
}

impl ClientError {
    /// HTTP status reported by the backend, when the failure came from one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ClientError::Status(class) => class.code(),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ClientError::Status(_) => "status",
            ClientError::Transport(_) => "transport",
            ClientError::Decode(_) => "decode",
            ClientError::InvalidEndpoint(_) => "endpoint",
        }
    }
}
