use backend::ClientError;
use thiserror::Error;

/// Failures of a broker operation, as reported to the protocol layer.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BrokerError {
    #[error("missing required parameter: {0}")]
    MissingParameter(String),
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },
    #[error("no such instance with ID {0}")]
    NoSuchInstance(String),
    #[error("instance {0} already exists")]
    InstanceAlreadyExists(String),
    #[error("credential of instance {instance_id} has no {field}")]
    CredentialMissingField { instance_id: String, field: &'static str },
    #[error("backend reported failure: {0}")]
    BackendRejected(String),
    #[error(transparent)]
    Backend(#[from] ClientError),
}

impl BrokerError {
    pub fn invalid(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter { name: name.to_string(), reason: reason.into() }
    }

    /// Short machine-readable kind, used in error bodies and metrics labels.
    pub fn kind(&self) -> &'static str {
        match self {
            BrokerError::MissingParameter(_) => "MissingParameter",
            BrokerError::InvalidParameter { .. } => "InvalidParameter",
            BrokerError::NoSuchInstance(_) => "NoSuchInstance",
            BrokerError::InstanceAlreadyExists(_) => "InstanceAlreadyExists",
            BrokerError::CredentialMissingField { .. } => "CredentialMissingField",
            BrokerError::BackendRejected(_) => "BackendRejected",
            BrokerError::Backend(_) => "BackendError",
        }
    }

    /// Caller mistakes, surfaced without contacting the backend.
    pub fn is_caller_error(&self) -> bool {
        matches!(self, BrokerError::MissingParameter(_) | BrokerError::InvalidParameter { .. })
    }
}
