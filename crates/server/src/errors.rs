use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use backend::ClientError;
use service::BrokerError;
use thiserror::Error;

/// Broker failure rendered as an OSB error body.
#[derive(Debug)]
pub struct ApiError(pub BrokerError);

impl From<BrokerError> for ApiError {
    fn from(e: BrokerError) -> Self {
        Self(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            BrokerError::MissingParameter(_) | BrokerError::InvalidParameter { .. } => StatusCode::BAD_REQUEST,
            BrokerError::NoSuchInstance(_) => StatusCode::NOT_FOUND,
            BrokerError::InstanceAlreadyExists(_) => StatusCode::CONFLICT,
            BrokerError::CredentialMissingField { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            BrokerError::BackendRejected(_) | BrokerError::Backend(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = serde_json::json!({"error": self.0.kind(), "description": self.0.to_string()});
        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("backend client: {0}")]
    Backend(#[from] ClientError),
}
