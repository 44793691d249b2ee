//! Classification of backend HTTP status codes.

use std::fmt;

use crate::error::ClientError;

/// Outcome of looking at a backend response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusClass {
    Success,
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    MethodNotAllowed,
    Conflict,
    OverLimit,
    UnsupportedMediaType,
    Unprocessable,
    RateLimited,
    InternalFault,
    NotImplemented,
    Unavailable,
    Unexpected(u16),
}

/// Map a raw status code onto its class. Total over `u16`.
pub fn classify(code: u16) -> StatusClass {
    match code {
        200 | 201 | 202 | 204 | 206 => StatusClass::Success,
        400 => StatusClass::BadRequest,
        401 => StatusClass::Unauthorized,
        403 => StatusClass::Forbidden,
        404 => StatusClass::NotFound,
        405 => StatusClass::MethodNotAllowed,
        409 => StatusClass::Conflict,
        413 => StatusClass::OverLimit,
        415 => StatusClass::UnsupportedMediaType,
        422 => StatusClass::Unprocessable,
        429 => StatusClass::RateLimited,
        500 => StatusClass::InternalFault,
        501 => StatusClass::NotImplemented,
        503 => StatusClass::Unavailable,
        other => StatusClass::Unexpected(other),
    }
}

/// `Ok(())` for success classes, otherwise the matching [`ClientError::Status`].
pub fn check_status(code: u16) -> Result<(), ClientError> {
    match classify(code) {
        StatusClass::Success => Ok(()),
        failure => Err(ClientError::Status(failure)),
    }
}

impl StatusClass {
    pub fn is_success(&self) -> bool {
        matches!(self, StatusClass::Success)
    }

    /// The status code a failure class stands for. `None` for success,
    /// which covers several codes.
    pub fn code(&self) -> Option<u16> {
        let code = match self {
            StatusClass::Success => return None,
            StatusClass::BadRequest => 400,
            StatusClass::Unauthorized => 401,
            StatusClass::Forbidden => 403,
            StatusClass::NotFound => 404,
            StatusClass::MethodNotAllowed => 405,
            StatusClass::Conflict => 409,
            StatusClass::OverLimit => 413,
            StatusClass::UnsupportedMediaType => 415,
            StatusClass::Unprocessable => 422,
            StatusClass::RateLimited => 429,
            StatusClass::InternalFault => 500,
            StatusClass::NotImplemented => 501,
            StatusClass::Unavailable => 503,
            StatusClass::Unexpected(code) => *code,
        };
        Some(code)
    }
}

impl fmt::Display for StatusClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusClass::Success => f.write_str("success"),
            StatusClass::BadRequest => f.write_str("400 bad request"),
            StatusClass::Unauthorized => f.write_str("401 unauthorized"),
            StatusClass::Forbidden => f.write_str("403 forbidden"),
            StatusClass::NotFound => f.write_str("404 not found"),
            StatusClass::MethodNotAllowed => f.write_str("405 method not allowed"),
            StatusClass::Conflict => f.write_str("409 conflict"),
            StatusClass::OverLimit => f.write_str("413 over limit"),
            StatusClass::UnsupportedMediaType => f.write_str("415 unsupported media type"),
            StatusClass::Unprocessable => f.write_str("422 unprocessable"),
            StatusClass::RateLimited => f.write_str("429 too many requests"),
            StatusClass::InternalFault => f.write_str("500 internal fault"),
            StatusClass::NotImplemented => f.write_str("501 not implemented"),
            StatusClass::Unavailable => f.write_str("503 service unavailable"),
            StatusClass::Unexpected(code) => write!(f, "unexpected status code {code}"),
        }
    }
}
