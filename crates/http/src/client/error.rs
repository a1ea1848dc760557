//! Client error types

use portico_core::ResultCode;
use serde_json::Value as JsonValue;
use thiserror::Error;

/// Client error types
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or request error
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server returned an error status
    #[error("Server error {status}: {message}")]
    ServerError { status: u16, message: String },

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Bad request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Forbidden
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The envelope carried a non-success code; displays as the server message
    #[error("{message}")]
    Api {
        code: ResultCode,
        message: String,
        data: JsonValue,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl ClientError {
    /// Create error from HTTP status code
    pub fn from_status(status: reqwest::StatusCode, message: String) -> Self {
        match status.as_u16() {
            400 => Self::BadRequest(message),
            401 => Self::AuthenticationFailed(message),
            403 => Self::Forbidden(message),
            404 => Self::NotFound(message),
            _ => Self::ServerError {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// Envelope code, for application-level failures
    pub fn code(&self) -> Option<&ResultCode> {
        match self {
            Self::Api { code, .. } => Some(code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_displays_server_message() {
        let error = ClientError::Api {
            code: ResultCode::from("50000"),
            message: "Something went wrong".to_string(),
            data: JsonValue::Null,
        };
        assert_eq!(error.to_string(), "Something went wrong");
        assert_eq!(error.code().map(ResultCode::as_str), Some("50000"));
    }

    #[test]
    fn test_from_status_mapping() {
        let error = ClientError::from_status(reqwest::StatusCode::UNAUTHORIZED, "nope".into());
        assert!(matches!(error, ClientError::AuthenticationFailed(_)));

        let error = ClientError::from_status(reqwest::StatusCode::BAD_GATEWAY, "down".into());
        assert!(matches!(error, ClientError::ServerError { status: 502, .. }));
    }
}
