//! HTTP error mapping
//!
//! Every failure leaves the API as JSON `{error, code, details?}` with a
//! stable machine-readable `code`.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use survey_auth::AuthError;
use survey_core::{StoreError, ValidationError};

pub const NOT_FOUND_CODE: &str = "not-found";
pub const VALIDATION_CODE: &str = "validation-failed";
pub const MALFORMED_PAYLOAD_CODE: &str = "malformed-payload";
pub const STORE_FAILURE_CODE: &str = "store-failure";

/// Wire shape of every error response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Request-level failures
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("Survey not found or unauthorized")]
    NotFound,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error("store failure: {0}")]
    Store(String),
}

impl AppError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Validation(_) | Self::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Auth(err) => err.code(),
            Self::NotFound => NOT_FOUND_CODE,
            Self::Validation(_) => VALIDATION_CODE,
            Self::MalformedPayload(_) => MALFORMED_PAYLOAD_CODE,
            Self::Store(_) => STORE_FAILURE_CODE,
        }
    }

    fn body(&self) -> ErrorBody {
        let (error, details) = match self {
            Self::Auth(AuthError::MissingToken | AuthError::MalformedHeader) => {
                ("Unauthorized - No token provided".to_string(), None)
            }
            Self::Auth(err) if err.is_expired() => (
                format!("Unauthorized - {}", err.code()),
                Some(err.to_string()),
            ),
            Self::Auth(_) => ("Unauthorized - Invalid token".to_string(), None),
            Self::NotFound => (self.to_string(), None),
            Self::Validation(err) => ("Invalid request".to_string(), Some(err.to_string())),
            Self::MalformedPayload(reason) => {
                ("Malformed payload".to_string(), Some(reason.clone()))
            }
            Self::Store(message) => ("Store operation failed".to_string(), Some(message.clone())),
        };

        ErrorBody {
            error,
            code: self.code().to_string(),
            details,
        }
    }
}

/// Failures while bringing the server up
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    #[error("identity key: {0}")]
    Identity(#[from] AuthError),

    #[error("store: {0}")]
    Store(#[from] StoreError),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        if err.is_not_found() {
            Self::NotFound
        } else {
            Self::Store(err.to_string())
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::MalformedPayload(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            Self::Store(message) => tracing::error!(%message, "request failed"),
            Self::Auth(err) => tracing::debug!(error = %err, "request rejected"),
            other => tracing::debug!(error = %other, "request failed"),
        }

        (status, Json(self.body())).into_response()
    }
}
