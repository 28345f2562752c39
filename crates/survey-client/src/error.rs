//! Error types for survey-client

use serde::Deserialize;

/// Code the server uses for expired identity tokens
pub const EXPIRED_TOKEN_CODE: &str = "id-token-expired";

/// Error payload returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub(crate) error: String,
    #[serde(default)]
    pub(crate) code: String,
    #[serde(default)]
    pub(crate) details: Option<String>,
}

/// Client failures
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport failure or undecodable reply
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with an error status
    #[error("{message} (status {status}, code {code})")]
    Api {
        status: u16,
        code: String,
        message: String,
        details: Option<String>,
    },

    /// Request or reply body could not be (de)serialized
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Token provider could not supply a token
    #[error("token unavailable: {0}")]
    Token(String),
}

impl ClientError {
    pub(crate) fn from_body(status: u16, body: ApiErrorBody) -> Self {
        Self::Api {
            status,
            code: body.code,
            message: body.error,
            details: body.details,
        }
    }

    /// Check if the server rejected the token as expired
    #[inline]
    #[must_use]
    pub fn is_expired_token(&self) -> bool {
        matches!(self, Self::Api { code, .. } if code == EXPIRED_TOKEN_CODE)
    }

    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status: 404, .. })
    }

    /// Stable error code, when the server sent one
    #[must_use]
    pub fn code(&self) -> Option<&str> {
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
    fn expired_code_is_detected() {
        let err = ClientError::from_body(
            401,
            ApiErrorBody {
                error: "Unauthorized - id-token-expired".to_string(),
                code: EXPIRED_TOKEN_CODE.to_string(),
                details: None,
            },
        );
        assert!(err.is_expired_token());
        assert!(!err.is_not_found());
        assert_eq!(err.code(), Some("id-token-expired"));
    }

    #[test]
    fn not_found_by_status() {
        let err = ClientError::Api {
            status: 404,
            code: "not-found".to_string(),
            message: "Survey not found or unauthorized".to_string(),
            details: None,
        };
        assert!(err.is_not_found());
        assert!(!ClientError::Token("signed out".to_string()).is_expired_token());
    }
}
