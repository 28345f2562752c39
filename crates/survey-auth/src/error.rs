//! Error types for identity verification

/// Code reported for expired tokens; clients re-authenticate on it
pub const EXPIRED_TOKEN_CODE: &str = "id-token-expired";

/// Code reported for every other authentication failure
pub const UNAUTHENTICATED_CODE: &str = "unauthenticated";

/// Authentication failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// No Authorization header
    #[error("no token provided")]
    MissingToken,

    /// Authorization header is not `Bearer <token>`
    #[error("malformed authorization header")]
    MalformedHeader,

    /// Token cannot be decoded
    #[error("malformed token: {0}")]
    MalformedToken(String),

    /// Token format version not understood
    #[error("unsupported token version: {0}")]
    UnsupportedVersion(String),

    /// Signature does not match the payload
    #[error("token signature invalid")]
    InvalidSignature,

    /// Token past its expiry
    #[error("{EXPIRED_TOKEN_CODE}: token expired at {expired_at}")]
    Expired { expired_at: u64 },

    /// Token minted by an unexpected issuer
    #[error("unexpected token issuer: {0}")]
    IssuerMismatch(String),

    /// Claims carry no subject
    #[error("token has no subject")]
    MissingSubject,

    /// Key material cannot be parsed
    #[error("invalid key: {0}")]
    InvalidKey(String),
}

impl AuthError {
    /// Check if the client should refresh its token and retry
    #[inline]
    #[must_use]
    pub fn is_expired(&self) -> bool {
        matches!(self, Self::Expired { .. })
    }

    /// Stable code for wire responses
    #[inline]
    #[must_use]
    pub fn code(&self) -> &'static str {
        if self.is_expired() {
            EXPIRED_TOKEN_CODE
        } else {
            UNAUTHENTICATED_CODE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expired_error_carries_code() {
        let err = AuthError::Expired { expired_at: 10 };
        assert!(err.is_expired());
        assert_eq!(err.code(), "id-token-expired");
        assert!(err.to_string().starts_with("id-token-expired"));
    }

    #[test]
    fn other_errors_are_unauthenticated() {
        assert_eq!(AuthError::MissingToken.code(), "unauthenticated");
        assert_eq!(AuthError::InvalidSignature.code(), "unauthenticated");
        assert!(!AuthError::MalformedHeader.is_expired());
    }
}
