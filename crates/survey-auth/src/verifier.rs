//! Identity verification
//!
//! The server exchanges a bearer token for a verified [`UserId`] through the
//! [`IdentityVerifier`] seam. [`SignedTokenVerifier`] checks tokens minted by
//! a [`TokenIssuer`](crate::issuer::TokenIssuer) or any provider signing the
//! same format.

use crate::error::AuthError;
use crate::issuer::DEFAULT_ISSUER;
use crate::keys::verifying_key_from_hex;
use crate::token::{unix_now, IdentityToken};
use async_trait::async_trait;
use ed25519_dalek::VerifyingKey;
use survey_core::UserId;

/// Default clock skew tolerated on expiry
pub const DEFAULT_LEEWAY_SECS: u64 = 30;

/// Exchanges a bearer token for a verified subject
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Verify `token` and return its subject
    ///
    /// # Errors
    /// [`AuthError`] describing why the token was rejected.
    async fn verify(&self, token: &str) -> Result<UserId, AuthError>;
}

/// Verifies Ed25519-signed identity tokens
#[derive(Debug, Clone)]
pub struct SignedTokenVerifier {
    verifying_key: VerifyingKey,
    expected_issuer: String,
    leeway_secs: u64,
}

impl SignedTokenVerifier {
    #[must_use]
    pub fn new(verifying_key: VerifyingKey) -> Self {
        Self {
            verifying_key,
            expected_issuer: DEFAULT_ISSUER.to_string(),
            leeway_secs: DEFAULT_LEEWAY_SECS,
        }
    }

    /// Build from a hex-encoded public key
    ///
    /// # Errors
    /// `AuthError::InvalidKey` if the key does not parse.
    pub fn from_hex(public_key: &str) -> Result<Self, AuthError> {
        verifying_key_from_hex(public_key).map(Self::new)
    }

    #[must_use]
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.expected_issuer = issuer.into();
        self
    }

    #[must_use]
    pub fn with_leeway(mut self, leeway_secs: u64) -> Self {
        self.leeway_secs = leeway_secs;
        self
    }

    /// Verify `token` as of `now` (Unix seconds)
    ///
    /// Checks run in order: format, signature, expiry, issuer, subject.
    ///
    /// # Errors
    /// The first failing check.
    pub fn verify_at(&self, token: &str, now: u64) -> Result<UserId, AuthError> {
        let token = IdentityToken::decode(token)?;

        if !token.verify(&self.verifying_key) {
            return Err(AuthError::InvalidSignature);
        }

        let claims = token.claims();
        if claims.is_expired_at(now, self.leeway_secs) {
            return Err(AuthError::Expired {
                expired_at: claims.exp,
            });
        }

        if claims.iss != self.expected_issuer {
            return Err(AuthError::IssuerMismatch(claims.iss.clone()));
        }

        if claims.sub.trim().is_empty() {
            return Err(AuthError::MissingSubject);
        }

        Ok(UserId::new(claims.sub.clone()))
    }
}

#[async_trait]
impl IdentityVerifier for SignedTokenVerifier {
    async fn verify(&self, token: &str) -> Result<UserId, AuthError> {
        let result = self.verify_at(token, unix_now());
        if let Err(err) = &result {
            tracing::debug!(error = %err, "identity token rejected");
        }
        result
    }
}
