//! Token Issuer
//!
//! Mints identity tokens for development and tests. Production deployments
//! receive tokens from the external identity provider; the server only ever
//! needs the matching public key.

use crate::error::AuthError;
use crate::token::{IdentityClaims, IdentityToken};
use ed25519_dalek::{SigningKey, VerifyingKey};

/// Issuer name used when none is configured
pub const DEFAULT_ISSUER: &str = "survey-identity";

/// Token issuer holding the signing key
pub struct TokenIssuer {
    signing_key: SigningKey,
    issuer: String,
    default_ttl_secs: u64,
}

impl TokenIssuer {
    /// Create a new token issuer
    #[must_use]
    pub fn new(signing_key: SigningKey) -> Self {
        Self {
            signing_key,
            issuer: DEFAULT_ISSUER.to_string(),
            default_ttl_secs: 3600, // 1 hour
        }
    }

    /// With issuer name
    #[must_use]
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// With default time-to-live
    #[must_use]
    pub fn with_ttl(mut self, ttl_secs: u64) -> Self {
        self.default_ttl_secs = ttl_secs;
        self
    }

    #[inline]
    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Public half of the signing key
    #[must_use]
    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// Issue a token for `subject` with the default lifetime
    ///
    /// # Errors
    /// `AuthError::MalformedToken` if the claims cannot be encoded.
    pub fn issue(&self, subject: &str) -> Result<String, AuthError> {
        self.issue_with_ttl(subject, self.default_ttl_secs)
    }

    /// Issue a token for `subject` valid for `ttl_secs`
    ///
    /// # Errors
    /// `AuthError::MalformedToken` if the claims cannot be encoded.
    pub fn issue_with_ttl(&self, subject: &str, ttl_secs: u64) -> Result<String, AuthError> {
        let claims = IdentityClaims::new(subject, self.issuer.clone(), ttl_secs);
        let token = self.sign_claims(claims)?;
        tracing::debug!(subject, ttl_secs, "identity token issued");
        Ok(token)
    }

    /// Sign arbitrary claims; used to mint already-expired tokens in tests
    ///
    /// # Errors
    /// `AuthError::MalformedToken` if the claims cannot be encoded.
    pub fn sign_claims(&self, claims: IdentityClaims) -> Result<String, AuthError> {
        IdentityToken::sign(claims, &self.signing_key).map(|token| token.encode())
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("issuer", &self.issuer)
            .field("default_ttl_secs", &self.default_ttl_secs)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::generate_signing_key;

    #[test]
    fn issued_token_carries_subject_and_issuer() {
        let issuer = TokenIssuer::new(generate_signing_key()).with_issuer("tests");
        let encoded = issuer.issue("alice").unwrap();

        let token = IdentityToken::decode(&encoded).unwrap();
        assert!(token.verify(&issuer.verifying_key()));
        assert_eq!(token.claims().sub, "alice");
        assert_eq!(token.claims().iss, "tests");
        assert_eq!(token.claims().exp - token.claims().iat, 3600);
    }

    #[test]
    fn custom_ttl_is_applied() {
        let issuer = TokenIssuer::new(generate_signing_key()).with_ttl(90);
        let token = IdentityToken::decode(&issuer.issue("bob").unwrap()).unwrap();
        assert_eq!(token.claims().exp - token.claims().iat, 90);
    }

    #[test]
    fn debug_hides_signing_key() {
        let issuer = TokenIssuer::new(generate_signing_key());
        let rendered = format!("{issuer:?}");
        assert!(rendered.contains("survey-identity"));
        assert!(!rendered.contains("signing_key"));
    }
}
