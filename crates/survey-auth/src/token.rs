//! Identity tokens
//!
//! Wire format: `v1.<payload>.<signature>`, both parts base64url without
//! padding. The payload is JSON [`IdentityClaims`]; the signature is Ed25519
//! over the encoded payload part.

use crate::error::AuthError;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};

pub const TOKEN_VERSION: &str = "v1";
const MAX_TOKEN_LEN: usize = 4096;

/// Seconds since the Unix epoch
#[must_use]
pub fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Claims carried by an identity token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// Subject (user identifier)
    pub sub: String,
    /// Issuer name
    pub iss: String,
    /// Issued-at, Unix seconds
    pub iat: u64,
    /// Expiry, Unix seconds
    pub exp: u64,
}

impl IdentityClaims {
    /// Claims issued now, valid for `ttl_secs`
    #[must_use]
    pub fn new(sub: impl Into<String>, iss: impl Into<String>, ttl_secs: u64) -> Self {
        let iat = unix_now();
        Self {
            sub: sub.into(),
            iss: iss.into(),
            iat,
            exp: iat.saturating_add(ttl_secs),
        }
    }

    /// Whether the claims are expired at `now`, allowing `leeway_secs` of skew
    #[inline]
    #[must_use]
    pub fn is_expired_at(&self, now: u64, leeway_secs: u64) -> bool {
        now > self.exp.saturating_add(leeway_secs)
    }
}

/// Decoded, not yet verified, identity token
#[derive(Debug, Clone)]
pub struct IdentityToken {
    claims: IdentityClaims,
    payload_part: String,
    signature: Signature,
}

impl IdentityToken {
    /// Sign `claims` with `signing_key`
    ///
    /// # Errors
    /// `AuthError::MalformedToken` if the claims cannot be serialized.
    pub fn sign(claims: IdentityClaims, signing_key: &SigningKey) -> Result<Self, AuthError> {
        let payload = serde_json::to_vec(&claims)
            .map_err(|e| AuthError::MalformedToken(e.to_string()))?;
        let payload_part = URL_SAFE_NO_PAD.encode(payload);
        let signature = signing_key.sign(payload_part.as_bytes());

        Ok(Self {
            claims,
            payload_part,
            signature,
        })
    }

    /// Parse the wire form without checking the signature
    ///
    /// # Errors
    /// `AuthError::MalformedToken` or `AuthError::UnsupportedVersion`.
    pub fn decode(token: &str) -> Result<Self, AuthError> {
        if token.len() > MAX_TOKEN_LEN {
            return Err(AuthError::MalformedToken("token exceeds max length".to_string()));
        }

        let parts: Vec<&str> = token.split('.').collect();
        let (payload_part, sig_part) = match parts.as_slice() {
            [version, payload, sig] if *version == TOKEN_VERSION => (*payload, *sig),
            [version, _, _] => return Err(AuthError::UnsupportedVersion((*version).to_string())),
            _ => return Err(AuthError::MalformedToken("expected three parts".to_string())),
        };

        let sig_bytes = URL_SAFE_NO_PAD
            .decode(sig_part)
            .map_err(|e| AuthError::MalformedToken(e.to_string()))?;
        let signature = Signature::from_slice(&sig_bytes)
            .map_err(|e| AuthError::MalformedToken(e.to_string()))?;

        let payload = URL_SAFE_NO_PAD
            .decode(payload_part)
            .map_err(|e| AuthError::MalformedToken(e.to_string()))?;
        let claims: IdentityClaims = serde_json::from_slice(&payload)
            .map_err(|e| AuthError::MalformedToken(e.to_string()))?;

        Ok(Self {
            claims,
            payload_part: payload_part.to_string(),
            signature,
        })
    }

    /// Wire form of this token
    #[must_use]
    pub fn encode(&self) -> String {
        format!(
            "{}.{}.{}",
            TOKEN_VERSION,
            self.payload_part,
            URL_SAFE_NO_PAD.encode(self.signature.to_bytes())
        )
    }

    /// Check the signature against `verifying_key`
    #[must_use]
    pub fn verify(&self, verifying_key: &VerifyingKey) -> bool {
        verifying_key
            .verify(self.payload_part.as_bytes(), &self.signature)
            .is_ok()
    }

    #[inline]
    #[must_use]
    pub fn claims(&self) -> &IdentityClaims {
        &self.claims
    }
}
