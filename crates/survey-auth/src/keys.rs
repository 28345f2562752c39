//! Key material helpers
//!
//! Keys travel through configuration as lowercase hex.

use crate::error::AuthError;
use ed25519_dalek::{SigningKey, VerifyingKey, PUBLIC_KEY_LENGTH, SECRET_KEY_LENGTH};
use rand::rngs::OsRng;

/// Generate a fresh signing key from the OS RNG
#[must_use]
pub fn generate_signing_key() -> SigningKey {
    let mut csprng = OsRng;
    SigningKey::generate(&mut csprng)
}

#[must_use]
pub fn signing_key_to_hex(key: &SigningKey) -> String {
    hex::encode(key.to_bytes())
}

#[must_use]
pub fn verifying_key_to_hex(key: &VerifyingKey) -> String {
    hex::encode(key.to_bytes())
}

/// Parse a hex-encoded signing key
///
/// # Errors
/// `AuthError::InvalidKey` on bad hex or wrong length.
pub fn signing_key_from_hex(encoded: &str) -> Result<SigningKey, AuthError> {
    let bytes: [u8; SECRET_KEY_LENGTH] = decode_fixed(encoded)?;
    Ok(SigningKey::from_bytes(&bytes))
}

/// Parse a hex-encoded verifying (public) key
///
/// # Errors
/// `AuthError::InvalidKey` on bad hex, wrong length, or a point that is not
/// a valid Ed25519 key.
pub fn verifying_key_from_hex(encoded: &str) -> Result<VerifyingKey, AuthError> {
    let bytes: [u8; PUBLIC_KEY_LENGTH] = decode_fixed(encoded)?;
    VerifyingKey::from_bytes(&bytes).map_err(|e| AuthError::InvalidKey(e.to_string()))
}

fn decode_fixed<const N: usize>(encoded: &str) -> Result<[u8; N], AuthError> {
    let bytes = hex::decode(encoded.trim()).map_err(|e| AuthError::InvalidKey(e.to_string()))?;
    let len = bytes.len();
    bytes
        .try_into()
        .map_err(|_| AuthError::InvalidKey(format!("expected {N} bytes, got {len}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trip_preserves_keys() {
        let key = generate_signing_key();

        let restored = signing_key_from_hex(&signing_key_to_hex(&key)).unwrap();
        assert_eq!(restored.to_bytes(), key.to_bytes());

        let public = verifying_key_from_hex(&verifying_key_to_hex(&key.verifying_key())).unwrap();
        assert_eq!(public, key.verifying_key());
    }

    #[test]
    fn rejects_bad_hex_and_length() {
        assert!(matches!(
            verifying_key_from_hex("zz"),
            Err(AuthError::InvalidKey(_))
        ));
        assert!(matches!(
            signing_key_from_hex("abcd"),
            Err(AuthError::InvalidKey(msg)) if msg.contains("expected 32 bytes")
        ));
    }
}
