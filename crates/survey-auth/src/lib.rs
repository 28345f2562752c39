//! Survey Auth - signed identity tokens
//!
//! Provides:
//! - Identity claims and the `v1.<payload>.<signature>` token format
//! - A token issuer for development and tests
//! - The `IdentityVerifier` seam used by the HTTP gate
//! - Bearer header parsing and hex key helpers
//!
//! # Example
//!
//! ```rust
//! use survey_auth::{generate_signing_key, SignedTokenVerifier, TokenIssuer};
//!
//! let issuer = TokenIssuer::new(generate_signing_key());
//! let verifier = SignedTokenVerifier::new(issuer.verifying_key());
//!
//! let token = issuer.issue("alice").unwrap();
//! let user = verifier.verify_at(&token, survey_auth::unix_now()).unwrap();
//! assert_eq!(user.as_str(), "alice");
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod bearer;
pub mod error;
pub mod issuer;
pub mod keys;
pub mod token;
pub mod verifier;

pub use bearer::bearer_token;
pub use error::{AuthError, EXPIRED_TOKEN_CODE, UNAUTHENTICATED_CODE};
pub use issuer::{TokenIssuer, DEFAULT_ISSUER};
pub use keys::{
    generate_signing_key, signing_key_from_hex, signing_key_to_hex, verifying_key_from_hex,
    verifying_key_to_hex,
};
pub use token::{unix_now, IdentityClaims, IdentityToken, TOKEN_VERSION};
pub use verifier::{IdentityVerifier, SignedTokenVerifier, DEFAULT_LEEWAY_SECS};

#[cfg(any(test, feature = "mocks"))]
pub use verifier::MockIdentityVerifier;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
