//! Token sources

use crate::error::ClientError;
use async_trait::async_trait;

/// Supplies bearer tokens to the client
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Current token; `force_refresh` asks the provider to re-authenticate
    /// rather than return a cached token.
    ///
    /// # Errors
    /// `ClientError::Token` when no token can be obtained.
    async fn token(&self, force_refresh: bool) -> Result<String, ClientError>;
}

/// Fixed token, never refreshed
#[derive(Debug, Clone)]
pub struct StaticToken(String);

impl StaticToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn token(&self, _force_refresh: bool) -> Result<String, ClientError> {
        Ok(self.0.clone())
    }
}
