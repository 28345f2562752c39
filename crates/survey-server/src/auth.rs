//! Authorization gate
//!
//! Handlers that take an [`AuthenticatedUser`] only run once the bearer
//! token has been exchanged for a verified subject. Extraction happens
//! before the handler body, so a rejected request never reaches a store.

use crate::error::AppError;
use crate::state::AppState;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use survey_auth::{bearer_token, AuthError};
use survey_core::UserId;

/// Verified caller identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(pub UserId);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = match parts.headers.get(AUTHORIZATION) {
            Some(value) => Some(value.to_str().map_err(|_| AuthError::MalformedHeader)?),
            None => None,
        };
        let token = bearer_token(header)?;

        let user = state.verifier.verify(token).await?;
        tracing::debug!(user = %user, path = %parts.uri.path(), "request authenticated");
        Ok(Self(user))
    }
}
