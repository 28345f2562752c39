//! `Authorization` header parsing

use crate::error::AuthError;

const BEARER_PREFIX: &str = "Bearer ";

/// Extract the token from an `Authorization: Bearer <token>` header value
///
/// # Errors
/// `AuthError::MissingToken` when the header is absent,
/// `AuthError::MalformedHeader` when it is not a non-empty bearer credential.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let value = header.ok_or(AuthError::MissingToken)?;
    let token = value
        .strip_prefix(BEARER_PREFIX)
        .ok_or(AuthError::MalformedHeader)?
        .trim();

    if token.is_empty() {
        return Err(AuthError::MalformedHeader);
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_token() {
        assert_eq!(bearer_token(Some("Bearer abc.def")), Ok("abc.def"));
    }

    #[test]
    fn rejects_missing_and_malformed() {
        assert_eq!(bearer_token(None), Err(AuthError::MissingToken));
        assert_eq!(bearer_token(Some("Basic dXNlcg==")), Err(AuthError::MalformedHeader));
        assert_eq!(bearer_token(Some("Bearer   ")), Err(AuthError::MalformedHeader));
        assert_eq!(bearer_token(Some("abc")), Err(AuthError::MalformedHeader));
    }
}
