//! Bearer token extraction and verification.
//!
//! The `Authorization` header must hold exactly two space-separated
//! segments; the second one is the token and the first one is ignored.
//!
//! ```rust,ignore
//! async fn handler(AuthToken(claims): AuthToken) -> Result<impl IntoResponse> {
//!     tracing::info!(subject = %claims.subject, "authenticated");
//!     // ...
//! }
//! ```

use axum::extract::{FromRef, FromRequestParts};
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use derive_more::{Deref, From};
use jsonwebtoken::errors::{Error as JwtError, ErrorKind as JwtErrorKind};

use crate::TRACING_TARGET_AUTHENTICATION;
use crate::handler::{Error, ErrorKind, Result};
use crate::service::{TokenAuthority, TokenClaims};

/// Claims of a verified bearer token.
///
/// Verification is cached in the request extensions, so extracting this
/// more than once per request (middleware and handler) decodes the token
/// only once.
#[must_use]
#[derive(Debug, Clone, Deref, From)]
pub struct AuthToken(pub TokenClaims);

impl<S> FromRequestParts<S> for AuthToken
where
    S: Sync + Send,
    TokenAuthority: FromRef<S>,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(auth_token) = parts.extensions.get::<Self>() {
            return Ok(auth_token.clone());
        }

        let token = bearer_token(&parts.headers)?;
        let authority = TokenAuthority::from_ref(state);

        let claims = authority.decode(token).map_err(|error| {
            tracing::warn!(
                target: TRACING_TARGET_AUTHENTICATION,
                error = %error,
                "rejected bearer token"
            );
            Error::from(error)
        })?;

        tracing::debug!(
            target: TRACING_TARGET_AUTHENTICATION,
            subject = %claims.subject,
            "bearer token accepted"
        );

        let auth_token = Self(claims);
        parts.extensions.insert(auth_token.clone());
        Ok(auth_token)
    }
}

/// Returns the second segment of `Authorization: <scheme> <token>`.
fn bearer_token(headers: &HeaderMap) -> Result<&str> {
    let missing = || {
        ErrorKind::MissingAuthToken
            .with_message("Authentication required")
            .with_resource("authentication")
            .with_suggestion("Send the header Authorization: Bearer <token>")
    };

    let value = headers.get(AUTHORIZATION).ok_or_else(missing)?;
    let value = value.to_str().map_err(|_| {
        ErrorKind::MalformedAuthToken
            .with_message("Authorization header is not valid ASCII")
            .with_resource("authentication")
    })?;

    match value.split(' ').collect::<Vec<_>>().as_slice() {
        [_, token] => Ok(*token),
        _ => Err(missing()),
    }
}

impl From<JwtError> for Error<'static> {
    fn from(error: JwtError) -> Self {
        let error = match error.kind() {
            JwtErrorKind::ExpiredSignature => {
                ErrorKind::TokenExpired.with_message("Token has expired")
            }
            JwtErrorKind::InvalidSignature => {
                ErrorKind::Unauthorized.with_message("Token signature is invalid")
            }
            JwtErrorKind::MissingRequiredClaim(claim) => ErrorKind::Unauthorized
                .with_message("Token is missing a required claim")
                .with_context(format!("missing claim: {claim}")),
            JwtErrorKind::InvalidToken
            | JwtErrorKind::Base64(_)
            | JwtErrorKind::Json(_)
            | JwtErrorKind::Utf8(_) => {
                ErrorKind::MalformedAuthToken.with_message("Token is not a valid JWT")
            }
            JwtErrorKind::InvalidAlgorithm | JwtErrorKind::InvalidAlgorithmName => {
                ErrorKind::Unauthorized.with_message("Token algorithm is not accepted")
            }
            other => ErrorKind::Unauthorized
                .with_message("Token was rejected")
                .with_context(format!("{other:?}")),
        };

        error.with_resource("authentication")
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_take_second_segment() -> anyhow::Result<()> {
        assert_eq!(bearer_token(&headers("Bearer abc.def.ghi"))?, "abc.def.ghi");
        assert_eq!(bearer_token(&headers("Token abc"))?, "abc");
        Ok(())
    }

    #[test]
    fn test_reject_other_shapes() {
        for value in ["abc", "Bearer a b", "Bearer  abc"] {
            let error = bearer_token(&headers(value)).unwrap_err();
            assert_eq!(error.kind(), ErrorKind::MissingAuthToken);
        }

        let error = bearer_token(&HeaderMap::new()).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::MissingAuthToken);
    }

    #[test]
    fn test_map_jwt_errors() {
        let expired: Error<'static> = JwtError::from(JwtErrorKind::ExpiredSignature).into();
        assert_eq!(expired.kind(), ErrorKind::TokenExpired);

        let forged: Error<'static> = JwtError::from(JwtErrorKind::InvalidSignature).into();
        assert_eq!(forged.kind(), ErrorKind::Unauthorized);

        let garbage: Error<'static> = JwtError::from(JwtErrorKind::InvalidToken).into();
        assert_eq!(garbage.kind(), ErrorKind::MalformedAuthToken);
    }
}
