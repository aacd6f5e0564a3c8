//! Issuing and verifying bearer tokens.

use std::fmt;
use std::sync::Arc;

use jiff::civil::Date;
use jiff::tz::TimeZone;
use jiff::{SignedDuration, Timestamp};
use jsonwebtoken::errors::{Error as JwtError, ErrorKind as JwtErrorKind};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use parcel_core::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_TOKENS;

/// Claims carried by every token.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Token identifier; the subject name doubles as the id.
    #[serde(rename = "jti")]
    pub token_id: String,
    /// Who the token was issued to.
    #[serde(rename = "sub")]
    pub subject: String,
    /// Issuance time, in seconds since the epoch.
    #[serde(rename = "iat", with = "jiff::fmt::serde::timestamp::second::required")]
    pub issued_at: Timestamp,
    /// Expiry time, in seconds since the epoch.
    #[serde(rename = "exp", with = "jiff::fmt::serde::timestamp::second::required")]
    pub expires_at: Timestamp,
}

impl TokenClaims {
    /// Returns `true` when the token is not valid at `now`.
    #[inline]
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        self.expires_at <= now
    }
}

/// A freshly signed token and its expiry.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: Timestamp,
}

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

/// HS256 token issuer and verifier sharing one secret.
///
/// Tokens are stateless: verification needs only the secret, and nothing is
/// stored on issuance.
#[derive(Clone)]
pub struct TokenAuthority {
    keys: Arc<Keys>,
}

impl TokenAuthority {
    /// Lifetime of a token issued without an explicit expiration date.
    pub const DEFAULT_LIFETIME: SignedDuration = SignedDuration::from_mins(15);

    /// Creates an authority signing with `secret`.
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let secret = secret.as_ref();
        let keys = Keys {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        };

        Self {
            keys: Arc::new(keys),
        }
    }

    /// Issues a token for `subject`.
    ///
    /// With an `expiration_date` the token expires at midnight UTC of that
    /// day; otherwise it expires after the default lifetime.
    ///
    /// # Errors
    ///
    /// Fails with `BadRequest` when the subject is empty or the expiry is not
    /// strictly in the future.
    #[tracing::instrument(skip(self), target = TRACING_TARGET_TOKENS)]
    pub fn issue(&self, subject: &str, expiration_date: Option<Date>) -> Result<IssuedToken> {
        self.issue_at(Timestamp::now(), subject, expiration_date)
    }

    fn issue_at(
        &self,
        now: Timestamp,
        subject: &str,
        expiration_date: Option<Date>,
    ) -> Result<IssuedToken> {
        let subject = subject.trim();
        if subject.is_empty() {
            return Err(Error::bad_request("token name must not be empty"));
        }

        let expires_at = match expiration_date {
            Some(date) => date
                .to_zoned(TimeZone::UTC)
                .map_err(|e| Error::bad_request("invalid expiration date").with_source(e))?
                .timestamp(),
            None => now
                .checked_add(Self::DEFAULT_LIFETIME)
                .map_err(|e| Error::internal("token expiry overflowed").with_source(e))?,
        };

        if expires_at <= now {
            return Err(Error::bad_request(
                "expiration date must be greater than the current date",
            ));
        }

        let claims = TokenClaims {
            token_id: subject.to_owned(),
            subject: subject.to_owned(),
            issued_at: now,
            expires_at,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.keys.encoding)
            .map_err(|e| Error::internal("token could not be signed").with_source(e))?;

        tracing::info!(
            target: TRACING_TARGET_TOKENS,
            subject,
            expires_at = %expires_at,
            "token issued"
        );

        Ok(IssuedToken { token, expires_at })
    }

    /// Verifies the signature and expiry of `token`.
    ///
    /// # Errors
    ///
    /// Every rejection (malformed, bad signature, missing or past expiry) is
    /// `Unauthorized`.
    pub fn verify(&self, token: &str) -> Result<TokenClaims> {
        self.decode(token).map_err(|error| {
            let message = match error.kind() {
                JwtErrorKind::ExpiredSignature => "token has expired",
                JwtErrorKind::InvalidSignature => "token signature is invalid",
                JwtErrorKind::MissingRequiredClaim(_) => "token is missing a required claim",
                _ => "token is malformed",
            };
            Error::unauthorized(message).with_source(error)
        })
    }

    /// Decodes `token`, keeping the underlying error for the HTTP layer.
    pub(crate) fn decode(&self, token: &str) -> Result<TokenClaims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let claims = decode::<TokenClaims>(token, &self.keys.decoding, &validation)?.claims;

        // The library accepts `exp == now`; the token must expire strictly later.
        if claims.is_expired_at(Timestamp::now()) {
            return Err(JwtErrorKind::ExpiredSignature.into());
        }

        Ok(claims)
    }
}

impl fmt::Debug for TokenAuthority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenAuthority")
            .field("default_lifetime", &Self::DEFAULT_LIFETIME)
            .finish_non_exhaustive()
    }
}
