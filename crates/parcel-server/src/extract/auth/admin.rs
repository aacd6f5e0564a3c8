//! HTTP Basic credentials of the registry administrator.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Basic;
use axum_extra::typed_header::TypedHeaderRejectionReason;

use crate::TRACING_TARGET_AUTHENTICATION;
use crate::handler::{Error, ErrorKind};
use crate::service::AdminAccount;

/// Proof that the request carried the admin user and password.
#[must_use]
#[derive(Debug, Clone)]
pub struct AdminCredentials {
    pub user: String,
}

impl<S> FromRequestParts<S> for AdminCredentials
where
    S: Sync + Send,
    AdminAccount: FromRef<S>,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        type BasicHeader = TypedHeader<Authorization<Basic>>;

        let TypedHeader(Authorization(basic)) = BasicHeader::from_request_parts(parts, state)
            .await
            .map_err(|rejection| match rejection.reason() {
                TypedHeaderRejectionReason::Missing => ErrorKind::MissingAuthToken
                    .with_message("Admin credentials required")
                    .with_resource("authentication")
                    .with_suggestion("Use HTTP Basic authentication with the admin user"),
                _ => ErrorKind::MalformedAuthToken
                    .with_message("Authorization header must use the Basic scheme")
                    .with_resource("authentication"),
            })?;

        let account = AdminAccount::from_ref(state);
        if !account.matches(basic.username(), basic.password()) {
            tracing::warn!(
                target: TRACING_TARGET_AUTHENTICATION,
                user = basic.username(),
                "rejected admin credentials"
            );

            return Err(ErrorKind::Unauthorized
                .with_message("Invalid admin credentials")
                .with_resource("authentication"));
        }

        Ok(Self {
            user: basic.username().to_owned(),
        })
    }
}
