//! Issuing bearer tokens to clients.

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;

use crate::TRACING_TARGET_TOKENS;
use crate::extract::{AdminCredentials, Json};
use crate::handler::Result;
use crate::handler::request::CreateToken;
use crate::handler::response::TokenCreated;
use crate::service::{ServiceState, TokenAuthority};

#[tracing::instrument(skip_all)]
async fn create_token(
    State(tokens): State<TokenAuthority>,
    admin: AdminCredentials,
    Json(request): Json<CreateToken>,
) -> Result<(StatusCode, Json<TokenCreated>)> {
    let issued = tokens.issue(&request.name, request.expiration_date)?;

    tracing::debug!(
        target: TRACING_TARGET_TOKENS,
        admin = %admin.user,
        subject = %request.name,
        "token request authorized"
    );

    Ok((StatusCode::CREATED, Json(issued.into())))
}

/// Returns a [`Router`] with the token route, guarded by admin credentials.
pub fn routes() -> Router<ServiceState> {
    Router::new().route("/tokens", post(create_token))
}
