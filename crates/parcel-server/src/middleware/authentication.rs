//! Authentication middleware for validating bearer tokens.

use axum::Router;
use axum::extract::Request;
use axum::middleware::{Next, from_fn_with_state};
use axum::response::Response;

use crate::extract::AuthToken;
use crate::service::ServiceState;

/// Extension trait for `axum::`[`Router`] to apply authentication middleware.
pub trait RouterAuthExt<S> {
    /// Requires a valid bearer token for every route of the router.
    ///
    /// Only applies to routes that matched, so unknown paths still answer
    /// with 404 rather than 401.
    fn with_authentication(self, state: ServiceState) -> Self;
}

impl<S> RouterAuthExt<S> for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_authentication(self, state: ServiceState) -> Self {
        self.route_layer(from_fn_with_state(state, require_authentication))
    }
}

/// Requires a valid authentication token to proceed with the request.
///
/// Rejections are produced by the [`AuthToken`] extractor; the verified
/// claims stay in the request extensions for the handler.
pub async fn require_authentication(
    AuthToken(_): AuthToken,
    request: Request,
    next: Next,
) -> Response {
    next.run(request).await
}
