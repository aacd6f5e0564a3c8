//! Public, read-only access to package files.

use axum::Router;
use axum::body::Body;
use axum::extract::State;
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE, LOCATION};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use parcel_core::package::PackageId;

use crate::TRACING_TARGET_PACKAGES;
use crate::extract::{Json, Path};
use crate::handler::response::PackageFiles;
use crate::handler::{ErrorKind, Result};
use crate::service::{PackageService, ServiceState};

/// Sent when the stored media type is not a valid header value.
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

async fn redirect_root() -> impl IntoResponse {
    (StatusCode::FOUND, [(LOCATION, "/")])
}

#[tracing::instrument(skip_all)]
async fn list_files(
    State(packages): State<PackageService>,
    Path(package): Path<String>,
) -> Result<Json<PackageFiles>> {
    let package: PackageId = package.parse()?;
    let files = packages.get_files(&package).await?;

    if files.is_empty() {
        return Err(ErrorKind::NotFound
            .with_message("Package not found")
            .with_resource("package")
            .with_context(package.to_string()));
    }

    tracing::debug!(
        target: TRACING_TARGET_PACKAGES,
        package = %package,
        files = files.len(),
        "package files listed"
    );

    Ok(Json(PackageFiles::new(&package, files)))
}

#[tracing::instrument(skip_all)]
async fn read_file(
    State(packages): State<PackageService>,
    Path((package, file)): Path<(String, String)>,
) -> Result<Response> {
    let package: PackageId = package.parse()?;
    let Some(object) = packages.get_file(&package, &file).await? else {
        return Err(ErrorKind::NotFound
            .with_message("File not found")
            .with_resource("file")
            .with_context(format!("{package}/{file}")));
    };

    let content_type = HeaderValue::from_str(&object.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static(FALLBACK_CONTENT_TYPE));
    let headers = [
        (CONTENT_TYPE, content_type),
        (CONTENT_LENGTH, HeaderValue::from(object.size)),
    ];

    Ok((headers, Body::from_stream(object.body)).into_response())
}

/// Returns a [`Router`] with the public file routes.
///
/// The listing answers on both `/cdn/{package}` and `/cdn/{package}/`
/// because the wildcard never matches an empty remainder.
pub fn routes() -> Router<ServiceState> {
    Router::new()
        .route("/cdn", get(redirect_root))
        .route("/cdn/{package}", get(list_files))
        .route("/cdn/{package}/", get(list_files))
        .route("/cdn/{package}/{*file}", get(read_file))
}
