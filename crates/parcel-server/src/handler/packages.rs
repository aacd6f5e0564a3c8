//! Uploading and deleting packages. Both routes require a bearer token.

use axum::Router;
use axum::extract::multipart::Field;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::routing::{delete, post};
use bytes::{Bytes, BytesMut};
use parcel_core::package::PackageId;

use crate::TRACING_TARGET_PACKAGES;
use crate::extract::{AuthToken, Json, Multipart, Path};
use crate::handler::response::PackageCreated;
use crate::handler::{Error, ErrorKind, Result};
use crate::middleware::RouterAuthExt;
use crate::service::{PackageService, ServiceState};
use crate::utility::MULTIPART_OVERHEAD;

/// Multipart field holding the zip archive.
const FIELD_FILE: &str = "file";
const FIELD_NAME: &str = "name";
const FIELD_VERSION: &str = "version";

#[tracing::instrument(skip_all)]
async fn create_package(
    State(packages): State<PackageService>,
    AuthToken(claims): AuthToken,
    Multipart(mut multipart): Multipart,
) -> Result<(StatusCode, Json<PackageCreated>)> {
    let max_size = packages.validator().max_size();
    let mut archive = None;
    let mut name = None;
    let mut version = None;

    while let Some(mut field) = multipart.next_field().await? {
        let field_name = field.name().map(str::to_owned);
        match field_name.as_deref() {
            Some(FIELD_FILE) => archive = Some(read_archive(&mut field, max_size).await?),
            Some(FIELD_NAME) => name = Some(field.text().await?),
            Some(FIELD_VERSION) => version = Some(field.text().await?),
            _ => {}
        }
    }

    let archive = archive.ok_or_else(|| missing_field(FIELD_FILE))?;
    let name = name.ok_or_else(|| missing_field(FIELD_NAME))?;
    let version = version.ok_or_else(|| missing_field(FIELD_VERSION))?;
    let package = PackageId::new(name, version)?;

    tracing::info!(
        target: TRACING_TARGET_PACKAGES,
        package = %package,
        subject = %claims.subject,
        size = archive.len(),
        "package upload received"
    );

    let files = packages.create_package(&package, archive).await?;
    Ok((StatusCode::CREATED, Json(PackageCreated::new(&package, files))))
}

/// Buffers the archive field, stopping as soon as it exceeds `max_size`.
async fn read_archive(field: &mut Field<'_>, max_size: u64) -> Result<Bytes> {
    let mut buffer = BytesMut::new();

    while let Some(chunk) = field.chunk().await? {
        if (buffer.len() + chunk.len()) as u64 > max_size {
            return Err(ErrorKind::ValidationFailed
                .with_message(format!("archive exceeds the maximum size of {max_size} bytes"))
                .with_resource("archive"));
        }

        buffer.extend_from_slice(&chunk);
    }

    Ok(buffer.freeze())
}

fn missing_field(field: &'static str) -> Error<'static> {
    ErrorKind::BadRequest
        .with_message(format!("missing multipart field `{field}`"))
        .with_suggestion("Send the fields `file`, `name` and `version` as multipart/form-data")
}

#[tracing::instrument(skip_all)]
async fn delete_package(
    State(packages): State<PackageService>,
    AuthToken(claims): AuthToken,
    Path(package): Path<String>,
) -> Result<StatusCode> {
    let package: PackageId = package.parse()?;
    let files = packages.delete_package(&package).await?;

    tracing::info!(
        target: TRACING_TARGET_PACKAGES,
        package = %package,
        subject = %claims.subject,
        files,
        "package delete handled"
    );

    Ok(StatusCode::NO_CONTENT)
}

/// Returns a [`Router`] with the authenticated package routes.
///
/// The upload route accepts bodies up to the archive limit plus room for
/// the multipart framing and text fields.
pub fn routes(state: &ServiceState) -> Router<ServiceState> {
    let upload_limit = usize::try_from(state.max_archive_size)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        .route(
            "/packages",
            post(create_package).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/packages/{package}", delete(delete_package))
        .with_authentication(state.clone())
}

#[cfg(test)]
mod tests {
    use axum::http::header::AUTHORIZATION;
    use axum::http::{HeaderValue, StatusCode};
    use axum_test::multipart::{MultipartForm, Part};

    use super::*;
    use crate::handler::test::{
        bearer_token, build_zip, create_test_server_with_state, test_state,
    };

    fn upload_form(name: &str, version: &str, archive: Bytes) -> MultipartForm {
        MultipartForm::new()
            .add_text(FIELD_NAME, name.to_owned())
            .add_text(FIELD_VERSION, version.to_owned())
            .add_part(
                FIELD_FILE,
                Part::bytes(archive.to_vec())
                    .file_name("package.zip")
                    .mime_type("application/zip"),
            )
    }

    #[tokio::test]
    async fn test_upload_then_delete() -> anyhow::Result<()> {
        let (state, store) = test_state().await?;
        let token = bearer_token(&state)?;
        let server = create_test_server_with_state(routes(&state), state.clone())?;
        let archive = build_zip(&[("index.js", "export {}"), ("README.md", "# acme")])?;

        let response = server
            .post("/packages")
            .authorization_bearer(&token)
            .multipart(upload_form("acme", "1.0.0", archive))
            .await;
        response.assert_status(StatusCode::CREATED);

        let created = response.json::<PackageCreated>();
        assert_eq!(created.name, "acme");
        assert_eq!(created.version, "1.0.0");
        assert_eq!(created.files, 2);
        assert_eq!(store.len().await, 2);

        let response = server
            .delete("/packages/acme@1.0.0")
            .authorization_bearer(&token)
            .await;
        response.assert_status(StatusCode::NO_CONTENT);
        assert!(store.is_empty().await);

        // Deleting again is still a success.
        let response = server
            .delete("/packages/acme@1.0.0")
            .authorization_bearer(&token)
            .await;
        response.assert_status(StatusCode::NO_CONTENT);
        Ok(())
    }

    #[tokio::test]
    async fn test_reject_missing_or_garbage_token() -> anyhow::Result<()> {
        let (state, store) = test_state().await?;
        let server = create_test_server_with_state(routes(&state), state.clone())?;
        let calls = store.operation_count();
        let archive = build_zip(&[("index.js", "export {}")])?;

        let response = server
            .post("/packages")
            .multipart(upload_form("acme", "1.0.0", archive.clone()))
            .expect_failure()
            .await;
        response.assert_status_unauthorized();
        assert_eq!(response.json::<serde_json::Value>()["name"], "missing_auth_token");

        let response = server
            .post("/packages")
            .add_header(AUTHORIZATION, HeaderValue::from_static("Bearer not-a-jwt"))
            .multipart(upload_form("acme", "1.0.0", archive))
            .expect_failure()
            .await;
        response.assert_status_unauthorized();

        let response = server
            .delete("/packages/acme@1.0.0")
            .add_header(AUTHORIZATION, HeaderValue::from_static("just-a-token"))
            .expect_failure()
            .await;
        response.assert_status_unauthorized();

        assert_eq!(store.operation_count(), calls);
        Ok(())
    }

    #[tokio::test]
    async fn test_reject_invalid_archive() -> anyhow::Result<()> {
        let (state, store) = test_state().await?;
        let token = bearer_token(&state)?;
        let server = create_test_server_with_state(routes(&state), state.clone())?;
        let calls = store.operation_count();

        let response = server
            .post("/packages")
            .authorization_bearer(&token)
            .multipart(upload_form(
                "acme",
                "1.0.0",
                Bytes::from_static(b"definitely not a zip archive"),
            ))
            .expect_failure()
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(response.json::<serde_json::Value>()["name"], "validation_failed");

        assert_eq!(store.operation_count(), calls);
        Ok(())
    }

    #[tokio::test]
    async fn test_reject_incomplete_form() -> anyhow::Result<()> {
        let (state, store) = test_state().await?;
        let token = bearer_token(&state)?;
        let server = create_test_server_with_state(routes(&state), state.clone())?;
        let calls = store.operation_count();

        let form = MultipartForm::new().add_text(FIELD_NAME, "acme");
        let response = server
            .post("/packages")
            .authorization_bearer(&token)
            .multipart(form)
            .expect_failure()
            .await;
        response.assert_status_bad_request();

        let response = server
            .delete("/packages/acme")
            .authorization_bearer(&token)
            .expect_failure()
            .await;
        response.assert_status_bad_request();

        assert_eq!(store.operation_count(), calls);
        Ok(())
    }
}
