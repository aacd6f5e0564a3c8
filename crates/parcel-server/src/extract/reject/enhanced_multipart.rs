//! Multipart extractor with JSON rejections.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{FromRequest, Multipart as AxumMultipart, Request};
use axum::http::StatusCode;
use derive_more::{Deref, DerefMut, From};

use super::sanitize_error_message;
use crate::handler::{Error, ErrorKind};

/// Enhanced multipart extractor.
#[must_use]
#[derive(Debug, Deref, DerefMut, From)]
pub struct Multipart(pub AxumMultipart);

impl<S> FromRequest<S> for Multipart
where
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        AxumMultipart::from_request(req, state)
            .await
            .map(Multipart)
            .map_err(Into::into)
    }
}

impl From<MultipartRejection> for Error<'static> {
    fn from(rejection: MultipartRejection) -> Self {
        match rejection {
            MultipartRejection::InvalidBoundary(_) => ErrorKind::BadRequest
                .with_message("Invalid multipart boundary")
                .with_suggestion("Send the upload as multipart/form-data"),
            other => ErrorKind::BadRequest
                .with_message("Invalid multipart request")
                .with_context(sanitize_error_message(&other.body_text())),
        }
    }
}

impl From<MultipartError> for Error<'static> {
    fn from(error: MultipartError) -> Self {
        if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return ErrorKind::ValidationFailed
                .with_message("archive exceeds the upload size limit")
                .with_resource("archive");
        }

        ErrorKind::BadRequest
            .with_message("Failed to read multipart field")
            .with_context(sanitize_error_message(&error.body_text()))
    }
}
