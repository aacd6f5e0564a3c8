//! Conversion from registry errors into HTTP errors.

use parcel_core::{Error as CoreError, ErrorKind as CoreErrorKind};

use crate::handler::{Error, ErrorKind};

impl From<CoreError> for Error<'static> {
    fn from(error: CoreError) -> Self {
        match error.kind() {
            CoreErrorKind::BadRequest => ErrorKind::BadRequest
                .with_message(error.message().to_owned())
                .with_context(error.to_string()),
            CoreErrorKind::ValidationFailed => ErrorKind::ValidationFailed
                .with_message(error.message().to_owned())
                .with_resource("archive"),
            CoreErrorKind::Unauthorized => ErrorKind::Unauthorized
                .with_message(error.message().to_owned())
                .with_resource("authentication"),
            // Storage details stay in the logs.
            CoreErrorKind::StorageUnavailable => ErrorKind::StorageUnavailable
                .with_context(error_chain(&error))
                .with_resource("storage"),
            CoreErrorKind::Internal => {
                ErrorKind::InternalServerError.with_context(error_chain(&error))
            }
        }
    }
}

/// Renders an error and all of its sources on one line.
fn error_chain(error: &CoreError) -> String {
    let mut rendered = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    use super::*;

    #[test]
    fn test_map_kinds_to_statuses() {
        let cases = [
            (CoreError::bad_request("bad"), StatusCode::BAD_REQUEST),
            (CoreError::validation("invalid"), StatusCode::UNPROCESSABLE_ENTITY),
            (CoreError::unauthorized("denied"), StatusCode::UNAUTHORIZED),
            (
                CoreError::storage("get_object", "refused"),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (CoreError::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, status) in cases {
            let error: Error<'static> = error.into();
            assert_eq!(error.kind().status_code(), status);
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[test]
    fn test_keep_client_messages() {
        let error: Error<'static> = CoreError::bad_request("Invalid URL").into();
        assert_eq!(error.message(), Some("Invalid URL"));
    }

    #[test]
    fn test_hide_storage_details() {
        let source = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let error: Error<'static> = CoreError::storage("put_object", "minio down")
            .with_source(source)
            .into();

        assert_eq!(error.message(), None);
        assert!(error.context().is_some_and(|c| c.contains("refused")));
    }
}
