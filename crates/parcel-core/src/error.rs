//! Domain error types shared by the registry crates.
//!
//! A missing object is not represented here: reads that find nothing return
//! `Ok(None)` and callers decide how to surface it.

use std::borrow::Cow;
use std::error::Error as StdError;

use strum::{AsRefStr, IntoStaticStr};

/// Type alias for boxed errors that are Send + Sync.
pub type BoxedError = Box<dyn StdError + Send + Sync>;

/// Result type alias for registry operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Categories of errors produced by the registry core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed package identity, invalid file path or absent upload.
    BadRequest,
    /// The uploaded archive failed structural or size checks.
    ValidationFailed,
    /// Transport or authorization failure talking to the backing store.
    StorageUnavailable,
    /// Token missing, malformed, unsigned or expired.
    Unauthorized,
    /// Unexpected failure inside the service.
    Internal,
}

impl ErrorKind {
    /// Returns the error kind as a string for categorization.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Registry error with a kind, a message and an optional source.
#[derive(Debug, thiserror::Error)]
#[error("{}: {message}", .kind.as_str())]
pub struct Error {
    kind: ErrorKind,
    message: Cow<'static, str>,
    #[source]
    source: Option<BoxedError>,
}

impl Error {
    /// Creates a new [`Error`].
    #[inline]
    pub fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Attaches a source error to this error.
    #[inline]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error kind.
    #[must_use]
    #[inline]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error message.
    #[must_use]
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Creates a new bad request error.
    #[inline]
    pub fn bad_request(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::BadRequest, message)
    }

    /// Creates a new archive validation error.
    #[inline]
    pub fn validation(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::ValidationFailed, message)
    }

    /// Creates a new storage error for the given operation.
    #[inline]
    pub fn storage(
        operation: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        let message = format!("{}: {}", operation.into(), message.into());
        Self::new(ErrorKind::StorageUnavailable, message)
    }

    /// Creates a new unauthorized error.
    #[inline]
    pub fn unauthorized(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    /// Creates a new internal error.
    #[inline]
    pub fn internal(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}
