//! Storage gateway errors.

use parcel_core::{BoxedError, Error};

/// Result type alias for gateway operations.
pub type StorageResult<T, E = StorageError> = std::result::Result<T, E>;

/// Failures reported by an [`ObjectStore`](crate::ObjectStore) backend.
///
/// A missing object is not an error; reads return `Ok(None)` instead.
#[derive(Debug, thiserror::Error)]
#[must_use = "errors should be handled appropriately"]
pub enum StorageError {
    /// The client could not be built from the supplied configuration.
    #[error("error while creating object storage client: {0}")]
    Init(String),

    /// Bucket existence check or creation failed.
    #[error("bucket '{bucket}' is unavailable")]
    Bucket {
        bucket: String,
        #[source]
        source: BoxedError,
    },

    /// Object download failed.
    #[error("failed to read object '{key}'")]
    Read {
        key: String,
        #[source]
        source: BoxedError,
    },

    /// Object upload failed.
    #[error("failed to write object '{key}'")]
    Write {
        key: String,
        #[source]
        source: BoxedError,
    },

    /// Prefix listing failed.
    #[error("failed to list objects under '{prefix}'")]
    List {
        prefix: String,
        #[source]
        source: BoxedError,
    },

    /// A bulk delete batch could not be confirmed.
    #[error("failed to delete {count} object(s)")]
    Delete {
        count: usize,
        #[source]
        source: BoxedError,
    },
}

/// A single object the backend refused to delete while confirming the batch.
#[derive(Debug, Clone, thiserror::Error)]
#[error("object '{key}' was not deleted ({code}: {message})")]
pub struct DeleteRejected {
    pub key: String,
    pub code: String,
    pub message: String,
}

impl StorageError {
    /// Returns the gateway operation that failed.
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Init(_) => "init",
            Self::Bucket { .. } => "ensure_bucket",
            Self::Read { .. } => "get_object",
            Self::Write { .. } => "put_object",
            Self::List { .. } => "list_objects",
            Self::Delete { .. } => "delete_objects",
        }
    }

    pub(crate) fn bucket(bucket: &str, source: impl Into<BoxedError>) -> Self {
        Self::Bucket {
            bucket: bucket.to_owned(),
            source: source.into(),
        }
    }

    pub(crate) fn read(key: &str, source: impl Into<BoxedError>) -> Self {
        Self::Read {
            key: key.to_owned(),
            source: source.into(),
        }
    }

    pub(crate) fn write(key: &str, source: impl Into<BoxedError>) -> Self {
        Self::Write {
            key: key.to_owned(),
            source: source.into(),
        }
    }

    pub(crate) fn list(prefix: &str, source: impl Into<BoxedError>) -> Self {
        Self::List {
            prefix: prefix.to_owned(),
            source: source.into(),
        }
    }

    pub(crate) fn delete(count: usize, source: impl Into<BoxedError>) -> Self {
        Self::Delete {
            count,
            source: source.into(),
        }
    }
}

impl From<StorageError> for Error {
    fn from(error: StorageError) -> Self {
        let operation = error.operation();
        let message = error.to_string();
        Error::storage(operation, message).with_source(error)
    }
}
