//! Storing, listing and deleting package files.

use std::sync::Arc;

use bytes::Bytes;
use futures::TryStreamExt;
use parcel_core::archive::{ArchiveReader, ArchiveValidator};
use parcel_core::package::{ObjectKey, PackageId};
use parcel_core::{Error, Result};
use parcel_storage::{ObjectStore, StoredObject};

use crate::TRACING_TARGET_PACKAGES;

/// Archives may inflate to at most this multiple of the upload limit.
const MAX_INFLATION_RATIO: u64 = 10;

/// Package content operations on top of an [`ObjectStore`].
///
/// A package exists exactly when at least one key lives under its prefix;
/// there is no separate index.
#[derive(Clone)]
pub struct PackageService {
    store: Arc<dyn ObjectStore>,
    validator: ArchiveValidator,
}

impl PackageService {
    /// Creates a service storing files in `store`.
    pub fn new(store: Arc<dyn ObjectStore>, validator: ArchiveValidator) -> Self {
        Self { store, validator }
    }

    /// Returns the validator applied to uploads.
    #[inline]
    pub fn validator(&self) -> ArchiveValidator {
        self.validator
    }

    /// Validates `archive` and stores each of its files under `package`.
    ///
    /// Returns the number of stored files. A failed write is returned as-is
    /// and files already written are kept; uploading again overwrites them.
    #[tracing::instrument(skip(self, archive), target = TRACING_TARGET_PACKAGES, fields(package = %package))]
    pub async fn create_package(&self, package: &PackageId, archive: Bytes) -> Result<usize> {
        let size = archive.len() as u64;
        let mut head: &[u8] = &archive;
        self.validator.validate(&mut head, size)?;

        let max_unpacked = self.validator.max_size().saturating_mul(MAX_INFLATION_RATIO);
        let reader = ArchiveReader::new(max_unpacked);
        let entries = tokio::task::spawn_blocking(move || reader.entries(archive))
            .await
            .map_err(|e| Error::internal("archive extraction was interrupted").with_source(e))??;

        for entry in &entries {
            let key = ObjectKey::new(package, &entry.path)?;
            self.store
                .put_object(key.as_str(), entry.content.clone(), entry.content_type.mime())
                .await?;
        }

        tracing::info!(
            target: TRACING_TARGET_PACKAGES,
            package = %package,
            files = entries.len(),
            size,
            "package stored"
        );

        Ok(entries.len())
    }

    /// Opens a single file of `package` for streaming.
    ///
    /// Returns `Ok(None)` when the file does not exist.
    #[tracing::instrument(skip(self), target = TRACING_TARGET_PACKAGES, fields(package = %package))]
    pub async fn get_file(&self, package: &PackageId, file: &str) -> Result<Option<StoredObject>> {
        let key = ObjectKey::new(package, file)?;
        let object = self.store.get_object(key.as_str()).await?;
        Ok(object)
    }

    /// Lists the files of `package`, relative to its root, in ascending order.
    ///
    /// A package without files and a package that never existed both yield an
    /// empty listing.
    #[tracing::instrument(skip(self), target = TRACING_TARGET_PACKAGES, fields(package = %package))]
    pub async fn get_files(&self, package: &PackageId) -> Result<Vec<String>> {
        let keys = self.list_keys(package).await?;
        let mut files: Vec<String> = keys
            .iter()
            .filter_map(|key| ObjectKey::file_in(key, package))
            .map(str::to_owned)
            .collect();

        files.sort_unstable();
        Ok(files)
    }

    /// Deletes every file of `package` and returns how many were removed.
    ///
    /// Deleting a package that has no files is a successful no-op.
    #[tracing::instrument(skip(self), target = TRACING_TARGET_PACKAGES, fields(package = %package))]
    pub async fn delete_package(&self, package: &PackageId) -> Result<usize> {
        let keys = self.list_keys(package).await?;
        let count = keys.len();
        if count == 0 {
            return Ok(0);
        }

        self.store.delete_objects(keys).await?;

        tracing::info!(
            target: TRACING_TARGET_PACKAGES,
            package = %package,
            files = count,
            "package deleted"
        );

        Ok(count)
    }

    async fn list_keys(&self, package: &PackageId) -> Result<Vec<String>> {
        let keys = self
            .store
            .list_objects(&package.prefix())
            .try_collect()
            .await?;
        Ok(keys)
    }
}
