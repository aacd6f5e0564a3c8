use std::io::{Cursor, Read};
use std::path::{Component, Path};

use bytes::Bytes;
use zip::ZipArchive;
use zip::result::ZipError;

use crate::content::ContentType;
use crate::{Error, Result, TRACING_TARGET_ARCHIVE};

/// A single regular file extracted from an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Path relative to the archive root, `/`-separated.
    pub path: String,
    /// Decompressed content.
    pub content: Bytes,
    /// Content type inferred from the path extension.
    pub content_type: ContentType,
}

impl ArchiveEntry {
    /// Returns the decompressed size in bytes.
    #[inline]
    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }
}

/// Walks the members of a zip archive held in memory.
///
/// This is blocking work; async callers should run it on the blocking pool.
#[derive(Debug, Clone, Copy)]
pub struct ArchiveReader {
    max_unpacked_size: u64,
}

impl ArchiveReader {
    /// Creates a reader that refuses archives inflating past `max_unpacked_size`.
    pub const fn new(max_unpacked_size: u64) -> Self {
        Self { max_unpacked_size }
    }

    /// Extracts every regular file of the archive, in central directory order.
    ///
    /// Directory entries are skipped. Members whose name escapes the archive
    /// root are rejected, as are archives that fail to decode.
    pub fn entries(&self, data: Bytes) -> Result<Vec<ArchiveEntry>> {
        let mut archive = ZipArchive::new(Cursor::new(data)).map_err(invalid_archive)?;
        let mut entries = Vec::with_capacity(archive.len());
        let mut unpacked = 0u64;

        for index in 0..archive.len() {
            let mut file = archive.by_index(index).map_err(invalid_archive)?;
            if file.is_dir() {
                continue;
            }

            let Some(enclosed) = file.enclosed_name() else {
                return Err(Error::validation(format!(
                    "archive member '{}' escapes the archive root",
                    file.name()
                )));
            };
            let path = normalize_path(&enclosed)?;

            unpacked = unpacked.saturating_add(file.size());
            if unpacked > self.max_unpacked_size {
                return Err(Error::validation(format!(
                    "archive inflates past the limit of {} bytes",
                    self.max_unpacked_size
                )));
            }

            let capacity = usize::try_from(file.size()).unwrap_or_default();
            let mut content = Vec::with_capacity(capacity);
            file.read_to_end(&mut content).map_err(|e| {
                Error::validation(format!("archive member '{path}' could not be read"))
                    .with_source(e)
            })?;

            let content_type = ContentType::from_path(&path);
            entries.push(ArchiveEntry {
                path,
                content: Bytes::from(content),
                content_type,
            });
        }

        if entries.is_empty() {
            return Err(Error::validation("archive contains no files"));
        }

        tracing::debug!(
            target: TRACING_TARGET_ARCHIVE,
            files = entries.len(),
            unpacked_size = unpacked,
            "archive walked"
        );

        Ok(entries)
    }
}

impl Default for ArchiveReader {
    fn default() -> Self {
        Self::new(u64::MAX)
    }
}

fn invalid_archive(error: ZipError) -> Error {
    Error::validation("archive could not be decoded").with_source(error)
}

/// Joins the normal components of an enclosed path with `/`.
fn normalize_path(path: &Path) -> Result<String> {
    let mut segments = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(segment) => {
                let Some(segment) = segment.to_str() else {
                    return Err(Error::validation("archive member name is not valid UTF-8"));
                };
                segments.push(segment);
            }
            Component::CurDir => {}
            _ => {
                return Err(Error::validation(format!(
                    "archive member '{}' escapes the archive root",
                    path.display()
                )));
            }
        }
    }

    if segments.is_empty() {
        return Err(Error::validation("archive member has an empty name"));
    }

    Ok(segments.join("/"))
}
