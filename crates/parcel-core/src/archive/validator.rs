use std::io::BufRead;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

use crate::{Error, Result, TRACING_TARGET_ARCHIVE};

/// Local file header signature that opens every non-empty zip archive.
const ZIP_LOCAL_FILE_HEADER: &[u8; 4] = b"PK\x03\x04";

/// End of central directory signature; a zip starting with it has no members.
const ZIP_END_OF_CENTRAL_DIRECTORY: &[u8; 4] = b"PK\x05\x06";

/// Archive formats accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ArchiveFormat {
    /// PKWARE zip archive.
    Zip,
}

/// Size and signature checks applied to an upload before it is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveValidator {
    max_size: u64,
}

impl ArchiveValidator {
    /// Default upper bound on the declared archive size (100 MiB).
    pub const DEFAULT_MAX_SIZE: u64 = 100 * 1024 * 1024;

    /// Creates a validator that accepts archives up to `max_size` bytes.
    pub const fn new(max_size: u64) -> Self {
        Self { max_size }
    }

    /// Returns the configured size limit in bytes.
    #[inline]
    pub const fn max_size(&self) -> u64 {
        self.max_size
    }

    /// Checks a declared or observed archive size against the limit.
    pub fn check_size(&self, size: u64) -> Result<()> {
        if size == 0 {
            return Err(Error::validation("archive is empty"));
        }

        if size > self.max_size {
            return Err(Error::validation(format!(
                "archive size {size} exceeds the limit of {} bytes",
                self.max_size
            )));
        }

        Ok(())
    }

    /// Validates an upload without consuming it.
    ///
    /// Only [`BufRead::fill_buf`] is called on `reader`; the peeked bytes are
    /// never consumed, so a subsequent read still starts at the first byte.
    pub fn validate<R: BufRead + ?Sized>(
        &self,
        reader: &mut R,
        declared_size: u64,
    ) -> Result<ArchiveFormat> {
        self.check_size(declared_size)?;

        let head = reader
            .fill_buf()
            .map_err(|e| Error::validation("archive could not be read").with_source(e))?;

        let format = detect_format(head)?;

        tracing::debug!(
            target: TRACING_TARGET_ARCHIVE,
            format = %format,
            declared_size,
            "archive accepted"
        );

        Ok(format)
    }
}

impl Default for ArchiveValidator {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_SIZE)
    }
}

fn detect_format(head: &[u8]) -> Result<ArchiveFormat> {
    if head.starts_with(ZIP_LOCAL_FILE_HEADER) {
        return Ok(ArchiveFormat::Zip);
    }

    if head.starts_with(ZIP_END_OF_CENTRAL_DIRECTORY) {
        return Err(Error::validation("archive contains no files"));
    }

    if head.len() < ZIP_LOCAL_FILE_HEADER.len() {
        return Err(Error::validation("archive is truncated"));
    }

    Err(Error::validation("unsupported archive format, expected zip"))
}
