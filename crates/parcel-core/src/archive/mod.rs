//! Uploaded archive validation and traversal.
//!
//! [`ArchiveValidator`] runs before anything touches storage and only peeks
//! at the upload, so the caller can still read the stream in full. Once an
//! upload is accepted, [`ArchiveReader`] walks its members.

mod reader;
mod validator;

pub use reader::{ArchiveEntry, ArchiveReader};
pub use validator::{ArchiveFormat, ArchiveValidator};
