//! Prelude module for convenient imports.

pub use crate::archive::{ArchiveEntry, ArchiveFormat, ArchiveReader, ArchiveValidator};
pub use crate::content::ContentType;
pub use crate::package::{ObjectKey, PackageId};
pub use crate::{Error, ErrorKind, Result};
