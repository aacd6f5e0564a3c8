use parcel_core::package::PackageId;
use serde::{Deserialize, Serialize};

/// Files of a package, relative to its root.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageFiles {
    /// Package identity, as `name@version`.
    pub package: String,
    /// File paths in ascending order.
    pub files: Vec<String>,
}

impl PackageFiles {
    pub fn new(package: &PackageId, files: Vec<String>) -> Self {
        Self {
            package: package.to_string(),
            files,
        }
    }
}

/// Result of a successful upload.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageCreated {
    pub name: String,
    pub version: String,
    /// Number of files stored from the archive.
    pub files: usize,
}

impl PackageCreated {
    pub fn new(package: &PackageId, files: usize) -> Self {
        Self {
            name: package.name().to_owned(),
            version: package.version().to_owned(),
            files,
        }
    }
}
