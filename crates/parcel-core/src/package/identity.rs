use std::str::FromStr;

use derive_more::Display;
use serde::{Deserialize, Serialize};

use super::{KEY_SEPARATOR, VERSION_SEPARATOR};
use crate::{Error, Result};

/// Identity of a package: a `(name, version)` pair.
///
/// Both components are non-empty and free of `/`. The name cannot hold `@`
/// either, so `name@version` splits back on the first `@`; the version may.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(Display, Serialize, Deserialize)]
#[display("{name}@{version}")]
#[serde(try_from = "String", into = "String")]
pub struct PackageId {
    name: String,
    version: String,
}

impl PackageId {
    /// Creates a new package identity after validating both components.
    ///
    /// # Errors
    ///
    /// Returns a `BadRequest` error when either component is empty, is `.`
    /// or `..`, contains `/`, or when the name contains `@`.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let version = version.into();

        validate_component("name", &name)?;
        validate_component("version", &version)?;

        if name.contains(VERSION_SEPARATOR) {
            return Err(Error::bad_request(format!(
                "package name cannot contain '{VERSION_SEPARATOR}'"
            )));
        }

        Ok(Self { name, version })
    }

    /// Returns the package name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the package version.
    #[inline]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns the key prefix shared by every file of this package.
    pub fn prefix(&self) -> String {
        format!(
            "{}{KEY_SEPARATOR}{}{KEY_SEPARATOR}",
            self.name, self.version
        )
    }
}

impl FromStr for PackageId {
    type Err = Error;

    /// Parses `name@version`, splitting on the first `@`.
    fn from_str(s: &str) -> Result<Self> {
        let Some((name, version)) = s.split_once(VERSION_SEPARATOR) else {
            return Err(Error::bad_request(
                "Invalid URL (valid format: GET /cdn/<package>@<version>/<file>)",
            ));
        };

        Self::new(name, version)
    }
}

impl TryFrom<String> for PackageId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<PackageId> for String {
    fn from(package: PackageId) -> Self {
        package.to_string()
    }
}

fn validate_component(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::bad_request(format!("package {field} cannot be empty")));
    }

    if value == "." || value == ".." {
        return Err(Error::bad_request(format!(
            "package {field} cannot be a relative path segment"
        )));
    }

    if value.contains(KEY_SEPARATOR) {
        return Err(Error::bad_request(format!(
            "package {field} cannot contain '{KEY_SEPARATOR}'"
        )));
    }

    if value.chars().any(char::is_control) {
        return Err(Error::bad_request(format!(
            "package {field} cannot contain control characters"
        )));
    }

    Ok(())
}
