use derive_more::Display;

use super::{KEY_SEPARATOR, LISTING_MARKER, PackageId};
use crate::{Error, Result};

/// Object store key of a single package file: `name/version/file`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(Display)]
pub struct ObjectKey(String);

impl ObjectKey {
    /// Derives the key of `file` inside `package`.
    ///
    /// One leading `/` of `file` is ignored, so `/index.js` and `index.js`
    /// address the same object.
    ///
    /// # Errors
    ///
    /// Returns a `BadRequest` error when `file` is empty or is the
    /// listing marker `/`.
    pub fn new(package: &PackageId, file: &str) -> Result<Self> {
        if file == LISTING_MARKER {
            return Err(Error::bad_request(
                "file path '/' is reserved for the package listing",
            ));
        }

        let file = file.strip_prefix(KEY_SEPARATOR).unwrap_or(file);
        if file.is_empty() {
            return Err(Error::bad_request("file path cannot be empty"));
        }

        Ok(Self(format!("{}{file}", package.prefix())))
    }

    /// Returns the file path relative to `package`, if this key belongs to it.
    pub fn file_in<'a>(key: &'a str, package: &PackageId) -> Option<&'a str> {
        key.strip_prefix(package.prefix().as_str())
            .filter(|file| !file.is_empty())
    }

    /// Returns the key as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the key and returns the owned string.
    #[inline]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for ObjectKey {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_derive_key() -> anyhow::Result<()> {
        let package = PackageId::new("acme", "1.0.0")?;
        let key = ObjectKey::new(&package, "dist/index.js")?;
        assert_eq!(key.as_str(), "acme/1.0.0/dist/index.js");
        Ok(())
    }

    #[test]
    fn test_leading_slash_is_ignored() -> anyhow::Result<()> {
        let package = PackageId::new("acme", "1.0.0")?;
        assert_eq!(
            ObjectKey::new(&package, "/index.js")?,
            ObjectKey::new(&package, "index.js")?
        );
        Ok(())
    }

    #[test]
    fn test_reject_empty_and_listing_marker() -> anyhow::Result<()> {
        let package = PackageId::new("acme", "1.0.0")?;
        assert_eq!(
            ObjectKey::new(&package, "").unwrap_err().kind(),
            ErrorKind::BadRequest
        );
        assert_eq!(
            ObjectKey::new(&package, "/").unwrap_err().kind(),
            ErrorKind::BadRequest
        );
        Ok(())
    }

    #[test]
    fn test_recover_file_from_key() -> anyhow::Result<()> {
        let package = PackageId::new("acme", "1.0.0")?;
        let other = PackageId::new("acme", "1.0.1")?;
        let key = ObjectKey::new(&package, "lib/a.css")?;

        assert_eq!(ObjectKey::file_in(key.as_str(), &package), Some("lib/a.css"));
        assert_eq!(ObjectKey::file_in(key.as_str(), &other), None);
        assert_eq!(ObjectKey::file_in("acme/1.0.0/", &package), None);
        Ok(())
    }
}
