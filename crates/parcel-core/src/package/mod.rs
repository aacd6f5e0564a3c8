//! Package identity and object key derivation.
//!
//! A package is addressed on the wire as `name@version` and every file it
//! owns is stored under `name/version/<file>`. Neither `name` nor `version`
//! may contain `/`, which keeps the derivation injective and lets a listing
//! recover the file path by stripping the package prefix. Only the name is
//! barred from holding `@`.

mod identity;
mod object_key;

pub use identity::PackageId;
pub use object_key::ObjectKey;

/// Separator between the key components.
pub const KEY_SEPARATOR: char = '/';

/// Separator between name and version in the wire identity.
pub const VERSION_SEPARATOR: char = '@';

/// File path reserved to mean "list the package".
pub const LISTING_MARKER: &str = "/";
