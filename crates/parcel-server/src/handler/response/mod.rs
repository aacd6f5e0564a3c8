//! Response types for HTTP handlers.

mod errors;
mod monitors;
mod packages;
mod tokens;

pub use errors::*;
pub use monitors::*;
pub use packages::*;
pub use tokens::*;
