//! Request types for HTTP handlers.

mod tokens;

pub use tokens::*;
