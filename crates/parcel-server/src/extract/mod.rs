//! Request extractors with rejections rendered as [`Error`] responses.
//!
//! [`Error`]: crate::handler::Error

mod auth;
mod reject;

pub use crate::extract::auth::{AdminCredentials, AuthToken};
pub use crate::extract::reject::{Json, Multipart, Path};
