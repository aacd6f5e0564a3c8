#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for archive validation and extraction.
pub const TRACING_TARGET_ARCHIVE: &str = "parcel_core::archive";

mod error;

pub mod archive;
pub mod content;
pub mod package;

#[doc(hidden)]
pub mod prelude;

pub use crate::error::{BoxedError, Error, ErrorKind, Result};
