#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod extract;
pub mod handler;
pub mod middleware;
pub mod service;
mod utility;

#[doc(hidden)]
pub mod prelude;

pub use crate::utility::tracing_targets::*;
