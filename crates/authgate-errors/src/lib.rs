//! Stable error codes and the shared error object used across authgate crates.

pub mod class;
pub mod code;
pub mod labels;
#[cfg(feature = "http")]
pub mod mapping_http;
pub mod model;
pub mod prelude;
pub mod render;
