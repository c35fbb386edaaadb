//! Rendering module for converting documents to output formats.

mod json;

pub use json::{to_json, JsonFormat};
