//! Input parsers - produce trees from source documents.

#[cfg(feature = "read-json")]
pub mod json;

#[cfg(feature = "read-json")]
pub use json::{JSON_PARSER, JsonParser, read_json};
