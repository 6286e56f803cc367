//! The parser collaborator that turns source files into trees.

use crate::ast::Module;
use std::path::{Path, PathBuf};

/// Error that can occur when producing a tree from a source document.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed syntax tree: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported syntax: {0}")]
    Unsupported(String),
}

/// Produces syntax trees for the translator.
///
/// The translator never parses Python itself; it asks a `SourceParser` for
/// files it locates and for source fragments handed to `exec`.
pub trait SourceParser: Send + Sync {
    /// Format identifier (e.g., "json").
    fn format(&self) -> &'static str;

    /// Parse a located file into a tree.
    fn parse_file(&self, path: &Path) -> Result<Module, ParseError>;

    /// Parse an in-memory source fragment into a tree.
    fn parse_str(&self, source: &str) -> Result<Module, ParseError>;
}
