//! Translation errors.

use py2php_ast::ParseError;
use std::path::PathBuf;

/// Error that aborts a translation run.
#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    /// A tree node the translator cannot express in PHP.
    #[error("line {line}: {message}\n  node: {node}")]
    UnsupportedConstruct {
        line: u32,
        message: String,
        node: String,
    },

    /// An override names a function, class or method the base file lacks.
    #[error("{message}")]
    UnresolvedReference { name: String, message: String },

    /// A module or raw include was not found on any search path.
    #[error("unable to locate `{name}`; searched: {}", display_dirs(.searched))]
    ResourceNotFound { name: String, searched: Vec<PathBuf> },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, TranslateError>;

fn display_dirs(dirs: &[PathBuf]) -> String {
    if dirs.is_empty() {
        return "(no search paths)".to_string();
    }
    dirs.iter()
        .map(|d| d.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl TranslateError {
    pub(crate) fn unresolved(name: impl Into<String>, message: impl Into<String>) -> Self {
        TranslateError::UnresolvedReference {
            name: name.into(),
            message: message.into(),
        }
    }
}
