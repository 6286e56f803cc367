//! Module and raw-include lookup over configured search paths.

use crate::error::{Result, TranslateError};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Finds files named by imports.
#[derive(Debug, Clone)]
pub struct ModuleLocator {
    search_paths: Vec<PathBuf>,
    library_prefix: String,
}

impl ModuleLocator {
    pub fn new(search_paths: Vec<PathBuf>, library_prefix: impl Into<String>) -> Self {
        Self {
            search_paths,
            library_prefix: library_prefix.into(),
        }
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Resolve `file_name` to an existing file.
    ///
    /// The name is tried as given first. Otherwise the library namespace
    /// (`pyjamas.ui.json` to `ui.json`) is stripped, unless the name is the
    /// namespace's own root file, and each search path is probed in order.
    pub fn locate(&self, file_name: &str) -> Result<PathBuf> {
        let direct = Path::new(file_name);
        if direct.is_file() {
            return Ok(direct.to_path_buf());
        }

        let namespace = format!("{}.", self.library_prefix);
        let relative = match file_name.strip_prefix(namespace.as_str()) {
            Some(rest) if rest.contains('.') => rest,
            _ => file_name,
        };

        for dir in &self.search_paths {
            let candidate = dir.join(relative);
            if candidate.is_file() {
                debug!(name = file_name, path = %candidate.display(), "Located");
                return Ok(candidate);
            }
        }

        Err(TranslateError::ResourceNotFound {
            name: file_name.to_string(),
            searched: self.search_paths.clone(),
        })
    }
}

/// Read a raw file for verbatim inclusion.
pub fn read_raw(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| TranslateError::Io {
        path: path.to_path_buf(),
        source,
    })
}
