//! Configuration for translation runs.
//!
//! Loads config from:
//! 1. Global: ~/.config/py2php/config.toml
//! 2. Per-project: py2php.toml next to the input file (overrides global)
//!
//! Layers merge key by key: a project file that only sets `[platform]`
//! keeps the global `[resolver]` settings.
//!
//! Example py2php.toml:
//! ```toml
//! [resolver]
//! search_paths = ["../library", "vendor"]
//! library_prefix = "pyjamas"
//! external_modules = ["math"]
//!
//! [platform]
//! name = "mozilla"
//! dir = "__mozilla__"
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// File name looked up next to the input.
pub const PROJECT_CONFIG: &str = "py2php.toml";

/// Where and how modules are found.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverConfig {
    /// Directories searched for module documents and raw includes.
    /// Relative entries are anchored at the config file's directory.
    pub search_paths: Vec<PathBuf>,
    /// Extension of syntax-tree documents (without the dot).
    pub extension: String,
    /// Library namespace stripped from module names before lookup.
    pub library_prefix: String,
    /// Modules provided by the PHP runtime; never located or translated.
    pub external_modules: Vec<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            search_paths: vec![PathBuf::from("../library")],
            extension: "json".to_string(),
            library_prefix: "pyjamas".to_string(),
            external_modules: vec!["math".to_string()],
        }
    }
}

/// Platform override selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlatformConfig {
    /// Platform name, appended to a module's stem to find its override file.
    pub name: Option<String>,
    /// Subdirectory (relative to each module) holding override files.
    pub dir: PathBuf,
}

/// Output shaping.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputConfig {
    /// Emit the runtime-library preamble at the top of a program.
    pub preamble: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { preamble: true }
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranslateConfig {
    pub resolver: ResolverConfig,
    pub platform: PlatformConfig,
    pub output: OutputConfig,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl TranslateConfig {
    /// Load configuration for an input living in `dir`.
    ///
    /// Missing files are skipped; a file that exists but does not parse is
    /// an error.
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let candidates = [Self::global_config_path(), Some(dir.join(PROJECT_CONFIG))];
        let files: Vec<PathBuf> = candidates
            .into_iter()
            .flatten()
            .filter(|path| path.is_file())
            .collect();
        Self::load_layers(&files)
    }

    /// Load a single config file over the defaults.
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        Self::load_layers(&[path.to_path_buf()])
    }

    /// Merge config files in order; later files win key by key.
    fn load_layers(paths: &[PathBuf]) -> Result<Self, ConfigError> {
        let mut merged = ConfigLayer::default();
        for path in paths {
            merged = merged.merge(ConfigLayer::read(path)?);
        }
        Ok(merged.apply(Self::default()))
    }

    /// Get the global config path.
    fn global_config_path() -> Option<PathBuf> {
        let config_home = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .ok()
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))?;
        Some(config_home.join("py2php").join("config.toml"))
    }

    /// Place `dir` ahead of the configured search paths.
    pub fn prepend_search_path(&mut self, dir: impl Into<PathBuf>) {
        let dir = dir.into();
        if !self.resolver.search_paths.contains(&dir) {
            self.resolver.search_paths.insert(0, dir);
        }
    }
}

/// One config file as written: unset keys stay `None`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigLayer {
    resolver: ResolverLayer,
    platform: PlatformLayer,
    output: OutputLayer,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ResolverLayer {
    search_paths: Option<Vec<PathBuf>>,
    extension: Option<String>,
    library_prefix: Option<String>,
    external_modules: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PlatformLayer {
    name: Option<String>,
    dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OutputLayer {
    preamble: Option<bool>,
}

impl ConfigLayer {
    /// Parse one file, anchoring relative search paths at its directory.
    fn read(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut layer: Self = toml::from_str(&content).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        if let Some(base) = path.parent()
            && let Some(paths) = layer.resolver.search_paths.take()
        {
            layer.resolver.search_paths = Some(
                paths
                    .into_iter()
                    .map(|p| if p.is_relative() { base.join(p) } else { p })
                    .collect(),
            );
        }
        Ok(layer)
    }

    /// `other` wins for every key it sets.
    fn merge(self, other: Self) -> Self {
        Self {
            resolver: ResolverLayer {
                search_paths: other.resolver.search_paths.or(self.resolver.search_paths),
                extension: other.resolver.extension.or(self.resolver.extension),
                library_prefix: other.resolver.library_prefix.or(self.resolver.library_prefix),
                external_modules: other
                    .resolver
                    .external_modules
                    .or(self.resolver.external_modules),
            },
            platform: PlatformLayer {
                name: other.platform.name.or(self.platform.name),
                dir: other.platform.dir.or(self.platform.dir),
            },
            output: OutputLayer {
                preamble: other.output.preamble.or(self.output.preamble),
            },
        }
    }

    fn apply(self, base: TranslateConfig) -> TranslateConfig {
        let ConfigLayer {
            resolver,
            platform,
            output,
        } = self;
        TranslateConfig {
            resolver: ResolverConfig {
                search_paths: resolver.search_paths.unwrap_or(base.resolver.search_paths),
                extension: resolver.extension.unwrap_or(base.resolver.extension),
                library_prefix: resolver.library_prefix.unwrap_or(base.resolver.library_prefix),
                external_modules: resolver
                    .external_modules
                    .unwrap_or(base.resolver.external_modules),
            },
            platform: PlatformConfig {
                name: platform.name.or(base.platform.name),
                dir: platform.dir.unwrap_or(base.platform.dir),
            },
            output: OutputConfig {
                preamble: output.preamble.unwrap_or(base.output.preamble),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = TranslateConfig::default();
        assert_eq!(config.resolver.extension, "json");
        assert_eq!(config.resolver.library_prefix, "pyjamas");
        assert_eq!(config.resolver.external_modules, vec!["math".to_string()]);
        assert!(config.platform.name.is_none());
        assert!(config.output.preamble);
    }

    #[test]
    fn test_load_project_config() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join(PROJECT_CONFIG);
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(
            file,
            r#"
[resolver]
search_paths = ["lib", "/opt/py2php/library"]
library_prefix = "toolkit"

[platform]
name = "hulahop"
dir = "__hulahop__"

[output]
preamble = false
"#
        )
        .unwrap();

        let config = TranslateConfig::load_file(&config_path).unwrap();
        assert_eq!(
            config.resolver.search_paths,
            vec![
                dir.path().join("lib"),
                PathBuf::from("/opt/py2php/library")
            ]
        );
        assert_eq!(config.resolver.library_prefix, "toolkit");
        assert_eq!(config.resolver.extension, "json");
        assert_eq!(config.platform.name.as_deref(), Some("hulahop"));
        assert_eq!(config.platform.dir, PathBuf::from("__hulahop__"));
        assert!(!config.output.preamble);
    }

    #[test]
    fn test_invalid_config_is_reported() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join(PROJECT_CONFIG);
        std::fs::write(&config_path, "[resolver]\nsearch_paths = 3\n").unwrap();
        let err = TranslateConfig::load_file(&config_path).unwrap_err();
        assert!(matches!(err, ConfigError::Toml { .. }));
    }

    #[test]
    fn test_project_layer_keeps_global_resolver() {
        let global = TempDir::new().unwrap();
        let global_path = global.path().join("config.toml");
        std::fs::write(
            &global_path,
            "[resolver]\nsearch_paths = [\"/srv/library\"]\nlibrary_prefix = \"toolkit\"\n",
        )
        .unwrap();
        let project = TempDir::new().unwrap();
        let project_path = project.path().join(PROJECT_CONFIG);
        std::fs::write(&project_path, "[platform]\nname = \"hulahop\"\n").unwrap();

        let config = TranslateConfig::load_layers(&[global_path, project_path]).unwrap();
        assert_eq!(
            config.resolver.search_paths,
            vec![PathBuf::from("/srv/library")]
        );
        assert_eq!(config.resolver.library_prefix, "toolkit");
        assert_eq!(config.resolver.extension, "json");
        assert_eq!(config.platform.name.as_deref(), Some("hulahop"));
        assert!(config.output.preamble);
    }

    #[test]
    fn test_prepend_search_path_dedups() {
        let mut config = TranslateConfig::default();
        config.prepend_search_path("app");
        config.prepend_search_path("app");
        assert_eq!(config.resolver.search_paths[0], PathBuf::from("app"));
        assert_eq!(config.resolver.search_paths.len(), 2);
    }
}
