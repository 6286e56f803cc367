//! Whole-program resolution: locate, parse, overlay, translate, stitch.

use crate::config::TranslateConfig;
use crate::error::Result;
use crate::locate::{ModuleLocator, read_raw};
use crate::overlay::{ParseCache, PlatformOverlay};
use crate::registry::ClassRegistry;
use crate::translator::{PREAMBLE, TranslationUnit, Translator};
use py2php_ast::SourceParser;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Translates a module and everything it imports.
///
/// One resolver is one translation run: the class registry, the parse
/// cache and the memoized units all live exactly as long as it does.
pub struct ModuleResolver<'p> {
    parser: &'p dyn SourceParser,
    locator: ModuleLocator,
    overlay: PlatformOverlay,
    cache: ParseCache,
    registry: ClassRegistry,
    extension: String,
    library_prefix: String,
    external: HashSet<String>,
    preamble: bool,
    units: HashMap<String, Arc<TranslationUnit>>,
    emitted: HashSet<String>,
    included: HashSet<PathBuf>,
}

impl<'p> ModuleResolver<'p> {
    pub fn new(config: &TranslateConfig, parser: &'p dyn SourceParser) -> Self {
        let resolver = &config.resolver;
        Self {
            parser,
            locator: ModuleLocator::new(
                resolver.search_paths.clone(),
                resolver.library_prefix.clone(),
            ),
            overlay: PlatformOverlay::new(config.platform.name.clone(), config.platform.dir.clone()),
            cache: ParseCache::new(),
            registry: ClassRegistry::new(),
            extension: resolver.extension.clone(),
            library_prefix: resolver.library_prefix.clone(),
            external: resolver.external_modules.iter().cloned().collect(),
            preamble: config.output.preamble,
            units: HashMap::new(),
            emitted: HashSet::new(),
            included: HashSet::new(),
        }
    }

    /// Translate `module` (and, recursively, its imports) once per run.
    pub fn resolve(&mut self, module: &str) -> Result<Arc<TranslationUnit>> {
        if let Some(unit) = self.units.get(module) {
            debug!(module, "Already resolved");
            return Ok(Arc::clone(unit));
        }

        let path = self.locator.locate(&format!("{module}.{}", self.extension))?;
        self.resolve_file(module, &path)
    }

    /// Translate the document at `path` as `module`, bypassing lookup.
    ///
    /// Later calls to [`resolve`](Self::resolve) for the same name reuse
    /// this result.
    pub fn resolve_file(&mut self, module: &str, path: &Path) -> Result<Arc<TranslationUnit>> {
        if let Some(unit) = self.units.get(module) {
            debug!(module, "Already resolved");
            return Ok(Arc::clone(unit));
        }

        info!(module, path = %path.display(), "Importing");
        let tree = self.overlay.load(path, self.parser, &mut self.cache)?;
        let unit = Translator::new(&mut self.registry)
            .with_library_prefix(&self.library_prefix)
            .with_parser(self.parser)
            .translate_module(module, &tree)?;
        let unit = Arc::new(unit);
        self.units.insert(module.to_string(), Arc::clone(&unit));

        for dependency in &unit.imported_modules {
            if !self.external.contains(dependency) {
                self.resolve(dependency)?;
            }
        }
        Ok(unit)
    }

    /// A complete program for `module`: preamble, dependencies, then the
    /// module itself.
    pub fn translate_app(&mut self, module: &str) -> Result<String> {
        let mut out = String::new();
        if self.preamble {
            out.push_str(PREAMBLE);
        }
        self.emit(module, &mut out)?;
        Ok(out)
    }

    /// Library modules stitched together without a preamble.
    pub fn translate_libraries(&mut self, modules: &[String]) -> Result<String> {
        let mut out = String::new();
        for module in modules {
            self.emit(module, &mut out)?;
        }
        Ok(out)
    }

    fn emit(&mut self, module: &str, out: &mut String) -> Result<()> {
        if !self.emitted.insert(module.to_string()) {
            return Ok(());
        }
        let unit = self.resolve(module)?;

        for dependency in &unit.imported_modules {
            if !self.external.contains(dependency) {
                self.emit(dependency, out)?;
            }
        }
        for include in &unit.raw_includes {
            let path = self.locator.locate(include)?;
            if !self.included.insert(path.clone()) {
                continue;
            }
            info!(include = %include, path = %path.display(), "Including");
            let text = read_raw(&path)?;
            out.push_str(&format!(
                "\n//\n// BEGIN {include}\n//\n{text}\n//\n// END {include}\n//\n"
            ));
        }
        if module != self.library_prefix {
            out.push_str(&unit.text());
        }
        Ok(())
    }

    /// Classes seen so far in this run.
    pub fn registry(&self) -> &ClassRegistry {
        &self.registry
    }

    /// Modules translated so far in this run.
    pub fn resolved(&self) -> impl Iterator<Item = &str> {
        self.units.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TranslateError;
    use py2php_ast::JSON_PARSER;
    use std::fs;
    use tempfile::TempDir;

    fn config_for(dir: &TempDir) -> TranslateConfig {
        let mut config = TranslateConfig::default();
        config.resolver.search_paths = vec![dir.path().to_path_buf()];
        config
    }

    #[test]
    fn test_missing_module() {
        let dir = TempDir::new().unwrap();
        let config = config_for(&dir);
        let mut resolver = ModuleResolver::new(&config, &JSON_PARSER);
        let err = resolver.resolve("absent").unwrap_err();
        assert!(matches!(err, TranslateError::ResourceNotFound { .. }));
    }

    #[test]
    fn test_external_modules_are_not_located() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("app.json"),
            r#"[{"line": 1, "kind": "import", "names": [{"name": "math"}]}]"#,
        )
        .unwrap();
        let mut config = config_for(&dir);
        config.output.preamble = false;
        let mut resolver = ModuleResolver::new(&config, &JSON_PARSER);
        let out = resolver.translate_app("app").unwrap();
        assert_eq!(out, "require_once( 'math.php');\n");
        assert_eq!(resolver.resolved().collect::<Vec<_>>(), vec!["app"]);
    }

    #[test]
    fn test_resolve_file_names_the_module() {
        let input = TempDir::new().unwrap();
        let path = input.path().join("script.json");
        fs::write(&path, r#"[{"line": 1, "kind": "pass"}]"#).unwrap();
        let library = TempDir::new().unwrap();
        let config = config_for(&library);
        let mut resolver = ModuleResolver::new(&config, &JSON_PARSER);

        let unit = resolver.resolve_file("main", &path).unwrap();
        assert_eq!(unit.name, "main");
        // Served from memory; "main.json" exists on no search path.
        assert!(resolver.resolve("main").is_ok());
    }
}
