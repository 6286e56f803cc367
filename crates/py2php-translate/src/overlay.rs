//! Platform override files and the parse cache.
//!
//! A module `widget.json` may have a platform-specific companion at
//! `<dir>/<platform_dir>/widget<platform>.json`. Functions and methods the
//! companion defines replace the base module's definitions by name.

use crate::error::{Result, TranslateError};
use py2php_ast::{ClassDef, FunctionDef, Module, SourceParser, StmtKind};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Parsed trees by path. Entries are written once and never mutated.
#[derive(Debug, Default)]
pub struct ParseCache {
    entries: HashMap<PathBuf, Arc<Module>>,
}

impl ParseCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_parse(&mut self, path: &Path, parser: &dyn SourceParser) -> Result<Arc<Module>> {
        if let Some(module) = self.entries.get(path) {
            debug!(path = %path.display(), "Parse cache hit");
            return Ok(Arc::clone(module));
        }
        let module = parser
            .parse_file(path)
            .map_err(|source| TranslateError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        let module = Arc::new(module);
        self.entries.insert(path.to_path_buf(), Arc::clone(&module));
        Ok(module)
    }

    pub fn get(&self, path: &Path) -> Option<&Arc<Module>> {
        self.entries.get(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Selects and applies platform override files.
#[derive(Debug, Clone, Default)]
pub struct PlatformOverlay {
    platform: Option<String>,
    platform_dir: PathBuf,
}

impl PlatformOverlay {
    pub fn new(platform: Option<String>, platform_dir: impl Into<PathBuf>) -> Self {
        Self {
            platform,
            platform_dir: platform_dir.into(),
        }
    }

    /// Where the override for `file` would live, if a platform is set.
    pub fn override_path(&self, file: &Path) -> Option<PathBuf> {
        let platform = self.platform.as_deref()?;
        let stem = file.file_stem()?.to_string_lossy();
        let name = match file.extension() {
            Some(ext) => format!("{stem}{platform}.{}", ext.to_string_lossy()),
            None => format!("{stem}{platform}"),
        };
        let dir = file.parent().unwrap_or_else(|| Path::new(""));
        Some(dir.join(&self.platform_dir).join(name))
    }

    /// Parse `file` and apply its platform override when one exists.
    pub fn load(
        &self,
        file: &Path,
        parser: &dyn SourceParser,
        cache: &mut ParseCache,
    ) -> Result<Arc<Module>> {
        let base = cache.get_or_parse(file, parser)?;
        let Some(override_path) = self.override_path(file) else {
            return Ok(base);
        };
        if !override_path.is_file() {
            return Ok(base);
        }
        debug!(base = %file.display(), overlay = %override_path.display(), "Merging platform override");
        let overrides = cache.get_or_parse(&override_path, parser)?;
        Ok(Arc::new(merge(&base, &overrides)?))
    }
}

/// Apply `overrides` to a copy of `base`.
///
/// Only parameters and bodies are replaced; everything else about a
/// definition (name, decorators, docstring) stays as the base has it.
pub fn merge(base: &Module, overrides: &Module) -> Result<Module> {
    let mut merged = base.clone();
    for stmt in &overrides.body {
        match &stmt.kind {
            StmtKind::FunctionDef(function) => {
                let target = find_function(&mut merged, &function.name).ok_or_else(|| {
                    TranslateError::unresolved(
                        &function.name,
                        format!("function not found: {}", function.name),
                    )
                })?;
                replace_body(target, function);
            }
            StmtKind::ClassDef(class) => {
                let target = find_class(&mut merged, &class.name).ok_or_else(|| {
                    TranslateError::unresolved(
                        &class.name,
                        format!("class not found: {}", class.name),
                    )
                })?;
                merge_class(target, class)?;
            }
            _ => {}
        }
    }
    Ok(merged)
}

fn merge_class(target: &mut ClassDef, overrides: &ClassDef) -> Result<()> {
    for stmt in &overrides.body {
        let StmtKind::FunctionDef(method) = &stmt.kind else {
            continue;
        };
        let found = target.body.iter_mut().find_map(|s| match &mut s.kind {
            StmtKind::FunctionDef(f) if f.name == method.name => Some(f),
            _ => None,
        });
        let Some(found) = found else {
            let name = format!("{}::{}", overrides.name, method.name);
            return Err(TranslateError::unresolved(
                &name,
                format!("class method not found: {name}"),
            ));
        };
        replace_body(found, method);
    }
    Ok(())
}

fn replace_body(target: &mut FunctionDef, source: &FunctionDef) {
    target.params = source.params.clone();
    target.body = source.body.clone();
}

fn find_function<'m>(module: &'m mut Module, name: &str) -> Option<&'m mut FunctionDef> {
    module.body.iter_mut().find_map(|s| match &mut s.kind {
        StmtKind::FunctionDef(f) if f.name == name => Some(f),
        _ => None,
    })
}

fn find_class<'m>(module: &'m mut Module, name: &str) -> Option<&'m mut ClassDef> {
    module.body.iter_mut().find_map(|s| match &mut s.kind {
        StmtKind::ClassDef(c) if c.name == name => Some(c),
        _ => None,
    })
}
