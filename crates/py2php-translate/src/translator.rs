//! Module-level translation driver.

use crate::error::{Result, TranslateError};
use crate::registry::ClassRegistry;
use crate::scope::{NameKind, ScopeContext};
use crate::text::doc_block;
use indexmap::IndexSet;
use py2php_ast::{Module, SourceParser, Stmt, StmtKind};
use std::fmt::Debug;
use tracing::warn;

/// Lines placed at the top of every complete program so the runtime
/// library is reachable.
pub const PREAMBLE: &str = "set_include_path(get_include_path() . PATH_SEPARATOR . dirname(__FILE__) . DIRECTORY_SEPARATOR . 'libpy2php');\nrequire_once('libpy2php.php');\n";

/// Library namespace used when none is configured.
pub const DEFAULT_LIBRARY_PREFIX: &str = "pyjamas";

const INDENT: &str = "  ";

/// Output of translating one module.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationUnit {
    pub name: String,
    /// Translated text of each top-level statement, in order.
    pub fragments: Vec<String>,
    /// Modules this one imports, by library-relative name, in discovery order.
    pub imported_modules: Vec<String>,
    /// Raw PHP files this module asks to include.
    pub raw_includes: Vec<String>,
}

impl TranslationUnit {
    pub fn text(&self) -> String {
        self.fragments.concat()
    }
}

/// Translates one module tree into PHP text.
///
/// A translator is single-use: it owns the module's scope and output, and
/// borrows the run-wide class registry.
pub struct Translator<'a> {
    pub(crate) registry: &'a mut ClassRegistry,
    pub(crate) parser: Option<&'a dyn SourceParser>,
    pub(crate) library_prefix: &'a str,
    pub(crate) scope: ScopeContext,
    pub(crate) output: String,
    pub(crate) indent: usize,
    pub(crate) line: u32,
    pub(crate) dependencies: IndexSet<String>,
    pub(crate) raw_includes: IndexSet<String>,
}

impl<'a> Translator<'a> {
    pub fn new(registry: &'a mut ClassRegistry) -> Self {
        Self {
            registry,
            parser: None,
            library_prefix: DEFAULT_LIBRARY_PREFIX,
            scope: ScopeContext::new(),
            output: String::new(),
            indent: 0,
            line: 0,
            dependencies: IndexSet::new(),
            raw_includes: IndexSet::new(),
        }
    }

    pub fn with_library_prefix(mut self, prefix: &'a str) -> Self {
        self.library_prefix = prefix;
        self
    }

    /// Parser used to translate source strings handed to `exec`.
    pub fn with_parser(mut self, parser: &'a dyn SourceParser) -> Self {
        self.parser = Some(parser);
        self
    }

    /// Translate a module. The preamble is not included.
    pub fn translate_module(mut self, name: &str, module: &Module) -> Result<TranslationUnit> {
        for stmt in &module.body {
            match &stmt.kind {
                StmtKind::FunctionDef(def) => {
                    self.scope.top_level_functions.insert(def.name.clone());
                }
                StmtKind::ClassDef(def) => {
                    self.scope.top_level_classes.insert(def.name.clone());
                }
                _ => {}
            }
        }

        let mut fragments = Vec::new();
        if let Some(doc) = &module.doc {
            fragments.push(doc_block(doc, ""));
        }
        for stmt in &module.body {
            self.module_stmt(stmt)?;
            let fragment = std::mem::take(&mut self.output);
            if !fragment.is_empty() {
                fragments.push(fragment);
            }
        }

        Ok(TranslationUnit {
            name: name.to_string(),
            fragments,
            imported_modules: self.dependencies.into_iter().collect(),
            raw_includes: self.raw_includes.into_iter().collect(),
        })
    }

    /// Translate a module as a standalone program, preamble first.
    pub fn translate_program(self, name: &str, module: &Module) -> Result<String> {
        let unit = self.translate_module(name, module)?;
        Ok(format!("{PREAMBLE}{}", unit.text()))
    }

    /// Translate a module body for embedding in `eval`, sharing this
    /// translator's registry and collaborators.
    pub(crate) fn translate_nested(&mut self, module: &Module) -> Result<String> {
        let nested = Translator {
            registry: &mut *self.registry,
            parser: self.parser,
            library_prefix: self.library_prefix,
            scope: ScopeContext::new(),
            output: String::new(),
            indent: 0,
            line: 0,
            dependencies: IndexSet::new(),
            raw_includes: IndexSet::new(),
        };
        let unit = nested.translate_module("<exec>", module)?;
        self.dependencies.extend(unit.imported_modules.iter().cloned());
        self.raw_includes.extend(unit.raw_includes.iter().cloned());
        Ok(unit.text())
    }

    fn module_stmt(&mut self, stmt: &Stmt) -> Result<()> {
        match &stmt.kind {
            StmtKind::Assign { targets, value } => {
                self.line = stmt.line;
                self.assign(targets, value, crate::stmt::Site::Module)
            }
            _ => self.stmt(stmt),
        }
    }

    // Output helpers

    pub(crate) fn indent_str(&self) -> String {
        INDENT.repeat(self.indent)
    }

    pub(crate) fn push_line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.output.push_str(INDENT);
        }
        self.output.push_str(text);
        self.output.push('\n');
    }

    pub(crate) fn push_raw(&mut self, text: &str) {
        self.output.push_str(text);
    }

    /// Run `render` against an empty buffer and return what it wrote.
    pub(crate) fn capture<F>(&mut self, render: F) -> Result<String>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let saved = std::mem::take(&mut self.output);
        let result = render(self);
        let captured = std::mem::replace(&mut self.output, saved);
        result.map(|()| captured)
    }

    /// Emit a `// py2php:` note and log it.
    pub(crate) fn diagnostic(&mut self, note: &str) {
        warn!(line = self.line, "{note}");
        self.push_line(&format!("// py2php: {note}"));
    }

    /// Emit a diagnostic followed by `render`'s output with every line
    /// commented out.
    pub(crate) fn commented_out<F>(&mut self, note: &str, render: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        self.diagnostic(note);
        let block = self.capture(render)?;
        let indent = self.indent_str();
        for line in block.lines() {
            let rest = line.strip_prefix(indent.as_str()).unwrap_or(line);
            self.output.push_str(&format!("{indent}// {rest}\n"));
        }
        Ok(())
    }

    pub(crate) fn unsupported(&self, message: impl Into<String>, node: &dyn Debug) -> TranslateError {
        TranslateError::UnsupportedConstruct {
            line: self.line,
            message: message.into(),
            node: format!("{node:?}"),
        }
    }

    pub(crate) fn classify(&self, name: &str) -> NameKind {
        self.scope.classify(name)
    }
}

/// Translate a module as a complete program with a fresh class registry.
pub fn translate_program(module: &Module) -> Result<String> {
    let mut registry = ClassRegistry::new();
    Translator::new(&mut registry).translate_program("__main__", module)
}

#[cfg(test)]
mod tests {
    use super::*;
    use py2php_ast::{Expr, FunctionDef, Params};

    #[test]
    fn test_program_starts_with_preamble() {
        let module = Module::new(vec![Stmt::assign(1, Expr::name("x"), Expr::int(1))]);
        let out = translate_program(&module).unwrap();
        assert!(out.starts_with(PREAMBLE));
        assert!(out.ends_with("$x = 1;\n"));
    }

    #[test]
    fn test_fragments_follow_statements() {
        let module = Module::new(vec![
            Stmt::pass(1),
            Stmt::assign(2, Expr::name("a"), Expr::int(1)),
            Stmt::function(3, FunctionDef::new("f", Params::default(), vec![])),
        ]);
        let mut registry = ClassRegistry::new();
        let unit = Translator::new(&mut registry)
            .translate_module("m", &module)
            .unwrap();
        assert_eq!(unit.fragments, vec!["$a = 1;\n", "function f() {\n}\n"]);
    }

    #[test]
    fn test_top_level_vars_recorded() {
        let module = Module::new(vec![Stmt::assign(1, Expr::name("count"), Expr::int(0))]);
        let mut registry = ClassRegistry::new();
        let mut translator = Translator::new(&mut registry);
        translator.module_stmt(&module.body[0]).unwrap();
        assert!(translator.scope.top_level_vars.contains("count"));
    }
}
