//! Class definitions.

use crate::error::Result;
use crate::stmt::Site;
use crate::text::doc_block;
use crate::translator::Translator;
use py2php_ast::{ClassDef, Constant, Expr, StmtKind};
use tracing::warn;

impl Translator<'_> {
    pub(crate) fn class(&mut self, def: &ClassDef) -> Result<()> {
        let mut bases = Vec::with_capacity(def.bases.len());
        let mut decorations = Vec::new();
        for base in &def.bases {
            match base {
                Expr::Name { id } if id == "object" => bases.push("stdClass".to_string()),
                Expr::Name { id } => bases.push(id.clone()),
                Expr::Attribute { attr, .. } => bases.push(attr.clone()),
                Expr::Call(call) => decorations.push(self.call(call)?),
                other => {
                    return Err(self.unsupported(
                        format!("class base of kind `{}`", other.kind_name()),
                        other,
                    ));
                }
            }
        }

        let methods = def
            .body
            .iter()
            .filter_map(|stmt| match &stmt.kind {
                StmtKind::FunctionDef(f) if f.name == "__init__" => Some("__construct".to_string()),
                StmtKind::FunctionDef(f) => Some(f.name.clone()),
                _ => None,
            })
            .collect();
        let base = match bases.as_slice() {
            [single] => Some(single.clone()),
            _ => None,
        };
        self.registry.define(&def.name, base.clone(), methods);

        for decoration in &decorations {
            warn!(line = self.line, class = %def.name, "Dropped call expression in class bases");
            self.push_line("/* py2php: a call in the base list decorates the class at runtime,");
            self.push_line(" * which PHP does not support. It was left out of the class header:");
            self.push_line(&format!(" * {decoration}"));
            self.push_line(" */");
        }
        if bases.len() > 1 {
            warn!(line = self.line, class = %def.name, "Multiple inheritance flattened");
            let names = bases.join(", ");
            self.push_line("/* py2php: PHP does not support multiple inheritance.");
            self.push_line(&format!(" * Bases: {names}"));
            self.push_line(" * Consider composition, or turn the bases into traits and add:");
            self.push_line(&format!(" *   use {names};"));
            self.push_line(" */");
        }
        if let Some(doc) = &def.doc {
            let block = doc_block(doc, &self.indent_str());
            self.push_raw(&block);
        }
        match &base {
            Some(base) => self.push_line(&format!("class {} extends {base} {{", def.name)),
            None => self.push_line(&format!("class {} {{", def.name)),
        }

        self.indent += 1;
        let result = self.class_body(def);
        self.indent -= 1;
        result?;
        self.push_line("}");
        Ok(())
    }

    fn class_body(&mut self, def: &ClassDef) -> Result<()> {
        for stmt in &def.body {
            self.line = stmt.line;
            match &stmt.kind {
                StmtKind::Pass => {}
                StmtKind::FunctionDef(f) => self.method(f)?,
                StmtKind::Assign { targets, value } => self.assign(targets, value, Site::Class)?,
                StmtKind::Expr {
                    value:
                        Expr::Const {
                            value: Constant::Str(text),
                        },
                } => {
                    for line in text.trim().lines() {
                        self.push_line(&format!("// {}", line.trim_end()));
                    }
                }
                _ => self.commented_out(
                    "python allows arbitrary statements in a class body but PHP does not; commenting out this code block.",
                    |t| t.stmt(stmt),
                )?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ClassRegistry;
    use py2php_ast::{FunctionDef, Module, Params, Stmt};

    fn translate(module: &Module, registry: &mut ClassRegistry) -> String {
        Translator::new(registry)
            .translate_module("m", module)
            .unwrap()
            .text()
    }

    #[test]
    fn test_class_registers_methods() {
        let class = ClassDef::new(
            "Counter",
            vec![Expr::name("object")],
            vec![
                Stmt::function(2, FunctionDef::new("__init__", Params::positional(&["self"]), vec![])),
                Stmt::function(3, FunctionDef::new("bump", Params::positional(&["self"]), vec![])),
            ],
        );
        let mut registry = ClassRegistry::new();
        let out = translate(&Module::new(vec![Stmt::class(1, class)]), &mut registry);
        assert!(out.starts_with("class Counter extends stdClass {\n"));
        let info = registry.get("Counter").unwrap();
        assert_eq!(info.methods, vec!["__construct", "bump"]);
        assert_eq!(info.base.as_deref(), Some("stdClass"));
    }

    #[test]
    fn test_unsupported_base_kind() {
        let class = ClassDef::new("Odd", vec![Expr::int(3)], vec![]);
        let mut registry = ClassRegistry::new();
        let err = Translator::new(&mut registry)
            .translate_module("m", &Module::new(vec![Stmt::class(1, class)]))
            .unwrap_err();
        assert!(err.to_string().contains("class base of kind `const`"));
    }
}
