//! Function and method definitions.

use crate::error::Result;
use crate::scope::{Receiver, ReceiverKind};
use crate::text::doc_block;
use crate::translator::Translator;
use py2php_ast::{Expr, FunctionDef, Param, Params};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FunctionKind {
    Free,
    Instance,
    Static,
    /// `@classmethod`: static in PHP, first parameter aliases `static`.
    ClassMethod,
}

impl Translator<'_> {
    pub(crate) fn function(&mut self, def: &FunctionDef, kind: FunctionKind) -> Result<()> {
        let name = if kind != FunctionKind::Free && def.name == "__init__" {
            "__construct"
        } else {
            def.name.as_str()
        };

        if kind == FunctionKind::Free {
            for decorator in &def.decorators {
                self.dropped_decorator(decorator);
            }
        }
        if let Some(doc) = &def.doc {
            let block = doc_block(doc, &self.indent_str());
            self.push_raw(&block);
        }

        let receiver_kind = match kind {
            FunctionKind::Instance => Some(ReceiverKind::Instance),
            FunctionKind::ClassMethod => Some(ReceiverKind::Class),
            FunctionKind::Free | FunctionKind::Static => None,
        };
        let receiver = receiver_kind.and_then(|kind| {
            def.params.first_name().map(|name| Receiver {
                name: name.to_string(),
                kind,
            })
        });
        let skip = usize::from(receiver_kind.is_some());
        let params = self.params(&def.params, skip)?;
        let prefix = match kind {
            FunctionKind::Static | FunctionKind::ClassMethod => "static ",
            FunctionKind::Free | FunctionKind::Instance => "",
        };
        self.push_line(&format!("{prefix}function {name}({params}) {{"));

        match kind {
            FunctionKind::Free => {
                self.scope.declare_local_function(&def.name);
                self.scope.enter_function();
            }
            _ => self.scope.enter_method(receiver),
        }
        let result = self.block(&def.body);
        self.scope.exit_function();
        result?;
        self.push_line("}");
        Ok(())
    }

    /// A method inside a class body; decorators pick the method kind.
    pub(crate) fn method(&mut self, def: &FunctionDef) -> Result<()> {
        let mut kind = FunctionKind::Instance;
        for decorator in &def.decorators {
            match decorator {
                Expr::Name { id } if id == "staticmethod" => kind = FunctionKind::Static,
                Expr::Name { id } if id == "classmethod" => kind = FunctionKind::ClassMethod,
                other => self.dropped_decorator(other),
            }
        }
        self.function(def, kind)
    }

    fn dropped_decorator(&mut self, decorator: &Expr) {
        let name = dotted_name(decorator).unwrap_or_else(|| decorator.kind_name().to_string());
        self.diagnostic(&format!(
            "decorator @{name} is not supported in PHP and was dropped."
        ));
    }

    /// PHP parameter list. `skip` leading parameters are omitted (the
    /// receiver of a method).
    pub(crate) fn params(&mut self, params: &Params, skip: usize) -> Result<String> {
        let Some(first_default) = params.args.len().checked_sub(params.defaults.len()) else {
            return Err(self.unsupported("more defaults than parameters", params));
        };
        let mut out = Vec::with_capacity(params.args.len() + 2);
        for (i, param) in params.args.iter().enumerate().skip(skip) {
            match param {
                Param::Name(name) if i >= first_default => {
                    let default = self.expr(&params.defaults[i - first_default])?;
                    out.push(format!("${name} = {default}"));
                }
                Param::Name(name) => out.push(format!("${name}")),
                Param::Tuple(inner) => flatten_params(inner, &mut out),
            }
        }
        if let Some(kwarg) = &params.kwarg {
            out.push(format!("${kwarg} = []"));
        }
        if let Some(vararg) = &params.vararg {
            out.push(format!("...${vararg}"));
        }
        Ok(out.join(", "))
    }
}

fn flatten_params(params: &[Param], out: &mut Vec<String>) {
    for param in params {
        match param {
            Param::Name(name) => out.push(format!("${name}")),
            Param::Tuple(inner) => flatten_params(inner, out),
        }
    }
}

/// `a.b.c` for a name or attribute chain; `f(...)` for a call on one.
pub(crate) fn dotted_name(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Name { id } => Some(id.clone()),
        Expr::Attribute { value, attr } => Some(format!("{}.{attr}", dotted_name(value)?)),
        Expr::Call(call) => Some(format!("{}(...)", dotted_name(&call.func)?)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ClassRegistry;

    fn params_of(params: &Params, skip: usize) -> String {
        let mut registry = ClassRegistry::new();
        Translator::new(&mut registry).params(params, skip).unwrap()
    }

    #[test]
    fn test_params_defaults_align_with_tail() {
        let params = Params::positional(&["a", "b", "c"])
            .with_defaults(vec![Expr::int(1), Expr::str("x")]);
        assert_eq!(params_of(&params, 0), "$a, $b = 1, $c = 'x'");
    }

    #[test]
    fn test_params_variadic_groups() {
        let params = Params::positional(&["self", "a"])
            .with_vararg("args")
            .with_kwarg("opts");
        assert_eq!(params_of(&params, 1), "$a, $opts = [], ...$args");
    }

    #[test]
    fn test_params_tuple_flattened() {
        let params = Params {
            args: vec![
                Param::Name("a".into()),
                Param::Tuple(vec![Param::Name("b".into()), Param::Name("c".into())]),
            ],
            ..Params::default()
        };
        assert_eq!(params_of(&params, 0), "$a, $b, $c");
    }

    #[test]
    fn test_too_many_defaults() {
        let params = Params::positional(&["a"]).with_defaults(vec![Expr::int(1), Expr::int(2)]);
        let mut registry = ClassRegistry::new();
        assert!(Translator::new(&mut registry).params(&params, 0).is_err());
    }

    #[test]
    fn test_dotted_name() {
        let decorator = Expr::call(Expr::attr(Expr::name("functools"), "wraps"), vec![]);
        assert_eq!(dotted_name(&decorator).as_deref(), Some("functools.wraps(...)"));
        assert_eq!(dotted_name(&Expr::int(1)), None);
    }
}
