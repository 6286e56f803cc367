//! Statement translation.

use crate::builtins;
use crate::error::Result;
use crate::expr::use_concat;
use crate::function::FunctionKind;
use crate::scope::{NameKind, starts_uppercase};
use crate::text::{import_name, inline_comment};
use crate::translator::Translator;
use py2php_ast::{
    Alias, Arg, BinOp, Call, Constant, ExceptHandler, Expr, IfBranch, Stmt, StmtKind,
};
use tracing::{debug, warn};

/// Where an assignment appears; decides how a plain name target renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Site {
    Module,
    Local,
    Class,
}

/// Items-style iteration suffixes that mark dictionary iteration.
const DICT_ITERATION_SUFFIXES: &[&str] = &["->iteritems()", "->items()", "->iter()"];

/// Heuristic for dictionary iteration.
///
/// A rendered iterable ending in an items-style method call is iterated
/// as key/value pairs over the receiver itself. Returns the suffix to strip.
pub fn dict_iteration_suffix(iterable: &str) -> Option<&'static str> {
    DICT_ITERATION_SUFFIXES
        .iter()
        .copied()
        .find(|suffix| iterable.ends_with(suffix))
}

/// Name of the native-code escape, `PHP("...")`.
const NATIVE_ESCAPE: &str = "PHP";

const RERAISE: &str =
    "throw new Exception('py2php: python code would raise pre-existing exception here.');";

impl Translator<'_> {
    pub(crate) fn stmts(&mut self, body: &[Stmt]) -> Result<()> {
        for stmt in body {
            self.stmt(stmt)?;
        }
        Ok(())
    }

    /// Statements one level deeper.
    pub(crate) fn block(&mut self, body: &[Stmt]) -> Result<()> {
        self.indent += 1;
        let result = self.stmts(body);
        self.indent -= 1;
        result
    }

    pub(crate) fn stmt(&mut self, stmt: &Stmt) -> Result<()> {
        let outer = std::mem::replace(&mut self.line, stmt.line);
        let result = self.stmt_kind(stmt);
        self.line = outer;
        result
    }

    fn stmt_kind(&mut self, stmt: &Stmt) -> Result<()> {
        match &stmt.kind {
            StmtKind::FunctionDef(def) => self.function(def, FunctionKind::Free),
            StmtKind::ClassDef(def) => self.class(def),
            StmtKind::Assign { targets, value } => self.assign(targets, value, Site::Local),
            StmtKind::AugAssign { target, op, value } => self.aug_assign(target, *op, value),
            StmtKind::Expr { value } => self.discard(value),
            StmtKind::If { branches, orelse } => self.if_chain(stmt, branches, orelse.as_deref()),
            StmtKind::For {
                target,
                iter,
                body,
                orelse,
            } => self.for_loop(target, iter, body, orelse.as_deref()),
            StmtKind::While { test, body, orelse } => {
                let test = self.expr(test)?;
                self.push_line(&format!("while ({test}) {{"));
                self.block(body)?;
                self.push_line("}");
                self.loop_else(orelse.as_deref())
            }
            StmtKind::Return { value } => {
                let value = match value {
                    Some(value) => self.expr(value)?,
                    None => "null".to_string(),
                };
                if value == "null" {
                    self.push_line("return;");
                } else {
                    self.push_line(&format!("return {value};"));
                }
                Ok(())
            }
            StmtKind::Break => {
                self.push_line("break;");
                Ok(())
            }
            StmtKind::Continue => {
                self.push_line("continue;");
                Ok(())
            }
            StmtKind::Pass => Ok(()),
            StmtKind::Global { names } => {
                self.scope.declare_globals(names);
                let names = names
                    .iter()
                    .map(|n| format!("${n}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                self.push_line(&format!("global {names};"));
                Ok(())
            }
            StmtKind::Import { names } => {
                self.import(names);
                Ok(())
            }
            StmtKind::ImportFrom { module, names } => {
                self.import_from(module, names);
                Ok(())
            }
            StmtKind::Raise { exc } => self.raise(exc.as_ref()),
            StmtKind::Try {
                body,
                handlers,
                orelse,
                finalbody,
            } => self.try_block(body, handlers, orelse.as_deref(), finalbody.as_deref()),
            StmtKind::With {
                context,
                var,
                body,
            } => {
                self.diagnostic(
                    "\"with\" has no PHP equivalent; the context manager is neither entered nor exited.",
                );
                let context = self.expr(context)?;
                match var {
                    Some(var) => {
                        let target = self.store_target(var)?;
                        self.push_line(&format!("{target} = {context};"));
                    }
                    None => self.push_line(&format!("{context};")),
                }
                self.stmts(body)
            }
            StmtKind::Assert { test, msg } => {
                let test = self.expr(test)?;
                match msg {
                    Some(msg) => {
                        let msg = self.expr(msg)?;
                        self.push_line(&format!("assert({test}, {msg});"));
                    }
                    None => self.push_line(&format!("assert({test});")),
                }
                Ok(())
            }
            StmtKind::Print { values, newline } => {
                let func = if *newline {
                    "pyjslib_printnl"
                } else {
                    "pyjslib_print"
                };
                let args = match values.as_slice() {
                    [single] => self.expr(single)?,
                    values => format!("[{}], true", self.joined(values, ", ")?),
                };
                self.push_line(&format!("{func}({args});"));
                Ok(())
            }
            StmtKind::Exec { code } => self.exec(code),
            StmtKind::Delete { targets } => {
                for target in targets {
                    self.delete(target)?;
                }
                Ok(())
            }
        }
    }

    pub(crate) fn assign(&mut self, targets: &[Expr], value: &Expr, site: Site) -> Result<()> {
        match targets {
            [] => Err(self.unsupported("assignment without a target", value)),
            [target] => self.assign_one(target, value, site),
            targets => {
                let temp = Expr::name(format!("__temp{}", self.line));
                self.assign_one(&temp, value, site)?;
                for target in targets {
                    self.assign_one(target, &temp, site)?;
                }
                Ok(())
            }
        }
    }

    fn assign_one(&mut self, target: &Expr, value: &Expr, site: Site) -> Result<()> {
        if let Expr::Slice {
            value: seq,
            lower,
            upper,
            ..
        } = target
        {
            let seq = self.expr(seq)?;
            let offset = match lower {
                Some(lower) => self.expr(lower)?,
                None => "0".to_string(),
            };
            let mut length = match upper {
                Some(upper) => self.expr(upper)?,
                None => format!("count({seq})"),
            };
            if offset != "0" {
                length = format!("{length} - {offset}");
            }
            let rhs = self.expr(value)?;
            self.push_line(&format!("array_splice({seq}, {offset}, {length}, {rhs});"));
            return Ok(());
        }

        let lhs = match (target, site) {
            (Expr::Name { id }, Site::Class) => format!("public ${id}"),
            (Expr::Name { id }, Site::Module) => {
                self.scope.top_level_vars.insert(id.clone());
                self.store_target(target)?
            }
            _ => self.store_target(target)?,
        };
        let rhs = self.expr(value)?;
        self.push_line(&format!("{lhs} = {rhs};"));
        Ok(())
    }

    /// Left-hand side of an assignment.
    pub(crate) fn store_target(&mut self, target: &Expr) -> Result<String> {
        match target {
            Expr::Name { id } => Ok(match self.classify(id) {
                NameKind::This => "$this".to_string(),
                _ => format!("${id}"),
            }),
            Expr::Attribute { value, attr } => self.attribute(value, attr),
            Expr::Subscript { value, keys, .. } => {
                let [key] = keys.as_slice() else {
                    return Err(self.unsupported("subscript with more than one key", target));
                };
                if matches!(key, Expr::SliceObj { .. }) {
                    return Err(self.unsupported("assignment to an extended slice", target));
                }
                let seq = self.expr(value)?;
                let index = self.expr(key)?;
                Ok(format!("{seq}[{index}]"))
            }
            Expr::Tuple { elts } | Expr::List { elts } => {
                let parts = elts
                    .iter()
                    .map(|e| self.store_target(e))
                    .collect::<Result<Vec<_>>>()?;
                Ok(format!("list({})", parts.join(", ")))
            }
            other => Err(self.unsupported(
                format!("cannot assign to `{}`", other.kind_name()),
                other,
            )),
        }
    }

    fn aug_assign(&mut self, target: &Expr, op: BinOp, value: &Expr) -> Result<()> {
        let lhs = self.store_target(target)?;
        let rhs = self.expr(value)?;
        let line = match op {
            BinOp::Add if use_concat(value) => format!("{lhs} .= {rhs};"),
            BinOp::FloorDiv => format!("{lhs} = floor({lhs} / {rhs});"),
            op => {
                let symbol = match op {
                    BinOp::Add => "+=",
                    BinOp::Sub => "-=",
                    BinOp::Mul => "*=",
                    BinOp::Div | BinOp::FloorDiv => "/=",
                    BinOp::Mod => "%=",
                    BinOp::Pow => "**=",
                    BinOp::LShift => "<<=",
                    BinOp::RShift => ">>=",
                    BinOp::BitAnd => "&=",
                    BinOp::BitOr => "|=",
                    BinOp::BitXor => "^=",
                };
                format!("{lhs} {symbol} {rhs};")
            }
        };
        self.push_line(&line);
        Ok(())
    }

    /// Expression statement.
    fn discard(&mut self, value: &Expr) -> Result<()> {
        match value {
            Expr::Call(call) if is_native_escape(call) => {
                let [Arg::Positional {
                    value:
                        Expr::Const {
                            value: Constant::Str(code),
                        },
                }] = call.args.as_slice()
                else {
                    return Err(self.unsupported(
                        "native code escape takes a single string literal",
                        value,
                    ));
                };
                self.push_line(code);
            }
            Expr::Const {
                value: Constant::Str(text),
            } => self.push_line(&inline_comment(text)),
            Expr::Const {
                value: Constant::None,
            } => {}
            Expr::Name { id } if id == "XXX" => self.push_line("// XXX"),
            other => {
                let text = self.expr(other)?;
                self.push_line(&format!("{text};"));
            }
        }
        Ok(())
    }

    fn if_chain(&mut self, stmt: &Stmt, branches: &[IfBranch], orelse: Option<&[Stmt]>) -> Result<()> {
        if branches.is_empty() {
            return Err(self.unsupported("if statement without a condition", stmt));
        }
        for (i, branch) in branches.iter().enumerate() {
            let keyword = if i == 0 { "if" } else { "else if" };
            let test = self.expr(&branch.test)?;
            self.push_line(&format!("{keyword} ({test}) {{"));
            self.block(&branch.body)?;
            self.push_line("}");
        }
        if let Some(orelse) = orelse {
            self.push_line("else {");
            self.block(orelse)?;
            self.push_line("}");
        }
        Ok(())
    }

    fn for_loop(
        &mut self,
        target: &Expr,
        iter: &Expr,
        body: &[Stmt],
        orelse: Option<&[Stmt]>,
    ) -> Result<()> {
        let enumerated = enumerate_source(target, iter);
        let (mut iterable, mut pairs) = match enumerated {
            Some(source) => (self.expr(source)?, true),
            None => (self.expr(iter)?, false),
        };
        if !pairs && let Some(suffix) = dict_iteration_suffix(&iterable) {
            iterable.truncate(iterable.len() - suffix.len());
            pairs = true;
        }

        let mut rebind = None;
        let binding = match target {
            Expr::Name { id } if pairs => {
                rebind = Some(format!("${id} = [$__key, $__value];"));
                "$__key => $__value".to_string()
            }
            Expr::Name { id } => format!("${id}"),
            Expr::Tuple { elts } | Expr::List { elts } if pairs && elts.len() == 2 => {
                let key = self.loop_target(&elts[0])?;
                let value = self.loop_target(&elts[1])?;
                format!("{key} => {value}")
            }
            Expr::Tuple { .. } | Expr::List { .. } => self.loop_target(target)?,
            other => {
                return Err(self.unsupported(
                    format!("loop target of kind `{}`", other.kind_name()),
                    other,
                ));
            }
        };

        self.push_line(&format!("foreach( pyjslib_list({iterable}) as {binding} ) {{"));
        self.indent += 1;
        if let Some(rebind) = rebind {
            self.push_line(&rebind);
        }
        let result = self.stmts(body);
        self.indent -= 1;
        result?;
        self.push_line("}");
        self.loop_else(orelse)
    }

    fn loop_else(&mut self, orelse: Option<&[Stmt]>) -> Result<()> {
        let Some(orelse) = orelse else {
            return Ok(());
        };
        self.commented_out("loop else clause is not supported in PHP.", |t| {
            t.push_line("else {");
            t.block(orelse)?;
            t.push_line("}");
            Ok(())
        })
    }

    fn import(&mut self, names: &[Alias]) {
        let shim = format!("__{}__", self.library_prefix);
        for alias in names {
            let name = alias.name.as_str();
            if name == shim {
                continue;
            }
            if name.ends_with(".php") {
                debug!(include = name, "Queued raw include");
                self.raw_includes.insert(name.to_string());
                continue;
            }
            self.scope
                .imported_modules
                .insert(alias.bound_name().to_string());
            let module = self.library_module(name);
            self.dependencies.insert(module);
            self.push_line(&format!("require_once( '{}.php');", import_name(name)));
        }
    }

    fn import_from(&mut self, module: &str, names: &[Alias]) {
        if module == format!("__{}__", self.library_prefix) {
            return;
        }
        if module == self.library_prefix {
            for alias in names {
                self.scope
                    .imported_modules
                    .insert(alias.bound_name().to_string());
                self.dependencies.insert(alias.name.clone());
                self.push_line(&format!("require_once( '{}.php');", import_name(&alias.name)));
            }
            return;
        }

        let source = self.library_module(module);
        self.scope.imported_modules.insert(module.to_string());
        for alias in names.iter().filter(|a| a.name != "*") {
            self.scope
                .imported_classes
                .insert(alias.bound_name().to_string(), source.clone());
        }
        self.dependencies.insert(source.clone());
        self.push_line(&format!("require_once( '{}.php');", import_name(&source)));
    }

    /// Module name relative to the library namespace.
    fn library_module(&self, name: &str) -> String {
        let namespace = format!("{}.", self.library_prefix);
        name.strip_prefix(namespace.as_str())
            .unwrap_or(name)
            .to_string()
    }

    fn raise(&mut self, exc: Option<&Expr>) -> Result<()> {
        let line = match exc {
            None => RERAISE.to_string(),
            Some(Expr::Call(call)) => match call.func.as_ref() {
                Expr::Name { id }
                    if !self.scope.is_function(id) && builtins::rewrite(id).is_none() =>
                {
                    format!("throw {};", self.constructor_call(call, id)?)
                }
                _ => format!("throw {};", self.call(call)?),
            },
            Some(Expr::Name { id })
                if self.classify(id) == NameKind::Class || starts_uppercase(id) =>
            {
                format!("throw new {id}();")
            }
            Some(other) => format!("throw {};", self.expr(other)?),
        };
        self.push_line(&line);
        Ok(())
    }

    fn try_block(
        &mut self,
        body: &[Stmt],
        handlers: &[ExceptHandler],
        orelse: Option<&[Stmt]>,
        finalbody: Option<&[Stmt]>,
    ) -> Result<()> {
        self.push_line("try {");
        self.block(body)?;
        self.push_line("}");

        for handler in handlers {
            let types = match &handler.type_ {
                None => "Exception".to_string(),
                Some(Expr::Tuple { elts }) => elts
                    .iter()
                    .map(|e| self.exception_type(e))
                    .collect::<Result<Vec<_>>>()?
                    .join(" | "),
                Some(ty) => self.exception_type(ty)?,
            };
            let var = handler.name.as_deref().unwrap_or("e");
            self.push_line(&format!("catch({types} ${var}) {{"));
            self.block(&handler.body)?;
            self.push_line("}");
        }

        if let Some(orelse) = orelse {
            self.commented_out("else block not supported in PHP.", |t| {
                t.push_line("else {");
                t.block(orelse)?;
                t.push_line("}");
                Ok(())
            })?;
        }

        if let Some(finalbody) = finalbody {
            self.push_line("finally {");
            self.block(finalbody)?;
            self.push_line("}");
        }
        Ok(())
    }

    fn exception_type(&self, ty: &Expr) -> Result<String> {
        match ty {
            Expr::Name { id } => Ok(id.clone()),
            Expr::Attribute { attr, .. } => Ok(attr.clone()),
            other => Err(self.unsupported(
                format!("exception type of kind `{}`", other.kind_name()),
                other,
            )),
        }
    }

    fn exec(&mut self, code: &Expr) -> Result<()> {
        let Expr::Const {
            value: Constant::Str(source),
        } = code
        else {
            let code = self.expr(code)?;
            self.push_line(&format!("eval({code});"));
            return Ok(());
        };

        let parsed = match self.parser {
            Some(parser) => match parser.parse_str(source) {
                Ok(module) => Some(module),
                Err(err) => {
                    warn!(line = self.line, error = %err, "exec source did not parse");
                    None
                }
            },
            None => None,
        };
        let translated = match parsed {
            Some(module) => match self.translate_nested(&module) {
                Ok(text) => Some(text),
                Err(err) => {
                    warn!(line = self.line, error = %err, "exec source did not translate");
                    None
                }
            },
            None => None,
        };

        match translated {
            Some(text) => self.push_eval(text.trim()),
            None => {
                self.push_line(
                    "/* py2php: could not translate this code, using original input string */",
                );
                self.push_eval(source.trim());
            }
        }
        Ok(())
    }

    fn push_eval(&mut self, code: &str) {
        if code.contains(['\'', '\\', '\n']) {
            self.push_line("eval( <<< 'PY2PHP_EVAL_END'");
            self.push_raw(&format!("{code}\nPY2PHP_EVAL_END\n"));
            self.push_line(");");
        } else {
            self.push_line(&format!("eval('{code}');"));
        }
    }

    fn delete(&mut self, target: &Expr) -> Result<()> {
        match target {
            Expr::Name { .. } | Expr::Attribute { .. } => {
                let target = self.store_target(target)?;
                self.push_line(&format!("unset({target});"));
            }
            Expr::Subscript { keys, .. } => {
                if let [Expr::SliceObj { .. }] = keys.as_slice() {
                    return Err(self.unsupported("deletion of an extended slice", target));
                }
                let target = self.store_target(target)?;
                self.push_line(&format!("unset({target});"));
            }
            Expr::Slice {
                value,
                lower,
                upper,
                ..
            } => {
                let seq = self.expr(value)?;
                let lower = match lower {
                    Some(lower) => self.expr(lower)?,
                    None => "null".to_string(),
                };
                let upper = match upper {
                    Some(upper) => self.expr(upper)?,
                    None => "null".to_string(),
                };
                self.push_line(&format!("pyjslib_del_slice({seq}, {lower}, {upper});"));
            }
            Expr::Tuple { elts } | Expr::List { elts } => {
                for elt in elts {
                    self.delete(elt)?;
                }
            }
            other => {
                return Err(self.unsupported(
                    format!("cannot delete `{}`", other.kind_name()),
                    other,
                ));
            }
        }
        Ok(())
    }
}

fn is_native_escape(call: &Call) -> bool {
    matches!(call.func.as_ref(), Expr::Name { id } if id == NATIVE_ESCAPE)
}

/// The sequence behind `for i, x in enumerate(seq)`.
fn enumerate_source<'e>(target: &Expr, iter: &'e Expr) -> Option<&'e Expr> {
    let (Expr::Tuple { elts } | Expr::List { elts }) = target else {
        return None;
    };
    if elts.len() != 2 {
        return None;
    }
    let Expr::Call(call) = iter else {
        return None;
    };
    if !matches!(call.func.as_ref(), Expr::Name { id } if id == "enumerate")
        || call.star_args.is_some()
        || call.dstar_args.is_some()
    {
        return None;
    }
    match call.args.as_slice() {
        [Arg::Positional { value }] => Some(value),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dict_iteration_suffix() {
        assert_eq!(dict_iteration_suffix("$d->items()"), Some("->items()"));
        assert_eq!(dict_iteration_suffix("$d->iteritems()"), Some("->iteritems()"));
        assert_eq!(dict_iteration_suffix("$xs"), None);
        assert_eq!(dict_iteration_suffix("$d->values()"), None);
    }

    #[test]
    fn test_enumerate_source() {
        let target = Expr::tuple(vec![Expr::name("i"), Expr::name("x")]);
        let iter = Expr::call(Expr::name("enumerate"), vec![Expr::name("xs")]);
        assert_eq!(enumerate_source(&target, &iter), Some(&Expr::name("xs")));
        assert_eq!(enumerate_source(&Expr::name("p"), &iter), None);
    }
}
