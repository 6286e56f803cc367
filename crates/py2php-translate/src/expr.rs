//! Expression translation.

use crate::builtins;
use crate::error::Result;
use crate::scope::NameKind;
use crate::text::{constant, import_name};
use crate::translator::Translator;
use py2php_ast::{BinOp, CmpOp, Comparison, Comprehension, Constant, Expr, ExprContext, UnaryOp};

/// Whether `+` between these operands should be string concatenation.
///
/// String literals, names that look like strings or buffers, and sums
/// containing either are treated as text.
pub fn use_concat(expr: &Expr) -> bool {
    match expr {
        Expr::Const {
            value: Constant::Str(_),
        } => true,
        Expr::Name { id } => {
            let lower = id.to_lowercase();
            lower.contains("str") || lower.contains("buf")
        }
        Expr::BinOp {
            left,
            op: BinOp::Add,
            right,
        } => use_concat(left) || use_concat(right),
        _ => false,
    }
}

impl Translator<'_> {
    pub(crate) fn expr(&mut self, expr: &Expr) -> Result<String> {
        match expr {
            Expr::Const { value } => Ok(constant(value)),
            Expr::Name { id } => self.name(id),
            Expr::Attribute { value, attr } => self.attribute(value, attr),
            Expr::Subscript { value, keys, ctx } => self.subscript(expr, value, keys, *ctx),
            Expr::Slice {
                value,
                lower,
                upper,
                ctx,
            } => self.slice(expr, value, lower.as_deref(), upper.as_deref(), *ctx),
            Expr::SliceObj { .. } => Err(self.unsupported("extended slice outside a subscript", expr)),
            Expr::Call(call) => self.call(call),
            Expr::BinOp { left, op, right } => self.bin_op(left, *op, right),
            Expr::BitAnd { operands } => self.joined(operands, " & "),
            Expr::BitOr { operands } => self.joined(operands, " | "),
            Expr::BitXor { operands } => self.joined(operands, " ^ "),
            Expr::And { operands } => self.bool_op(operands, " && "),
            Expr::Or { operands } => self.bool_op(operands, " || "),
            Expr::Not { operand } => Ok(format!("!({})", self.expr(operand)?)),
            Expr::Unary { op, operand } => {
                let operand = self.expr(operand)?;
                Ok(match op {
                    UnaryOp::Neg => format!("-{operand}"),
                    UnaryOp::Pos => format!("+{operand}"),
                    UnaryOp::Invert => format!("~{operand}"),
                })
            }
            Expr::Compare { left, comparators } => self.compare(expr, left, comparators),
            Expr::List { elts } | Expr::Tuple { elts } => Ok(format!("[{}]", self.joined(elts, ", ")?)),
            Expr::Dict { items } => {
                let mut pairs = Vec::with_capacity(items.len());
                for item in items {
                    let key = self.expr(&item.key)?;
                    let value = self.expr(&item.value)?;
                    pairs.push(format!("{key} => {value}"));
                }
                Ok(format!("[{}]", pairs.join(", ")))
            }
            Expr::Lambda { params, body } => {
                let params = self.params(params, 0)?;
                Ok(format!("fn({params}) => {}", self.expr(body)?))
            }
            Expr::IfExp { test, body, orelse } => {
                let test = self.expr(test)?;
                let body = self.expr(body)?;
                let orelse = self.expr(orelse)?;
                Ok(format!("({test} ? {body} : {orelse})"))
            }
            Expr::ListComp { elt, generators } => {
                self.comprehension("pyjslib_listcomp", elt, generators)
            }
            Expr::GenExpr { elt, generators } => {
                self.comprehension("pyjslib_genexpr", elt, generators)
            }
            Expr::Backquote { value } => Ok(format!("pyjslib_repr({})", self.expr(value)?)),
            Expr::Yield { value } => match value {
                Some(value) => Ok(format!("yield({})", self.expr(value)?)),
                None => Ok("yield".to_string()),
            },
        }
    }

    pub(crate) fn joined(&mut self, exprs: &[Expr], sep: &str) -> Result<String> {
        let parts = exprs
            .iter()
            .map(|e| self.expr(e))
            .collect::<Result<Vec<_>>>()?;
        Ok(parts.join(sep))
    }

    pub(crate) fn name(&self, id: &str) -> Result<String> {
        self.classify(id).render(id).ok_or_else(|| {
            self.unsupported(
                format!("module `{id}` has no PHP value outside a call or attribute access"),
                &Expr::name(id),
            )
        })
    }

    /// Attribute read: `$obj->x`, `Cls::$x`, `module::x`.
    pub(crate) fn attribute(&mut self, value: &Expr, attr: &str) -> Result<String> {
        match value {
            Expr::Name { id } => match self.classify(id) {
                NameKind::Module => Ok(format!("{}::{attr}", import_name(id))),
                NameKind::Class => Ok(format!("{id}::${attr}")),
                NameKind::Static => Ok(format!("static::${attr}")),
                kind => Ok(format!("{}->{attr}", kind.render(id).unwrap_or_default())),
            },
            Expr::Attribute {
                value: inner,
                attr: mid,
            } => {
                if let Expr::Name { id } = inner.as_ref() {
                    let dotted = format!("{id}.{mid}");
                    if self.scope.is_module(&dotted) {
                        return Ok(format!("{}::{attr}", import_name(&dotted)));
                    }
                }
                Ok(format!("{}->{attr}", self.attribute(inner, mid)?))
            }
            other => Ok(format!("{}->{attr}", self.expr(other)?)),
        }
    }

    /// An expression in a position where PHP expects a callable.
    pub(crate) fn callable_ref(&mut self, expr: &Expr) -> Result<String> {
        match expr {
            Expr::Name { id } => {
                if let Some(builtin) = builtins::rewrite(id) {
                    return Ok(format!("'{}'", builtin.php));
                }
                if self.scope.is_function(id) || builtins::is_passthrough(id) {
                    return Ok(format!("'{id}'"));
                }
                match self.classify(id) {
                    NameKind::Class => Ok(format!("'{id}'")),
                    _ => self.name(id),
                }
            }
            Expr::Attribute { value, attr } => {
                let receiver = match value.as_ref() {
                    Expr::Name { id } => match self.classify(id) {
                        NameKind::Module => format!("'{}'", import_name(id)),
                        NameKind::Class => format!("'{id}'"),
                        NameKind::Static => "static::class".to_string(),
                        _ => self.name(id)?,
                    },
                    other => self.expr(other)?,
                };
                Ok(format!("[{receiver}, '{attr}']"))
            }
            other => self.expr(other),
        }
    }

    fn subscript(
        &mut self,
        node: &Expr,
        value: &Expr,
        keys: &[Expr],
        ctx: ExprContext,
    ) -> Result<String> {
        let [key] = keys else {
            return Err(self.unsupported("subscript with more than one key", node));
        };
        let target = self.expr(value)?;
        if let Expr::SliceObj { parts } = key {
            let parts = self.slice_obj(node, parts)?;
            return Ok(format!("pyjslib_array_slice({target}, {parts})"));
        }
        let index = self.expr(key)?;
        Ok(match ctx {
            ExprContext::Del => format!("unset({target}[{index}])"),
            ExprContext::Load | ExprContext::Store => format!("{target}[{index}]"),
        })
    }

    fn slice_obj(&mut self, node: &Expr, parts: &[Expr]) -> Result<String> {
        if parts.len() > 3 {
            return Err(self.unsupported("extended slice with more than three parts", node));
        }
        let mut rendered = Vec::with_capacity(3);
        for i in 0..3 {
            match parts.get(i) {
                Some(part) => rendered.push(self.expr(part)?),
                None if i == 2 => rendered.push("1".to_string()),
                None => rendered.push("null".to_string()),
            }
        }
        Ok(rendered.join(", "))
    }

    fn slice(
        &mut self,
        node: &Expr,
        value: &Expr,
        lower: Option<&Expr>,
        upper: Option<&Expr>,
        ctx: ExprContext,
    ) -> Result<String> {
        let target = self.expr(value)?;
        let lower = lower.map(|e| self.expr(e)).transpose()?;
        let upper = upper.map(|e| self.expr(e)).transpose()?;
        match ctx {
            ExprContext::Load => {
                let length = match (&lower, upper) {
                    (Some(lower), Some(upper)) => format!("{upper} - {lower}"),
                    (None, Some(upper)) => upper,
                    (_, None) => "null".to_string(),
                };
                let offset = lower.unwrap_or_else(|| "0".to_string());
                Ok(format!("array_slice({target}, {offset}, {length})"))
            }
            ExprContext::Del => Ok(format!(
                "pyjslib_del_slice({target}, {}, {})",
                lower.unwrap_or_else(|| "null".to_string()),
                upper.unwrap_or_else(|| "null".to_string())
            )),
            ExprContext::Store => {
                Err(self.unsupported("slice assignment inside an expression", node))
            }
        }
    }

    fn bin_op(&mut self, left: &Expr, op: BinOp, right: &Expr) -> Result<String> {
        if op == BinOp::Mod
            && let Expr::Const {
                value: Constant::Str(_),
            } = left
        {
            let format = self.expr(left)?;
            let args = match right {
                Expr::Tuple { elts } => self.joined(elts, ", ")?,
                other => self.expr(other)?,
            };
            return Ok(format!("sprintf({format}, {args})"));
        }

        let l = self.expr(left)?;
        let r = self.expr(right)?;
        Ok(match op {
            BinOp::Add if use_concat(left) || use_concat(right) => format!("{l} . {r}"),
            BinOp::Add => format!("({l} + {r})"),
            BinOp::Sub => format!("({l} - {r})"),
            BinOp::Mul => format!("({l} * {r})"),
            BinOp::Div => format!("({l} / {r})"),
            BinOp::FloorDiv => format!("floor({l} / {r})"),
            BinOp::Mod => format!("({l} % {r})"),
            BinOp::Pow => format!("pow({l}, {r})"),
            BinOp::LShift => format!("{l} << {r}"),
            BinOp::RShift => format!("{l} >> {r}"),
            BinOp::BitAnd => format!("{l} & {r}"),
            BinOp::BitOr => format!("{l} | {r}"),
            BinOp::BitXor => format!("{l} ^ {r}"),
        })
    }

    fn bool_op(&mut self, operands: &[Expr], sep: &str) -> Result<String> {
        let mut parts = Vec::with_capacity(operands.len());
        for operand in operands {
            let text = self.expr(operand)?;
            match operand {
                Expr::And { .. } | Expr::Or { .. } | Expr::IfExp { .. } => {
                    parts.push(format!("({text})"))
                }
                _ => parts.push(text),
            }
        }
        Ok(parts.join(sep))
    }

    fn compare(&mut self, node: &Expr, left: &Expr, comparators: &[Comparison]) -> Result<String> {
        let lhs = self.expr(left)?;
        if let [Comparison { op, right }] = comparators
            && op.is_membership()
        {
            let haystack = self.expr(right)?;
            let negate = if *op == CmpOp::NotIn { "!" } else { "" };
            return Ok(format!("{negate}in_array({lhs}, {haystack})"));
        }
        if comparators.iter().any(|c| c.op.is_membership()) {
            return Err(self.unsupported("membership test inside a comparison chain", node));
        }

        let mut out = String::new();
        let mut prev = lhs;
        for (i, comparison) in comparators.iter().enumerate() {
            let rhs = self.expr(&comparison.right)?;
            let op = match comparison.op {
                CmpOp::Eq | CmpOp::Is => "==",
                CmpOp::NotEq | CmpOp::LtGt | CmpOp::IsNot => "!=",
                CmpOp::Lt => "<",
                CmpOp::LtE => "<=",
                CmpOp::Gt => ">",
                CmpOp::GtE => ">=",
                CmpOp::In | CmpOp::NotIn => {
                    return Err(self.unsupported("membership test inside a comparison chain", node));
                }
            };
            if i > 0 {
                out.push_str(" && ");
            }
            out.push_str(&format!("({prev} {op} {rhs})"));
            prev = rhs;
        }
        Ok(out)
    }

    /// A comprehension becomes a generator closure over the caller's
    /// variables, collected by a runtime helper.
    fn comprehension(
        &mut self,
        helper: &str,
        elt: &Expr,
        generators: &[Comprehension],
    ) -> Result<String> {
        let body = self.comprehension_loop(elt, generators)?;
        Ok(format!(
            "{helper}( function($__vars) {{ extract($__vars); {body}}}, get_defined_vars() )"
        ))
    }

    fn comprehension_loop(&mut self, elt: &Expr, generators: &[Comprehension]) -> Result<String> {
        let Some((first, rest)) = generators.split_first() else {
            return Ok(format!("yield {};", self.expr(elt)?));
        };
        let iter = self.expr(&first.iter)?;
        let target = self.loop_target(&first.target)?;
        let mut out = format!("foreach( pyjslib_list({iter}) as {target} ) {{");
        let inner = self.comprehension_loop(elt, rest)?;
        if first.ifs.is_empty() {
            out.push_str(&inner);
        } else {
            let conds = first
                .ifs
                .iter()
                .map(|c| self.expr(c))
                .collect::<Result<Vec<_>>>()?;
            out.push_str(&format!("if({}) {inner}", conds.join(" && ")));
        }
        out.push('}');
        Ok(out)
    }

    /// Loop variable binding: `$x` or `list($a, $b)`.
    pub(crate) fn loop_target(&mut self, target: &Expr) -> Result<String> {
        match target {
            Expr::Name { id } => Ok(format!("${id}")),
            Expr::Tuple { elts } | Expr::List { elts } => {
                let parts = elts
                    .iter()
                    .map(|e| self.loop_target(e))
                    .collect::<Result<Vec<_>>>()?;
                Ok(format!("list({})", parts.join(", ")))
            }
            other => Err(self.unsupported(
                format!("loop target of kind `{}`", other.kind_name()),
                other,
            )),
        }
    }
}
