//! Call translation: callee resolution and argument shaping.

use crate::builtins::{self, ArgStyle};
use crate::error::Result;
use crate::scope::{NameKind, starts_uppercase};
use crate::text::import_name;
use crate::translator::Translator;
use py2php_ast::{Arg, Call, Expr};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Form {
    Plain,
    /// `list.append(x)` becomes `$list[] = $x`.
    Append,
    /// Callee is a closure expression; invoked through `call_user_func`.
    UserFunc,
    /// `super(...)` by itself renders as `parent`.
    Bare,
}

/// Resolved callee text plus how to attach arguments to it.
#[derive(Debug)]
pub(crate) struct CallTarget {
    name: String,
    form: Form,
    style: ArgStyle,
    /// Drop a leading `$this` argument (explicit base-class method calls).
    elide_self: bool,
}

impl CallTarget {
    fn plain(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            form: Form::Plain,
            style: ArgStyle::Plain,
            elide_self: false,
        }
    }
}

impl Translator<'_> {
    pub(crate) fn call(&mut self, call: &Call) -> Result<String> {
        let target = self.call_target(call)?;
        self.finish_call(call, target)
    }

    /// `new Class(args)` regardless of what the callee name resolves to.
    pub(crate) fn constructor_call(&mut self, call: &Call, class: &str) -> Result<String> {
        self.finish_call(call, CallTarget::plain(format!("new {class}")))
    }

    fn call_target(&mut self, call: &Call) -> Result<CallTarget> {
        match call.func.as_ref() {
            Expr::Name { id } => self.named_target(id, &call.func),
            Expr::Attribute { value, attr } => self.method_target(value, attr),
            Expr::Subscript { .. } | Expr::Call(_) => Ok(CallTarget::plain(self.expr(&call.func)?)),
            Expr::Lambda { .. } => Ok(CallTarget {
                form: Form::UserFunc,
                ..CallTarget::plain(self.expr(&call.func)?)
            }),
            other => Ok(CallTarget::plain(format!("({})", self.expr(other)?))),
        }
    }

    fn named_target(&mut self, id: &str, node: &Expr) -> Result<CallTarget> {
        if self.scope.is_function(id) {
            return Ok(CallTarget::plain(id));
        }
        match self.classify(id) {
            NameKind::Class => return Ok(CallTarget::plain(format!("new {id}"))),
            NameKind::Static => return Ok(CallTarget::plain("new static")),
            NameKind::This => return Ok(CallTarget::plain("$this")),
            NameKind::Global => return Ok(CallTarget::plain(format!("${id}"))),
            _ => {}
        }
        if id == "super" {
            return Ok(CallTarget {
                form: Form::Bare,
                ..CallTarget::plain("parent")
            });
        }
        if let Some(builtin) = builtins::rewrite(id) {
            return Ok(CallTarget {
                style: builtin.args,
                ..CallTarget::plain(builtin.php)
            });
        }
        if builtins::is_passthrough(id) {
            return Ok(CallTarget::plain(id));
        }
        match self.classify(id) {
            NameKind::Module => Err(self.unsupported(format!("module `{id}` is not callable"), node)),
            kind => Ok(CallTarget::plain(kind.render(id).unwrap_or_default())),
        }
    }

    fn method_target(&mut self, value: &Expr, attr: &str) -> Result<CallTarget> {
        let method = if attr == "__init__" {
            "__construct"
        } else {
            attr
        };
        let mut elide_self = false;

        let name = match value {
            Expr::Name { id } => {
                let kind = self.classify(id);
                let is_static = kind == NameKind::Class
                    || (kind == NameKind::Variable && starts_uppercase(id));
                if is_static && self.registry.has_method(id, method) {
                    elide_self = true;
                }
                match kind {
                    NameKind::This => format!("$this->{method}"),
                    NameKind::Static => format!("static::{method}"),
                    NameKind::Module => format!("{}::{method}", import_name(id)),
                    NameKind::Class => format!("{id}::{method}"),
                    NameKind::Global => format!("${id}->{method}"),
                    NameKind::Variable if starts_uppercase(id) => format!("{id}::{method}"),
                    NameKind::Variable => format!("${id}->{method}"),
                    NameKind::Keyword(kw) => format!("{kw}->{method}"),
                }
            }
            Expr::Attribute {
                value: inner,
                attr: mid,
            } => self.chained_target(inner, mid, method)?,
            Expr::Call(inner) if is_super(inner) => format!("parent::{method}"),
            other => format!("{}->{method}", self.expr(other)?),
        };

        if name.ends_with("__construct") {
            elide_self = true;
        }
        if let Some(list) = name.strip_suffix("->append") {
            return Ok(CallTarget {
                form: Form::Append,
                ..CallTarget::plain(list)
            });
        }
        Ok(CallTarget {
            elide_self,
            ..CallTarget::plain(name)
        })
    }

    /// `a.b.c()` walks the chain; module prefixes switch to `::`.
    fn chained_target(&mut self, inner: &Expr, mid: &str, tail: &str) -> Result<String> {
        match inner {
            Expr::Attribute { value, attr } => {
                self.chained_target(value, attr, &format!("{mid}->{tail}"))
            }
            Expr::Name { id } if self.scope.is_module(&format!("{id}.{mid}")) => {
                Ok(format!("{}::{tail}", import_name(&format!("{id}.{mid}"))))
            }
            Expr::Name { id } if self.classify(id).is_namespace() => {
                let prefix = match self.classify(id) {
                    NameKind::Module => import_name(id),
                    NameKind::Static => "static".to_string(),
                    _ => id.clone(),
                };
                Ok(format!("{prefix}::{mid}::{tail}"))
            }
            other => Ok(format!("{}->{mid}->{tail}", self.expr(other)?)),
        }
    }

    fn finish_call(&mut self, call: &Call, target: CallTarget) -> Result<String> {
        let special = target.style != ArgStyle::Plain && !call.has_keywords();
        let mut args = Vec::new();
        let mut keywords = Vec::new();
        let mut first = true;

        for arg in &call.args {
            match arg {
                Arg::Keyword { name, value } => {
                    keywords.push(format!("\"{name}\" => {}", self.expr(value)?));
                }
                Arg::Positional { value } => {
                    let text = if special && first && target.style == ArgStyle::CallableFirst {
                        self.callable_ref(value)?
                    } else {
                        self.expr(value)?
                    };
                    let leading = std::mem::replace(&mut first, false);
                    if leading && target.elide_self && text == "$this" {
                        continue;
                    }
                    args.push(text);
                }
            }
        }
        let spread = call
            .star_args
            .as_deref()
            .map(|star| self.expr(star))
            .transpose()?;

        if call.dstar_args.is_some() || !keywords.is_empty() {
            let positional = match &spread {
                Some(spread) if args.is_empty() => spread.clone(),
                Some(spread) => format!("array_merge([{}], {spread})", args.join(", ")),
                None => format!("[{}]", args.join(", ")),
            };
            let named = format!("[{}]", keywords.join(", "));
            let named = match call.dstar_args.as_deref() {
                Some(dstar) if keywords.is_empty() => self.expr(dstar)?,
                Some(dstar) => format!("array_merge({named}, {})", self.expr(dstar)?),
                None => named,
            };
            if target.form == Form::UserFunc {
                return Ok(format!(
                    "py2php_kwargs_function_call({}, {positional}, {named})",
                    target.name
                ));
            }
            return Ok(keyword_call(&target.name, &positional, &named));
        }

        if let Some(spread) = spread {
            args.push(format!("...{spread}"));
        }
        if special && target.style == ArgStyle::Print && args.len() != 1 {
            args = vec![format!("[{}]", args.join(", ")), "true".to_string()];
        }

        Ok(match target.form {
            Form::UserFunc => {
                let mut parts = vec![target.name];
                parts.extend(args);
                format!("call_user_func({})", parts.join(", "))
            }
            Form::Append => format!("{}[] = {}", target.name, args.join(", ")),
            Form::Bare => target.name,
            Form::Plain => format!("{}({})", target.name, args.join(", ")),
        })
    }
}

fn is_super(call: &Call) -> bool {
    matches!(call.func.as_ref(), Expr::Name { id } if id == "super")
}

/// Split `recv->m` or `Cls::m` at the last member operator.
fn split_member(name: &str) -> Option<(&str, &str)> {
    let arrow = name.rfind("->");
    let colons = name.rfind("::");
    let at = match (arrow, colons) {
        (Some(a), Some(c)) => a.max(c),
        (Some(a), None) => a,
        (None, Some(c)) => c,
        (None, None) => return None,
    };
    Some((&name[..at], &name[at + 2..]))
}

/// Route a call with named arguments through the runtime helpers.
fn keyword_call(name: &str, positional: &str, named: &str) -> String {
    match split_member(name) {
        None => format!("py2php_kwargs_function_call('{name}', {positional}, {named})"),
        Some(("parent", method)) => format!(
            "py2php_kwargs_method_call($this, 'parent', '{method}', {positional}, {named})"
        ),
        Some((receiver, method)) => {
            let receiver = if receiver.starts_with('$') {
                receiver.to_string()
            } else {
                format!("'{receiver}'")
            };
            format!("py2php_kwargs_method_call({receiver}, null, '{method}', {positional}, {named})")
        }
    }
}
