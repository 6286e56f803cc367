//! Python 2 syntax tree consumed by the translator.
//!
//! Statements carry the source line they start on; expressions do not.
//! Every enum is tagged with `"kind"` in its serialized form.

use serde::{Deserialize, Serialize};

/// A parsed source file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Module {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    #[serde(default)]
    pub body: Vec<Stmt>,
}

impl Module {
    pub fn new(body: Vec<Stmt>) -> Self {
        Self { doc: None, body }
    }
}

/// A statement and the line it starts on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stmt {
    #[serde(default)]
    pub line: u32,
    #[serde(flatten)]
    pub kind: StmtKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StmtKind {
    FunctionDef(FunctionDef),
    ClassDef(ClassDef),
    /// `a = b = value`; more than one target shares a single evaluation.
    Assign {
        targets: Vec<Expr>,
        value: Expr,
    },
    AugAssign {
        target: Expr,
        op: BinOp,
        value: Expr,
    },
    /// Expression evaluated for its effect (calls, docstrings, bare names).
    Expr {
        value: Expr,
    },
    /// `if`/`elif` chain; the first branch is the `if`.
    If {
        branches: Vec<IfBranch>,
        orelse: Option<Vec<Stmt>>,
    },
    For {
        target: Expr,
        iter: Expr,
        body: Vec<Stmt>,
        orelse: Option<Vec<Stmt>>,
    },
    While {
        test: Expr,
        body: Vec<Stmt>,
        orelse: Option<Vec<Stmt>>,
    },
    Return {
        value: Option<Expr>,
    },
    Break,
    Continue,
    Pass,
    Global {
        names: Vec<String>,
    },
    Import {
        names: Vec<Alias>,
    },
    ImportFrom {
        module: String,
        names: Vec<Alias>,
    },
    Raise {
        exc: Option<Expr>,
    },
    Try {
        body: Vec<Stmt>,
        #[serde(default)]
        handlers: Vec<ExceptHandler>,
        orelse: Option<Vec<Stmt>>,
        finalbody: Option<Vec<Stmt>>,
    },
    With {
        context: Expr,
        var: Option<Expr>,
        body: Vec<Stmt>,
    },
    Assert {
        test: Expr,
        msg: Option<Expr>,
    },
    /// Python 2 `print` statement. `newline` is false for a trailing comma.
    Print {
        #[serde(default)]
        values: Vec<Expr>,
        #[serde(default = "default_true")]
        newline: bool,
    },
    Exec {
        code: Expr,
    },
    Delete {
        targets: Vec<Expr>,
    },
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfBranch {
    pub test: Expr,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDef {
    pub name: String,
    #[serde(default)]
    pub params: Params,
    #[serde(default)]
    pub body: Vec<Stmt>,
    #[serde(default)]
    pub decorators: Vec<Expr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

impl FunctionDef {
    pub fn new(name: impl Into<String>, params: Params, body: Vec<Stmt>) -> Self {
        Self {
            name: name.into(),
            params,
            body,
            decorators: Vec::new(),
            doc: None,
        }
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn with_decorator(mut self, decorator: Expr) -> Self {
        self.decorators.push(decorator);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDef {
    pub name: String,
    #[serde(default)]
    pub bases: Vec<Expr>,
    #[serde(default)]
    pub body: Vec<Stmt>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

impl ClassDef {
    pub fn new(name: impl Into<String>, bases: Vec<Expr>, body: Vec<Stmt>) -> Self {
        Self {
            name: name.into(),
            bases,
            body,
            doc: None,
        }
    }
}

/// Formal parameters. Defaults align with the tail of `args`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    pub args: Vec<Param>,
    pub defaults: Vec<Expr>,
    pub vararg: Option<String>,
    pub kwarg: Option<String>,
}

impl Params {
    pub fn positional(names: &[&str]) -> Self {
        Self {
            args: names.iter().map(|n| Param::Name((*n).to_string())).collect(),
            ..Self::default()
        }
    }

    pub fn with_defaults(mut self, defaults: Vec<Expr>) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_vararg(mut self, name: impl Into<String>) -> Self {
        self.vararg = Some(name.into());
        self
    }

    pub fn with_kwarg(mut self, name: impl Into<String>) -> Self {
        self.kwarg = Some(name.into());
        self
    }

    /// Name of the first positional parameter, if it is a plain name.
    pub fn first_name(&self) -> Option<&str> {
        match self.args.first() {
            Some(Param::Name(name)) => Some(name),
            _ => None,
        }
    }
}

/// A positional parameter; Python 2 allows tuple unpacking in signatures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Param {
    Name(String),
    Tuple(Vec<Param>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alias {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asname: Option<String>,
}

impl Alias {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            asname: None,
        }
    }

    /// Name the import binds in the importing module.
    pub fn bound_name(&self) -> &str {
        self.asname.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExceptHandler {
    #[serde(rename = "type", default)]
    pub type_: Option<Expr>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expr {
    Const {
        value: Constant,
    },
    Name {
        id: String,
    },
    Attribute {
        value: Box<Expr>,
        attr: String,
    },
    Subscript {
        value: Box<Expr>,
        keys: Vec<Expr>,
        #[serde(default)]
        ctx: ExprContext,
    },
    /// Two-bound slice `v[lower:upper]`.
    Slice {
        value: Box<Expr>,
        lower: Option<Box<Expr>>,
        upper: Option<Box<Expr>>,
        #[serde(default)]
        ctx: ExprContext,
    },
    /// Extended slice key `lower:upper:step`, only valid as a subscript key.
    SliceObj {
        parts: Vec<Expr>,
    },
    Call(Call),
    BinOp {
        left: Box<Expr>,
        op: BinOp,
        right: Box<Expr>,
    },
    BitAnd {
        operands: Vec<Expr>,
    },
    BitOr {
        operands: Vec<Expr>,
    },
    BitXor {
        operands: Vec<Expr>,
    },
    And {
        operands: Vec<Expr>,
    },
    Or {
        operands: Vec<Expr>,
    },
    Not {
        operand: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Compare {
        left: Box<Expr>,
        comparators: Vec<Comparison>,
    },
    List {
        elts: Vec<Expr>,
    },
    Tuple {
        elts: Vec<Expr>,
    },
    Dict {
        items: Vec<DictItem>,
    },
    Lambda {
        #[serde(default)]
        params: Params,
        body: Box<Expr>,
    },
    IfExp {
        test: Box<Expr>,
        body: Box<Expr>,
        orelse: Box<Expr>,
    },
    ListComp {
        elt: Box<Expr>,
        generators: Vec<Comprehension>,
    },
    GenExpr {
        elt: Box<Expr>,
        generators: Vec<Comprehension>,
    },
    /// Python 2 `` `x` `` repr shorthand.
    Backquote {
        value: Box<Expr>,
    },
    Yield {
        value: Option<Box<Expr>>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    pub func: Box<Expr>,
    #[serde(default)]
    pub args: Vec<Arg>,
    #[serde(default)]
    pub star_args: Option<Box<Expr>>,
    #[serde(default)]
    pub dstar_args: Option<Box<Expr>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Arg {
    Positional { value: Expr },
    Keyword { name: String, value: Expr },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Constant {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExprContext {
    #[default]
    Load,
    Store,
    Del,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
    LShift,
    RShift,
    BitAnd,
    BitOr,
    BitXor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOp {
    Neg,
    Pos,
    Invert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CmpOp {
    Eq,
    NotEq,
    /// Python 2 `<>`.
    LtGt,
    Lt,
    LtE,
    Gt,
    GtE,
    Is,
    IsNot,
    In,
    NotIn,
}

impl CmpOp {
    pub fn is_membership(self) -> bool {
        matches!(self, CmpOp::In | CmpOp::NotIn)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub op: CmpOp,
    pub right: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DictItem {
    pub key: Expr,
    pub value: Expr,
}

/// One `for target in iter if cond` qualifier of a comprehension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comprehension {
    pub target: Expr,
    pub iter: Expr,
    #[serde(default)]
    pub ifs: Vec<Expr>,
}

// Helper constructors
impl Expr {
    pub fn name(id: impl Into<String>) -> Self {
        Expr::Name { id: id.into() }
    }

    pub fn int(n: i64) -> Self {
        Expr::Const {
            value: Constant::Int(n),
        }
    }

    pub fn float(n: f64) -> Self {
        Expr::Const {
            value: Constant::Float(n),
        }
    }

    pub fn str(s: impl Into<String>) -> Self {
        Expr::Const {
            value: Constant::Str(s.into()),
        }
    }

    pub fn bool(b: bool) -> Self {
        Expr::Const {
            value: Constant::Bool(b),
        }
    }

    pub fn none() -> Self {
        Expr::Const {
            value: Constant::None,
        }
    }

    pub fn attr(value: Expr, attr: impl Into<String>) -> Self {
        Expr::Attribute {
            value: Box::new(value),
            attr: attr.into(),
        }
    }

    pub fn call(func: Expr, args: Vec<Expr>) -> Self {
        Expr::Call(Call {
            func: Box::new(func),
            args: args
                .into_iter()
                .map(|value| Arg::Positional { value })
                .collect(),
            star_args: None,
            dstar_args: None,
        })
    }

    pub fn binary(left: Expr, op: BinOp, right: Expr) -> Self {
        Expr::BinOp {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    pub fn compare(left: Expr, op: CmpOp, right: Expr) -> Self {
        Expr::Compare {
            left: Box::new(left),
            comparators: vec![Comparison { op, right }],
        }
    }

    pub fn subscript(value: Expr, key: Expr) -> Self {
        Expr::Subscript {
            value: Box::new(value),
            keys: vec![key],
            ctx: ExprContext::Load,
        }
    }

    pub fn tuple(elts: Vec<Expr>) -> Self {
        Expr::Tuple { elts }
    }

    pub fn list(elts: Vec<Expr>) -> Self {
        Expr::List { elts }
    }

    /// Short node label used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Expr::Const { .. } => "const",
            Expr::Name { .. } => "name",
            Expr::Attribute { .. } => "attribute",
            Expr::Subscript { .. } => "subscript",
            Expr::Slice { .. } => "slice",
            Expr::SliceObj { .. } => "slice_obj",
            Expr::Call(_) => "call",
            Expr::BinOp { .. } => "bin_op",
            Expr::BitAnd { .. } => "bit_and",
            Expr::BitOr { .. } => "bit_or",
            Expr::BitXor { .. } => "bit_xor",
            Expr::And { .. } => "and",
            Expr::Or { .. } => "or",
            Expr::Not { .. } => "not",
            Expr::Unary { .. } => "unary",
            Expr::Compare { .. } => "compare",
            Expr::List { .. } => "list",
            Expr::Tuple { .. } => "tuple",
            Expr::Dict { .. } => "dict",
            Expr::Lambda { .. } => "lambda",
            Expr::IfExp { .. } => "if_exp",
            Expr::ListComp { .. } => "list_comp",
            Expr::GenExpr { .. } => "gen_expr",
            Expr::Backquote { .. } => "backquote",
            Expr::Yield { .. } => "yield",
        }
    }
}

impl Call {
    /// Keyword arguments, in source order.
    pub fn keywords(&self) -> impl Iterator<Item = (&str, &Expr)> {
        self.args.iter().filter_map(|arg| match arg {
            Arg::Keyword { name, value } => Some((name.as_str(), value)),
            Arg::Positional { .. } => None,
        })
    }

    pub fn has_keywords(&self) -> bool {
        self.keywords().next().is_some()
    }
}

impl Stmt {
    pub fn new(line: u32, kind: StmtKind) -> Self {
        Self { line, kind }
    }

    pub fn expr(line: u32, value: Expr) -> Self {
        Self::new(line, StmtKind::Expr { value })
    }

    pub fn assign(line: u32, target: Expr, value: Expr) -> Self {
        Self::new(
            line,
            StmtKind::Assign {
                targets: vec![target],
                value,
            },
        )
    }

    pub fn ret(line: u32, value: Option<Expr>) -> Self {
        Self::new(line, StmtKind::Return { value })
    }

    pub fn pass(line: u32) -> Self {
        Self::new(line, StmtKind::Pass)
    }

    pub fn function(line: u32, def: FunctionDef) -> Self {
        Self::new(line, StmtKind::FunctionDef(def))
    }

    pub fn class(line: u32, def: ClassDef) -> Self {
        Self::new(line, StmtKind::ClassDef(def))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_tag_is_flattened() {
        let stmt = Stmt::assign(3, Expr::name("x"), Expr::int(1));
        let json = serde_json::to_value(&stmt).unwrap();
        assert_eq!(json["kind"], "assign");
        assert_eq!(json["line"], 3);
        assert_eq!(json["targets"][0]["kind"], "name");
    }

    #[test]
    fn test_constants_are_untagged() {
        let expr: Expr = serde_json::from_str(r#"{"kind":"const","value":null}"#).unwrap();
        assert_eq!(expr, Expr::none());
        let expr: Expr = serde_json::from_str(r#"{"kind":"const","value":2.5}"#).unwrap();
        assert_eq!(expr, Expr::float(2.5));
        let expr: Expr = serde_json::from_str(r#"{"kind":"const","value":7}"#).unwrap();
        assert_eq!(expr, Expr::int(7));
    }

    #[test]
    fn test_param_tuple() {
        let params: Params = serde_json::from_str(r#"{"args":["a",["b","c"]]}"#).unwrap();
        assert_eq!(params.args.len(), 2);
        assert!(matches!(&params.args[1], Param::Tuple(inner) if inner.len() == 2));
        assert_eq!(params.first_name(), Some("a"));
    }

    #[test]
    fn test_alias_bound_name() {
        let alias = Alias {
            name: "os.path".into(),
            asname: Some("p".into()),
        };
        assert_eq!(alias.bound_name(), "p");
        assert_eq!(Alias::new("sys").bound_name(), "sys");
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let result: Result<Expr, _> = serde_json::from_str(r#"{"kind":"set_comp"}"#);
        assert!(result.is_err());
    }
}
