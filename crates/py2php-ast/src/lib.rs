//! Input tree for the py2php translator.
//!
//! `py2php-ast` describes the Python 2 syntax tree that the translator
//! consumes, plus the parser collaborator that produces it. The tree is a
//! closed set of serde enums, so any document that deserializes is a tree
//! the translator knows how to walk.
//!
//! # Document form
//!
//! Trees are exchanged as JSON documents with a `"kind"` tag on every
//! node. A module looks like:
//!
//! ```json
//! { "body": [
//!     { "line": 1, "kind": "assign",
//!       "targets": [{ "kind": "name", "id": "x" }],
//!       "value": { "kind": "const", "value": 1 } }
//! ] }
//! ```
//!
//! Any front end that can emit this shape (a small script over Python's
//! own `compiler`/`ast` module is enough) can feed the translator.

pub mod ast;
pub mod traits;

pub mod input;

// Re-exports: tree types
pub use ast::{
    Alias, Arg, BinOp, Call, ClassDef, CmpOp, Comparison, Comprehension, Constant, DictItem,
    ExceptHandler, Expr, ExprContext, FunctionDef, IfBranch, Module, Param, Params, Stmt, StmtKind,
    UnaryOp,
};

// Re-exports: parser collaborator
pub use traits::{ParseError, SourceParser};

#[cfg(feature = "read-json")]
pub use input::{JSON_PARSER, JsonParser, read_json};
