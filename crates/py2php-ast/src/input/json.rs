//! JSON syntax-tree documents.

use crate::ast::Module;
use crate::traits::{ParseError, SourceParser};
use std::path::Path;

/// Static instance of the JSON parser.
pub static JSON_PARSER: JsonParser = JsonParser;

/// Reads trees serialized as `"kind"`-tagged JSON documents.
pub struct JsonParser;

impl SourceParser for JsonParser {
    fn format(&self) -> &'static str {
        "json"
    }

    fn parse_file(&self, path: &Path) -> Result<Module, ParseError> {
        let text = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        read_json(&text)
    }

    fn parse_str(&self, source: &str) -> Result<Module, ParseError> {
        read_json(source)
    }
}

/// Parse a JSON document into a module tree.
///
/// A bare statement list is accepted as shorthand for `{"body": [...]}`.
pub fn read_json(source: &str) -> Result<Module, ParseError> {
    let value: serde_json::Value = serde_json::from_str(source)?;
    let module = match value {
        serde_json::Value::Array(_) => Module::new(serde_json::from_value(value)?),
        serde_json::Value::Object(_) => serde_json::from_value(value)?,
        other => {
            return Err(ParseError::Unsupported(format!(
                "expected a module object or statement list, got {other}"
            )));
        }
    };
    Ok(module)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Expr, StmtKind};

    #[test]
    fn test_module_object() {
        let module = read_json(
            r#"{"body":[{"line":1,"kind":"expr","value":{"kind":"name","id":"x"}}]}"#,
        )
        .unwrap();
        assert_eq!(module.body.len(), 1);
        assert_eq!(module.body[0].line, 1);
        match &module.body[0].kind {
            StmtKind::Expr { value } => assert_eq!(value, &Expr::name("x")),
            _ => panic!("expected Expr"),
        }
    }

    #[test]
    fn test_statement_list_shorthand() {
        let module = read_json(r#"[{"line":2,"kind":"pass"}]"#).unwrap();
        assert!(matches!(module.body[0].kind, StmtKind::Pass));
    }

    #[test]
    fn test_scalar_document_rejected() {
        assert!(matches!(read_json("42"), Err(ParseError::Unsupported(_))));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = JSON_PARSER
            .parse_file(&dir.path().join("absent.json"))
            .unwrap_err();
        assert!(matches!(err, ParseError::Io { .. }));
    }
}
