//! Multi-module runs against library directories on disk.

use py2php_ast::{JSON_PARSER, Module, ParseError, SourceParser};
use py2php_translate::{ModuleResolver, PREAMBLE, TranslateConfig, TranslateError};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

/// JSON parser that counts file parses.
#[derive(Default)]
struct CountingParser {
    files: AtomicUsize,
}

impl CountingParser {
    fn files(&self) -> usize {
        self.files.load(Ordering::SeqCst)
    }
}

impl SourceParser for CountingParser {
    fn format(&self) -> &'static str {
        "json"
    }

    fn parse_file(&self, path: &Path) -> Result<Module, ParseError> {
        self.files.fetch_add(1, Ordering::SeqCst);
        JSON_PARSER.parse_file(path)
    }

    fn parse_str(&self, source: &str) -> Result<Module, ParseError> {
        JSON_PARSER.parse_str(source)
    }
}

struct Library {
    dir: TempDir,
}

impl Library {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn file(self, name: &str, content: &str) -> Self {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
        self
    }

    fn config(&self) -> TranslateConfig {
        let mut config = TranslateConfig::default();
        config.resolver.search_paths = vec![self.dir.path().to_path_buf()];
        config.output.preamble = false;
        config
    }
}

const SHAPES: &str = r#"[
  {"line": 1, "kind": "class_def", "name": "Square", "body": [
    {"line": 2, "kind": "function_def", "name": "area", "params": {"args": ["self"]},
     "body": [{"line": 3, "kind": "return", "value": {"kind": "const", "value": 4}}]}
  ]}
]"#;

const APP: &str = r#"[
  {"line": 1, "kind": "import", "names": [{"name": "helpers.php"}]},
  {"line": 2, "kind": "import_from", "module": "shapes", "names": [{"name": "Square"}]},
  {"line": 3, "kind": "assign", "targets": [{"kind": "name", "id": "s"}],
   "value": {"kind": "call", "func": {"kind": "name", "id": "Square"},
             "args": [{"kind": "positional", "value": {"kind": "const", "value": 2}}]}}
]"#;

#[test]
fn app_emits_dependencies_includes_then_itself() {
    let library = Library::new()
        .file("shapes.json", SHAPES)
        .file("app.json", APP)
        .file("helpers.php", "function helper() {}");
    let config = library.config();
    let mut resolver = ModuleResolver::new(&config, &JSON_PARSER);

    let out = resolver.translate_app("app").unwrap();
    let expected = concat!(
        "class Square {\n",
        "  function area() {\n",
        "    return 4;\n",
        "  }\n",
        "}\n",
        "\n//\n// BEGIN helpers.php\n//\n",
        "function helper() {}\n",
        "//\n// END helpers.php\n//\n",
        "require_once( 'shapes.php');\n",
        "$s = new Square(2);\n",
    );
    assert_eq!(out, expected);
    assert!(resolver.registry().contains("Square"));
}

#[test]
fn preamble_leads_a_program() {
    let library = Library::new().file(
        "main.json",
        r#"[{"line": 1, "kind": "pass"}]"#,
    );
    let mut config = library.config();
    config.output.preamble = true;
    let mut resolver = ModuleResolver::new(&config, &JSON_PARSER);
    assert_eq!(resolver.translate_app("main").unwrap(), PREAMBLE);
}

#[test]
fn each_module_is_parsed_once() {
    let library = Library::new()
        .file("shapes.json", SHAPES)
        .file("app.json", APP)
        .file("helpers.php", "");
    let config = library.config();
    let parser = CountingParser::default();
    let mut resolver = ModuleResolver::new(&config, &parser);

    let first = resolver.resolve("shapes").unwrap();
    let second = resolver.resolve("shapes").unwrap();
    assert_eq!(first, second);
    assert_eq!(parser.files(), 1);

    resolver.translate_app("app").unwrap();
    assert_eq!(parser.files(), 2);
}

#[test]
fn raw_include_is_inlined_once() {
    let library = Library::new()
        .file(
            "first.json",
            r#"[{"line": 1, "kind": "import", "names": [{"name": "helpers.php"}, {"name": "second"}]}]"#,
        )
        .file(
            "second.json",
            r#"[{"line": 1, "kind": "import", "names": [{"name": "helpers.php"}]}]"#,
        )
        .file("helpers.php", "define('READY', 1);");
    let config = library.config();
    let mut resolver = ModuleResolver::new(&config, &JSON_PARSER);

    let out = resolver.translate_app("first").unwrap();
    assert_eq!(out.matches("// BEGIN helpers.php").count(), 1);
    assert_eq!(out.matches("define('READY', 1);").count(), 1);
    assert!(out.ends_with("require_once( 'second.php');\n"));
}

#[test]
fn cyclic_imports_terminate() {
    let library = Library::new()
        .file(
            "ping.json",
            r#"[{"line": 1, "kind": "import", "names": [{"name": "pong"}]},
                {"line": 2, "kind": "assign", "targets": [{"kind": "name", "id": "a"}], "value": {"kind": "const", "value": 1}}]"#,
        )
        .file(
            "pong.json",
            r#"[{"line": 1, "kind": "import", "names": [{"name": "ping"}]},
                {"line": 2, "kind": "assign", "targets": [{"kind": "name", "id": "b"}], "value": {"kind": "const", "value": 2}}]"#,
        );
    let config = library.config();
    let mut resolver = ModuleResolver::new(&config, &JSON_PARSER);

    let out = resolver.translate_app("ping").unwrap();
    insta::assert_snapshot!(out.trim_end(), @r"
    require_once( 'ping.php');
    $b = 2;
    require_once( 'pong.php');
    $a = 1;
    ");
}

#[test]
fn library_root_contributes_only_imports() {
    let library = Library::new()
        .file(
            "pyjamas.json",
            r#"[{"line": 1, "kind": "import", "names": [{"name": "pyjamas.ui"}]}]"#,
        )
        .file(
            "ui.json",
            r#"[{"line": 1, "kind": "function_def", "name": "show"}]"#,
        );
    let config = library.config();
    let mut resolver = ModuleResolver::new(&config, &JSON_PARSER);

    let out = resolver
        .translate_libraries(&["pyjamas".to_string()])
        .unwrap();
    assert_eq!(out, "function show() {\n}\n");
}

#[test]
fn class_from_another_module_does_not_capture_variables() {
    let library = Library::new()
        .file(
            "settings.json",
            r#"[{"line": 1, "kind": "class_def", "name": "config", "body": [{"line": 2, "kind": "pass"}]}]"#,
        )
        .file(
            "main.json",
            r#"[
              {"line": 1, "kind": "assign", "targets": [{"kind": "name", "id": "config"}],
               "value": {"kind": "const", "value": 1}},
              {"line": 2, "kind": "print", "values": [{"kind": "name", "id": "config"}]}
            ]"#,
        );
    let config = library.config();
    let mut resolver = ModuleResolver::new(&config, &JSON_PARSER);

    resolver.resolve("settings").unwrap();
    assert!(resolver.registry().contains("config"));

    let main = resolver.resolve("main").unwrap();
    assert_eq!(main.text(), "$config = 1;\npyjslib_printnl($config);\n");
}

#[test]
fn platform_override_replaces_function_body() {
    let library = Library::new()
        .file(
            "widget.json",
            r#"[{"line": 1, "kind": "function_def", "name": "size", "doc": "Pixels.",
                 "body": [{"line": 2, "kind": "return", "value": {"kind": "const", "value": 1}}]}]"#,
        )
        .file(
            "platform/widgethulahop.json",
            r#"[{"line": 1, "kind": "function_def", "name": "size", "params": {"args": ["scale"]},
                 "body": [{"line": 2, "kind": "return", "value": {"kind": "name", "id": "scale"}}]}]"#,
        );
    let mut config = library.config();
    config.platform.name = Some("hulahop".to_string());
    config.platform.dir = "platform".into();
    let mut resolver = ModuleResolver::new(&config, &JSON_PARSER);

    let out = resolver
        .translate_libraries(&["widget".to_string()])
        .unwrap();
    insta::assert_snapshot!(out.trim_end(), @r"
    /**
     * Pixels.
     */
    function size($scale) {
      return $scale;
    }
    ");
}

#[test]
fn platform_override_of_unknown_name_fails() {
    let library = Library::new()
        .file("widget.json", r#"[{"line": 1, "kind": "pass"}]"#)
        .file(
            "platform/widgethulahop.json",
            r#"[{"line": 1, "kind": "function_def", "name": "resize"}]"#,
        );
    let mut config = library.config();
    config.platform.name = Some("hulahop".to_string());
    config.platform.dir = "platform".into();
    let mut resolver = ModuleResolver::new(&config, &JSON_PARSER);

    match resolver.resolve("widget") {
        Err(TranslateError::UnresolvedReference { name, .. }) => assert_eq!(name, "resize"),
        other => panic!("expected UnresolvedReference, got {other:?}"),
    }
}

#[test]
fn missing_import_reports_search_paths() {
    let library = Library::new().file(
        "app.json",
        r#"[{"line": 1, "kind": "import", "names": [{"name": "nowhere"}]}]"#,
    );
    let config = library.config();
    let mut resolver = ModuleResolver::new(&config, &JSON_PARSER);

    let err = resolver.translate_app("app").unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("unable to locate `nowhere.json`"));
    assert!(message.contains(&library.dir.path().display().to_string()));
}

#[test]
fn malformed_document_is_a_parse_error() {
    let library = Library::new().file("broken.json", r#"[{"line": 1, "kind": "goto"}]"#);
    let config = library.config();
    let mut resolver = ModuleResolver::new(&config, &JSON_PARSER);
    assert!(matches!(
        resolver.resolve("broken"),
        Err(TranslateError::Parse { .. })
    ));
}
