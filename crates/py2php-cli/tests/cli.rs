use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn py2php(home: &TempDir) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_py2php"));
    command
        .env("XDG_CONFIG_HOME", home.path())
        .env_remove("PY2PHP_LOG")
        .env_remove("RUST_LOG");
    command
}

#[test]
fn writes_program_next_to_input() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("circle.json");
    fs::write(
        &input,
        r#"[
          {"line": 1, "kind": "import", "names": [{"name": "math"}]},
          {"line": 2, "kind": "assign", "targets": [{"kind": "name", "id": "area"}],
           "value": {"kind": "bin_op", "op": "mul",
                     "left": {"kind": "attribute", "value": {"kind": "name", "id": "math"}, "attr": "pi"},
                     "right": {"kind": "name", "id": "r"}}}
        ]"#,
    )
    .unwrap();

    let status = py2php(&dir).arg(&input).status().unwrap();
    assert!(status.success());

    let php = fs::read_to_string(dir.path().join("circle.php")).unwrap();
    assert!(php.starts_with("<?php set_include_path("));
    assert!(php.contains("function modf($value) {\n"));
    assert!(php.ends_with("$area = (M_PI * $r);\n"));
}

#[test]
fn imports_are_found_beside_the_input() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("util.json"),
        r#"[{"line": 1, "kind": "function_def", "name": "helper"}]"#,
    )
    .unwrap();
    let input = dir.path().join("main.json");
    fs::write(
        &input,
        r#"[{"line": 1, "kind": "import", "names": [{"name": "util"}]}]"#,
    )
    .unwrap();
    let output = dir.path().join("out").join("program.php");
    fs::create_dir_all(output.parent().unwrap()).unwrap();

    let status = py2php(&dir)
        .arg(&input)
        .arg("--no-preamble")
        .arg("-o")
        .arg(&output)
        .status()
        .unwrap();
    assert!(status.success());
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "<?php function helper() {\n}\nrequire_once( 'util.php');\n"
    );
}

#[test]
fn failure_exits_nonzero_with_message() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("broken.json");
    fs::write(
        &input,
        r#"[{"line": 1, "kind": "import", "names": [{"name": "missing"}]}]"#,
    )
    .unwrap();

    let output = py2php(&dir).arg(&input).output().unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unable to locate `missing.json`"));
    assert!(!dir.path().join("broken.php").exists());
}
