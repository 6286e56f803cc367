//! PHP literal and comment formatting.

use py2php_ast::Constant;

pub(crate) fn constant(value: &Constant) -> String {
    match value {
        Constant::None => "null".to_string(),
        Constant::Bool(true) => "true".to_string(),
        Constant::Bool(false) => "false".to_string(),
        Constant::Int(n) => n.to_string(),
        Constant::Float(f) => float(*f),
        Constant::Str(s) => quote(s),
    }
}

fn float(f: f64) -> String {
    if f.is_nan() {
        "NAN".to_string()
    } else if f.is_infinite() {
        if f > 0.0 { "INF" } else { "-INF" }.to_string()
    } else {
        format!("{f:?}")
    }
}

/// Quote a string for PHP.
///
/// Plain text uses single quotes. Text with control characters switches to
/// double quotes so the escapes survive, with `$` escaped against
/// interpolation.
pub(crate) fn quote(s: &str) -> String {
    if !s.chars().any(char::is_control) {
        let mut out = String::with_capacity(s.len() + 2);
        out.push('\'');
        for c in s.chars() {
            match c {
                '\\' => out.push_str("\\\\"),
                '\'' => out.push_str("\\'"),
                c => out.push(c),
            }
        }
        out.push('\'');
        return out;
    }

    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '$' => out.push_str("\\$"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{0b}' => out.push_str("\\v"),
            '\u{0c}' => out.push_str("\\f"),
            '\u{1b}' => out.push_str("\\e"),
            c if c.is_control() => out.push_str(&format!("\\u{{{:x}}}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Render a docstring as a `/** ... */` block at `indent`.
pub(crate) fn doc_block(doc: &str, indent: &str) -> String {
    let mut out = format!("{indent}/**\n");
    for line in doc.trim().lines() {
        let line = line.trim_start();
        let line = line.strip_prefix("* ").unwrap_or(line);
        let line = line.replace("*/", "*\\/");
        if line.is_empty() {
            out.push_str(&format!("{indent} *\n"));
        } else {
            out.push_str(&format!("{indent} * {line}\n"));
        }
    }
    out.push_str(&format!("{indent} */\n"));
    out
}

/// Docstring in statement position, as a block comment.
pub(crate) fn inline_comment(text: &str) -> String {
    format!("/*{}*/", text.replace("*/", "*\\/"))
}

/// Module name as used in file names and `::` prefixes (`a.b` to `a_b`).
pub(crate) fn import_name(module: &str) -> String {
    module.replace('.', "_")
}
