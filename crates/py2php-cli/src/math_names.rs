//! `math::name` references rewritten to PHP's built-in math functions.
//!
//! Programs that import `math` get `math::sqrt(...)` from the translator;
//! PHP has these as global functions and constants instead.

/// Python `math` names and their PHP spellings.
const MATH_NAMES: &[(&str, &str)] = &[
    ("acosh", "acosh"),
    ("acos", "acos"),
    ("asinh", "asinh"),
    ("asin", "asin"),
    ("atan2", "atan2"),
    ("atanh", "atanh"),
    ("atan", "atan"),
    ("ceil", "ceil"),
    ("cosh", "cosh"),
    ("cos", "cos"),
    ("radians", "deg2rad"),
    ("expm1", "expm1"),
    ("exp", "exp"),
    ("e", "M_E"),
    ("floor", "floor"),
    ("fmod", "fmod"),
    ("hypot", "hypot"),
    ("isinf", "is_infinite"),
    ("isnan", "is_nan"),
    ("log10", "log10"),
    ("log1p", "log1p"),
    ("log", "log"),
    ("modf", "modf"),
    ("pi", "M_PI"),
    ("pow", "pow"),
    ("degrees", "rad2deg"),
    ("sinh", "sinh"),
    ("sin", "sin"),
    ("sqrt", "sqrt"),
    ("tanh", "tanh"),
    ("tan", "tan"),
];

const TAG: &str = "math::";

const MATH_REQUIRE: &str = "require_once( 'math.php');";

/// PHP has no `modf`; this stands in for the `math` module include.
const MODF: &str = "function modf($value) {\n  return [$value - pyjslib_int($value), pyjslib_int($value)];\n}";

/// Rewrite a translated program that imports `math`.
pub fn rewrite(php: &str) -> String {
    php.split('\n')
        .map(|line| {
            if line.contains(MATH_REQUIRE) {
                MODF.to_string()
            } else {
                rewrite_line(line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn rewrite_line(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut rest = line;
    while let Some(at) = rest.find(TAG) {
        out.push_str(&rest[..at]);
        let tail = &rest[at + TAG.len()..];
        match lookup(tail) {
            Some((python, php)) => {
                out.push_str(php);
                rest = &tail[python.len()..];
            }
            None => {
                out.push_str(TAG);
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

/// The math name `tail` starts with, as a whole identifier.
fn lookup(tail: &str) -> Option<(&'static str, &'static str)> {
    MATH_NAMES.iter().copied().find(|(python, _)| {
        tail.strip_prefix(python)
            .is_some_and(|after| !after.starts_with(|c: char| c.is_alphanumeric() || c == '_'))
    })
}
