//! Python builtins and their runtime-library counterparts.

/// How a rewritten builtin takes its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ArgStyle {
    Plain,
    /// First argument is a callable reference (`map`, `filter`).
    CallableFirst,
    /// `print(...)`: one value passes through, several are packed.
    Print,
}

#[derive(Debug)]
pub(crate) struct Builtin {
    pub(crate) php: &'static str,
    pub(crate) args: ArgStyle,
}

const fn plain(php: &'static str) -> Builtin {
    Builtin {
        php,
        args: ArgStyle::Plain,
    }
}

static REWRITES: &[(&str, Builtin)] = &[
    ("callable", plain("is_callable")),
    ("dict", plain("pyjslib_dict")),
    (
        "map",
        Builtin {
            php: "pyjslib_map",
            args: ArgStyle::CallableFirst,
        },
    ),
    (
        "filter",
        Builtin {
            php: "pyjslib_filter",
            args: ArgStyle::CallableFirst,
        },
    ),
    ("zip", plain("pyjslib_zip")),
    ("dir", plain("pyjslib_dir")),
    ("getattr", plain("pyjslib_getattr")),
    ("hasattr", plain("method_exists")),
    ("int", plain("pyjslib_int")),
    ("long", plain("pyjslib_int")),
    ("str", plain("pyjslib_str")),
    ("unicode", plain("pyjslib_str")),
    ("float", plain("floatval")),
    ("bool", plain("boolval")),
    ("range", plain("pyjslib_range")),
    ("xrange", plain("pyjslib_range")),
    ("len", plain("count")),
    ("sum", plain("pyjslib_sum")),
    ("min", plain("pyjslib_min")),
    ("max", plain("pyjslib_max")),
    ("list", plain("pyjslib_list")),
    ("tuple", plain("pyjslib_list")),
    ("hash", plain("pyjslib_hash")),
    ("repr", plain("pyjslib_repr")),
    ("isinstance", plain("isinstance")),
    ("issubclass", plain("is_subclass_of")),
    ("open", plain("pyjslib_open")),
    ("globals", plain("pyjslib_globals")),
    ("vars", plain("get_object_vars")),
    ("id", plain("spl_object_id")),
    ("reversed", plain("array_reverse")),
    ("raw_input", plain("readline")),
    ("unichr", plain("mb_chr")),
    (
        "print",
        Builtin {
            php: "pyjslib_printnl",
            args: ArgStyle::Print,
        },
    ),
];

/// Builtins whose PHP spelling is the Python name.
static PASSTHROUGH: &[&str] = &[
    "abs",
    "all",
    "any",
    "apply",
    "basestring",
    "bin",
    "buffer",
    "bytearray",
    "bytes",
    "chr",
    "classmethod",
    "cmp",
    "coerce",
    "compile",
    "complex",
    "delattr",
    "divmod",
    "enumerate",
    "eval",
    "execfile",
    "file",
    "format",
    "frozenset",
    "help",
    "hex",
    "input",
    "intern",
    "iter",
    "locals",
    "memoryview",
    "next",
    "object",
    "oct",
    "ord",
    "pow",
    "property",
    "reduce",
    "reload",
    "round",
    "set",
    "setattr",
    "slice",
    "sorted",
    "staticmethod",
    "super",
    "type",
    "__import__",
];

pub(crate) fn rewrite(name: &str) -> Option<&'static Builtin> {
    REWRITES
        .iter()
        .find(|(python, _)| *python == name)
        .map(|(_, builtin)| builtin)
}

pub(crate) fn is_passthrough(name: &str) -> bool {
    PASSTHROUGH.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewrite_lookup() {
        assert_eq!(rewrite("len").map(|b| b.php), Some("count"));
        assert_eq!(rewrite("map").map(|b| b.args), Some(ArgStyle::CallableFirst));
        assert!(rewrite("enumerate").is_none());
    }

    #[test]
    fn test_tables_are_disjoint() {
        for (python, _) in REWRITES {
            assert!(!is_passthrough(python), "{python} listed twice");
        }
    }
}
