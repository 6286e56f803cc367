//! Name bookkeeping for one module translation.

use indexmap::{IndexMap, IndexSet};
use std::collections::HashSet;

/// How a bare identifier renders in PHP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NameKind {
    /// `True`/`False`/`None`.
    Keyword(&'static str),
    /// The current method's receiver alias (usually `self`).
    This,
    /// A classmethod's class alias (usually `cls`).
    Static,
    /// Declared `global` in the current function.
    Global,
    Class,
    /// An imported module; it has no value of its own in PHP.
    Module,
    Variable,
}

impl NameKind {
    /// Text for the identifier, or `None` for module references.
    pub(crate) fn render(self, name: &str) -> Option<String> {
        match self {
            NameKind::Keyword(kw) => Some(kw.to_string()),
            NameKind::This => Some("$this".to_string()),
            NameKind::Static => Some("static".to_string()),
            NameKind::Class => Some(name.to_string()),
            NameKind::Module => None,
            NameKind::Global | NameKind::Variable => Some(format!("${name}")),
        }
    }

    /// Whether member access goes through `::` rather than `->`.
    pub(crate) fn is_namespace(self) -> bool {
        matches!(self, NameKind::Static | NameKind::Class | NameKind::Module)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReceiverKind {
    Instance,
    Class,
}

/// The alias a method uses for its implicit first parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Receiver {
    pub(crate) name: String,
    pub(crate) kind: ReceiverKind,
}

#[derive(Debug, Default)]
struct Frame {
    globals: HashSet<String>,
    local_functions: HashSet<String>,
    receiver: Option<Receiver>,
}

/// Per-module name sets plus a stack of function frames.
#[derive(Debug, Default)]
pub struct ScopeContext {
    pub top_level_functions: HashSet<String>,
    pub top_level_classes: HashSet<String>,
    pub top_level_vars: HashSet<String>,
    /// Names bound by `import`, in discovery order.
    pub imported_modules: IndexSet<String>,
    /// Local alias to defining module for `from m import C`.
    pub imported_classes: IndexMap<String, String>,
    frames: Vec<Frame>,
}

impl ScopeContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter a plain function body. PHP functions have no `$this`, so a
    /// function nested in a method does not see the method's receiver.
    pub(crate) fn enter_function(&mut self) {
        self.frames.push(Frame::default());
    }

    pub(crate) fn exit_function(&mut self) {
        self.frames.pop();
    }

    /// Enter a method body with an explicit receiver (or none, for static
    /// methods).
    pub(crate) fn enter_method(&mut self, receiver: Option<Receiver>) {
        self.frames.push(Frame {
            receiver,
            ..Frame::default()
        });
    }

    pub(crate) fn receiver(&self) -> Option<&Receiver> {
        self.frames.last().and_then(|f| f.receiver.as_ref())
    }

    pub fn in_function(&self) -> bool {
        !self.frames.is_empty()
    }

    pub(crate) fn declare_globals<'a>(&mut self, names: impl IntoIterator<Item = &'a String>) {
        if let Some(frame) = self.frames.last_mut() {
            frame.globals.extend(names.into_iter().cloned());
        }
    }

    pub fn is_global(&self, name: &str) -> bool {
        self.frames
            .last()
            .is_some_and(|f| f.globals.contains(name))
    }

    pub(crate) fn declare_local_function(&mut self, name: &str) {
        if let Some(frame) = self.frames.last_mut() {
            frame.local_functions.insert(name.to_string());
        }
    }

    /// Whether `name` is a function defined by name in this module.
    pub fn is_function(&self, name: &str) -> bool {
        self.top_level_functions.contains(name)
            || self
                .frames
                .iter()
                .any(|f| f.local_functions.contains(name))
    }

    pub fn is_module(&self, name: &str) -> bool {
        self.imported_modules.contains(name)
    }

    /// Classes defined in this module and every name bound by
    /// `from m import name`. Imports cannot tell a class from a function,
    /// so imported names are all treated as classes.
    pub fn is_class(&self, name: &str) -> bool {
        self.imported_classes.contains_key(name) || self.top_level_classes.contains(name)
    }

    pub(crate) fn classify(&self, name: &str) -> NameKind {
        match name {
            "True" => return NameKind::Keyword("true"),
            "False" => return NameKind::Keyword("false"),
            "None" => return NameKind::Keyword("null"),
            _ => {}
        }
        if let Some(receiver) = self.receiver()
            && receiver.name == name
        {
            return match receiver.kind {
                ReceiverKind::Instance => NameKind::This,
                ReceiverKind::Class => NameKind::Static,
            };
        }
        if self.is_global(name) {
            NameKind::Global
        } else if self.is_class(name) {
            NameKind::Class
        } else if self.is_module(name) {
            NameKind::Module
        } else {
            NameKind::Variable
        }
    }
}

pub(crate) fn starts_uppercase(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance(name: &str) -> Option<Receiver> {
        Some(Receiver {
            name: name.into(),
            kind: ReceiverKind::Instance,
        })
    }

    #[test]
    fn test_classify_priority() {
        let mut scope = ScopeContext::new();
        scope.top_level_classes.insert("Widget".into());
        scope.imported_modules.insert("os".into());

        assert_eq!(scope.classify("None"), NameKind::Keyword("null"));
        assert_eq!(scope.classify("Widget"), NameKind::Class);
        assert_eq!(scope.classify("os"), NameKind::Module);
        assert_eq!(scope.classify("x"), NameKind::Variable);

        scope.enter_function();
        scope.declare_globals(&["Widget".to_string()]);
        assert_eq!(scope.classify("Widget"), NameKind::Global);
        scope.exit_function();
        assert_eq!(scope.classify("Widget"), NameKind::Class);
    }

    #[test]
    fn test_unknown_capitalized_name_is_a_variable() {
        let scope = ScopeContext::new();
        assert_eq!(scope.classify("Label"), NameKind::Variable);
    }

    #[test]
    fn test_receiver_alias_scoped_to_method() {
        let mut scope = ScopeContext::new();
        scope.enter_method(instance("me"));
        assert_eq!(scope.classify("me"), NameKind::This);

        // No `$this` inside a nested function.
        scope.enter_function();
        assert_eq!(scope.classify("me"), NameKind::Variable);
        scope.exit_function();
        assert_eq!(scope.classify("me"), NameKind::This);

        scope.exit_function();
        assert_eq!(scope.classify("me"), NameKind::Variable);
        assert!(scope.receiver().is_none());
    }

    #[test]
    fn test_static_method_has_no_receiver() {
        let mut scope = ScopeContext::new();
        scope.enter_method(instance("self"));
        scope.exit_function();
        scope.enter_method(None);
        assert_eq!(scope.classify("self"), NameKind::Variable);
    }

    #[test]
    fn test_globals_reset_per_function() {
        let mut scope = ScopeContext::new();
        scope.enter_function();
        scope.declare_globals(&["counter".to_string()]);
        assert!(scope.is_global("counter"));
        scope.exit_function();

        scope.enter_function();
        assert!(!scope.is_global("counter"));
    }

    #[test]
    fn test_from_imports_are_classes_regardless_of_case() {
        let mut scope = ScopeContext::new();
        scope.imported_classes.insert("Button".into(), "ui".into());
        scope.imported_classes.insert("point".into(), "shapes".into());
        assert_eq!(scope.classify("Button"), NameKind::Class);
        assert_eq!(scope.classify("point"), NameKind::Class);
    }

    #[test]
    fn test_local_functions() {
        let mut scope = ScopeContext::new();
        scope.enter_function();
        scope.declare_local_function("helper");
        assert!(scope.is_function("helper"));
        scope.exit_function();
        assert!(!scope.is_function("helper"));
    }
}
