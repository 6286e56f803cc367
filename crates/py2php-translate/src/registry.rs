//! Classes seen across a translation run.
//!
//! The registry outlives individual modules so that a class defined in one
//! module is recognized when another module names it, even without an
//! explicit `from x import Class`.

use std::collections::HashMap;
use tracing::debug;

/// What the translator knows about one class.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassInfo {
    pub name: String,
    /// Single translated base, when the class has exactly one.
    pub base: Option<String>,
    /// Declared method names, in their translated spelling.
    pub methods: Vec<String>,
}

impl ClassInfo {
    pub fn declares(&self, method: &str) -> bool {
        self.methods.iter().any(|m| m == method)
    }
}

/// Run-wide class registry. Entries are never removed.
#[derive(Debug, Default)]
pub struct ClassRegistry {
    classes: HashMap<String, ClassInfo>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a class definition, extending any earlier entry for the name.
    pub fn define(&mut self, name: &str, base: Option<String>, methods: Vec<String>) {
        let info = self
            .classes
            .entry(name.to_string())
            .or_insert_with(|| ClassInfo {
                name: name.to_string(),
                ..ClassInfo::default()
            });
        if base.is_some() {
            info.base = base;
        }
        for method in methods {
            if !info.declares(&method) {
                info.methods.push(method);
            }
        }
        debug!(class = name, methods = info.methods.len(), "Registered class");
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&ClassInfo> {
        self.classes.get(name)
    }

    /// Whether `class` or one of its registered ancestors declares `method`.
    pub fn has_method(&self, class: &str, method: &str) -> bool {
        let mut current = self.classes.get(class);
        let mut hops = 0;
        while let Some(info) = current {
            if info.declares(method) {
                return true;
            }
            hops += 1;
            if hops > self.classes.len() {
                break;
            }
            current = info.base.as_deref().and_then(|base| self.classes.get(base));
        }
        false
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
