//! Python 2 to PHP source translation.
//!
//! `py2php-translate` walks a [`py2php_ast::Module`] and writes PHP text
//! that runs against the `libpy2php` runtime library. It maps syntax, not
//! deep semantics: Python behavior that PHP lacks natively (iteration,
//! keyword arguments, slicing) goes through `pyjslib_*` helper calls.
//!
//! # Architecture
//!
//! ```text
//! ModuleResolver ── locate ─> ParseCache ─> PlatformOverlay::merge
//!       │                                          │
//!       └──────────── Translator <─────────────────┘
//!                  (scope, registry, expr / stmt / class)
//! ```
//!
//! One [`ModuleResolver`] is one translation run. It owns the
//! [`ClassRegistry`] that every module's [`Translator`] reads and extends,
//! so class shapes learned from one module inform calls in the next.
//!
//! # Example
//!
//! ```ignore
//! use py2php_translate::{ModuleResolver, TranslateConfig};
//!
//! let config = TranslateConfig::load(Path::new("app"))?;
//! let mut resolver = ModuleResolver::new(&config, &py2php_ast::JSON_PARSER);
//! let php = resolver.translate_app("main")?;
//! ```

mod builtins;
mod call;
mod class;
pub mod config;
pub mod error;
mod expr;
mod function;
pub mod locate;
pub mod overlay;
pub mod registry;
pub mod resolver;
pub mod scope;
mod stmt;
mod text;
pub mod translator;

pub use config::{ConfigError, TranslateConfig};
pub use error::{Result, TranslateError};
pub use expr::use_concat;
pub use locate::ModuleLocator;
pub use overlay::{ParseCache, PlatformOverlay, merge};
pub use registry::{ClassInfo, ClassRegistry};
pub use resolver::ModuleResolver;
pub use scope::ScopeContext;
pub use stmt::dict_iteration_suffix;
pub use translator::{DEFAULT_LIBRARY_PREFIX, PREAMBLE, TranslationUnit, Translator, translate_program};
