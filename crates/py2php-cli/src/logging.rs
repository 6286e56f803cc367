//! Log output for the command line.
//!
//! `PY2PHP_LOG` takes `RUST_LOG` syntax and wins over `RUST_LOG`. With
//! neither set, `-v` picks the level: warnings by default, `-v` for info
//! (imports and includes), `-vv` for debug.
//!
//! ```bash
//! PY2PHP_LOG=py2php_translate=debug py2php app.json
//! ```

use tracing_subscriber::EnvFilter;

fn default_level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

fn build_filter(verbosity: u8) -> EnvFilter {
    if let Ok(val) = std::env::var("PY2PHP_LOG") {
        return EnvFilter::builder().parse_lossy(val);
    }
    if std::env::var("RUST_LOG").is_ok() {
        return EnvFilter::from_default_env();
    }
    EnvFilter::new(default_level(verbosity))
}

/// Install the global subscriber. Output goes to stderr.
pub fn init(verbosity: u8) {
    tracing_subscriber::fmt()
        .with_env_filter(build_filter(verbosity))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(default_level(0), "warn");
        assert_eq!(default_level(1), "info");
        assert_eq!(default_level(2), "debug");
        assert_eq!(default_level(9), "debug");
    }
}
