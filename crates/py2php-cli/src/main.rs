//! `py2php`: translate a Python 2 program, given as a syntax-tree
//! document, into a PHP program.

mod logging;
mod math_names;

use anyhow::{Context, Result};
use clap::Parser;
use py2php_ast::JSON_PARSER;
use py2php_translate::{ModuleResolver, TranslateConfig};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

/// Translate a Python 2 program to PHP
#[derive(Parser, Debug)]
#[command(name = "py2php")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Syntax-tree document of the program
    file: PathBuf,

    /// Module name for the program (defaults to the file stem)
    module: Option<String>,

    /// Output file (defaults to <stem>.php next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Config file to use instead of py2php.toml next to the input
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Platform whose override files apply
    #[arg(short, long)]
    platform: Option<String>,

    /// Library directory searched before the configured ones (repeatable)
    #[arg(short = 'L', long = "library-dir")]
    library_dirs: Vec<PathBuf>,

    /// Leave out the runtime-library preamble
    #[arg(long)]
    no_preamble: bool,

    /// More log output (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(&cli) {
        Ok(output) => {
            println!("File written to: {}", output.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<PathBuf> {
    let input_dir = cli
        .file
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    let mut config = match &cli.config {
        Some(path) => TranslateConfig::load_file(path)?,
        None => TranslateConfig::load(input_dir)?,
    };
    for dir in cli.library_dirs.iter().rev() {
        config.prepend_search_path(dir.clone());
    }
    config.prepend_search_path(input_dir);
    if let Some(platform) = &cli.platform {
        config.platform.name = Some(platform.clone());
    }
    if cli.no_preamble {
        config.output.preamble = false;
    }

    let module = match &cli.module {
        Some(module) => module.clone(),
        None => cli
            .file
            .file_stem()
            .and_then(|stem| stem.to_str())
            .map(str::to_string)
            .with_context(|| format!("no module name in {}", cli.file.display()))?,
    };

    let mut resolver = ModuleResolver::new(&config, &JSON_PARSER);
    let unit = resolver
        .resolve_file(&module, &cli.file)
        .with_context(|| format!("failed to translate {}", cli.file.display()))?;
    let mut php = resolver
        .translate_app(&module)
        .with_context(|| format!("failed to translate {}", cli.file.display()))?;
    if unit.imported_modules.iter().any(|m| m == "math") {
        php = math_names::rewrite(&php);
    }

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| cli.file.with_extension("php"));
    std::fs::write(&output, format!("<?php {php}"))
        .with_context(|| format!("failed to write {}", output.display()))?;
    info!(module = %module, path = %output.display(), "Wrote program");
    Ok(output)
}
