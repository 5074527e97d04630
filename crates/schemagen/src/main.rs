//! schemagen CLI entry point.
//!
//! Reads a JSON Schema, generates one TypeScript module of types and
//! validators, and optionally writes the runtime contract module next to it.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use schemagen_typegen::{DEFAULT_RUNTIME_IMPORT, GenerateOptions, RUNTIME_MODULE, generate};
use tempfile::NamedTempFile;
use tracing_subscriber::EnvFilter;

mod cli;
mod config;

use cli::Cli;
use config::Config;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // Help and version go to stdout and are not failures.
            let code = if err.use_stderr() { 1 } else { 0 };
            let _ = err.print();
            return ExitCode::from(code);
        }
    };

    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(1)
        }
    }
}

/// `RUST_LOG` wins; otherwise `debug` with `--verbose`, else `warn`.
fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    let raw = fs::read_to_string(&cli.schema)
        .with_context(|| format!("failed to read schema {}", cli.schema.display()))?;
    let schema: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse {} as JSON", cli.schema.display()))?;

    let targets = if cli.targets.is_empty() {
        config.targets()?
    } else {
        cli.targets.clone()
    };
    let options = GenerateOptions {
        source_name: cli
            .schema
            .file_name()
            .map(|name| name.to_string_lossy().into_owned()),
        runtime_import: cli
            .runtime_import
            .clone()
            .or(config.runtime_import)
            .unwrap_or_else(|| DEFAULT_RUNTIME_IMPORT.to_string()),
        header: config.header,
    };

    let generation = generate(&schema, &targets, &options)
        .with_context(|| format!("failed to generate from {}", cli.schema.display()))?;
    // Rendered in full before anything touches the filesystem.
    let text = generation.text();

    // Both files are staged before either lands, and the generated module
    // lands last.
    let output = stage(&cli.output, &text)?;
    let runtime = match &cli.emit_runtime {
        Some(path) => Some((stage(path, RUNTIME_MODULE.as_str())?, path)),
        None => None,
    };
    if let Some((staged, path)) = runtime {
        commit(staged, path)?;
        tracing::info!(output = %path.display(), "wrote runtime contract module");
    }
    commit(output, &cli.output)?;
    tracing::info!(
        output = %cli.output.display(),
        entries = generation.entries.len(),
        "wrote generated module"
    );
    Ok(())
}

/// Write `contents` to a temporary file beside `path`.
fn stage(path: &Path, contents: &str) -> Result<NamedTempFile> {
    let dir = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
            parent
        }
        None => Path::new("."),
    };
    let mut builder = tempfile::Builder::new();
    // Temporary files default to owner-only access.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o644));
    }
    let mut file: NamedTempFile = builder
        .tempfile_in(dir)
        .with_context(|| format!("failed to stage {}", path.display()))?;
    file.write_all(contents.as_bytes())
        .with_context(|| format!("failed to stage {}", path.display()))?;
    Ok(file)
}

fn commit(staged: NamedTempFile, path: &Path) -> Result<()> {
    staged
        .persist(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
