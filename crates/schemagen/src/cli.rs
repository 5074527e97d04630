//! Command-line arguments.

use clap::Parser;
use schemagen_typegen::Target;
use std::path::PathBuf;

/// Generate TypeScript types and runtime validators from a JSON Schema.
#[derive(Parser, Debug)]
#[command(name = "schemagen", version, about, long_about = None)]
pub struct Cli {
    /// JSON Schema document to read
    #[arg(short, long, value_name = "PATH")]
    pub schema: PathBuf,

    /// File to write the generated TypeScript module to
    #[arg(short, long, value_name = "PATH")]
    pub output: PathBuf,

    /// Schema to generate: `#/definitions/User` or `path=#/definitions/User,name=Account`.
    /// Repeatable; defaults to the document root
    #[arg(short = 't', long = "target", value_name = "SPEC")]
    pub targets: Vec<Target>,

    /// Config file (default: ./schemagen.toml when present)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Module specifier the runtime contract types are imported from
    #[arg(long, value_name = "MODULE")]
    pub runtime_import: Option<String>,

    /// Also write the runtime contract module to this path
    #[arg(long, value_name = "PATH")]
    pub emit_runtime: Option<PathBuf>,

    /// Log generation details (overridden by RUST_LOG)
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_repeated_targets() {
        let cli = Cli::try_parse_from([
            "schemagen",
            "-s",
            "schema.json",
            "-o",
            "out.ts",
            "-t",
            "#/definitions/User",
            "--target",
            "path=#/$defs/user,name=Member",
        ])
        .unwrap();
        assert_eq!(cli.targets.len(), 2);
        assert_eq!(cli.targets[0].pointer.to_string(), "#/definitions/User");
        assert_eq!(cli.targets[1].name.as_deref(), Some("Member"));
        assert!(!cli.verbose);
        assert!(cli.runtime_import.is_none());
    }

    #[test]
    fn schema_and_output_are_required() {
        assert!(Cli::try_parse_from(["schemagen", "-s", "schema.json"]).is_err());
        assert!(Cli::try_parse_from(["schemagen", "-o", "out.ts"]).is_err());
    }

    #[test]
    fn malformed_targets_are_usage_errors() {
        let err = Cli::try_parse_from([
            "schemagen",
            "-s",
            "schema.json",
            "-o",
            "out.ts",
            "-t",
            "definitions/User",
        ])
        .unwrap_err();
        assert!(err.to_string().contains("definitions/User"), "{err}");
    }
}
