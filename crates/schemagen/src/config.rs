//! `schemagen.toml` configuration.
//!
//! Every field is optional. Command-line flags take precedence over the
//! file, and the file over built-in defaults.

use anyhow::{Context, Result};
use schemagen_typegen::{Pointer, Target};
use serde::Deserialize;
use std::path::Path;

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "schemagen.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Module specifier for the runtime contract types.
    pub runtime_import: Option<String>,
    /// Extra header comment line(s) for generated files.
    pub header: Option<String>,
    pub targets: Vec<TargetEntry>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetEntry {
    pub path: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl Config {
    /// Load `explicit`, or `./schemagen.toml` if it exists, or defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        let implicit = Path::new(DEFAULT_CONFIG_FILE);
        if implicit.is_file() {
            tracing::debug!(path = DEFAULT_CONFIG_FILE, "using config from working directory");
            return Self::from_file(implicit);
        }
        Ok(Self::default())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// The configured targets, in file order.
    pub fn targets(&self) -> Result<Vec<Target>> {
        self.targets
            .iter()
            .map(|entry| -> Result<Target> {
                let pointer = Pointer::parse_ref(&entry.path)
                    .with_context(|| format!("invalid config target `{}`", entry.path))?;
                Ok(match &entry.name {
                    Some(name) => Target::named(pointer, name.clone()),
                    None => Target::new(pointer),
                })
            })
            .collect()
    }
}
