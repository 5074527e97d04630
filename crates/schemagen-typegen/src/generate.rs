//! One generation run: a schema and its targets in, one TypeScript module out.

use crate::collect::collect;
use crate::error::GenerateError;
use crate::input::SchemaDocument;
use crate::names::NameRegistry;
use crate::output::validator::{
    self, Plan, PlanSet, ValidationOptions, ValidationResult, validator_functions,
};
use crate::output::{Context, types};
use crate::pointer::Pointer;
use crate::runtime::{DEFAULT_RUNTIME_IMPORT, RUNTIME_TYPES};
use crate::target::Target;
use schemagen_surface_syntax::{Program, Stmt, TYPESCRIPT_WRITER, Writer};
use serde_json::Value;
use tracing::{debug, info};

/// Options for [`generate`].
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// File name of the schema; names the root type and the header.
    pub source_name: Option<String>,
    /// Module specifier the runtime contract types are imported from.
    pub runtime_import: String,
    /// Extra header comment, one `//` line per line.
    pub header: Option<String>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            source_name: None,
            runtime_import: DEFAULT_RUNTIME_IMPORT.to_string(),
            header: None,
        }
    }
}

/// One collected pointer and everything generated for it.
#[derive(Debug, Clone)]
pub struct GeneratedEntry {
    pub pointer: Pointer,
    pub type_name: String,
    pub validator_name: String,
    pub exported: bool,
    pub type_declaration: Stmt,
    /// The safe validator, followed by the throwing wrapper when exported.
    pub validators: Vec<Stmt>,
}

/// Result of a generation run.
#[derive(Debug, Clone)]
pub struct Generation {
    pub entries: Vec<GeneratedEntry>,
    pub plans: PlanSet,
    source_name: Option<String>,
    runtime_import: String,
    header: Option<String>,
}

impl Generation {
    /// Render the whole output module.
    pub fn text(&self) -> String {
        let banner = match &self.source_name {
            Some(source) => format!("Generated by schemagen from {source}. Do not edit."),
            None => "Generated by schemagen. Do not edit.".to_string(),
        };
        let mut body = vec![Stmt::comment(banner)];
        body.extend(self.header.iter().flat_map(|h| h.lines()).map(Stmt::comment));
        body.push(Stmt::import_types(
            RUNTIME_TYPES.iter().map(|name| name.to_string()).collect(),
            &self.runtime_import,
        ));
        body.extend(self.entries.iter().map(|e| e.type_declaration.clone()));
        body.extend(self.entries.iter().flat_map(|e| e.validators.iter().cloned()));
        TYPESCRIPT_WRITER.write(&Program::new(body))
    }

    pub fn entry(&self, type_name: &str) -> Option<&GeneratedEntry> {
        self.entries.iter().find(|e| e.type_name == type_name)
    }

    /// Run the validator generated for `type_name` against `value`.
    pub fn validate(
        &self,
        type_name: &str,
        value: &Value,
        options: ValidationOptions,
    ) -> Option<ValidationResult> {
        let (pointer, _) = self.plans.by_type_name(type_name)?;
        self.plans.validate(pointer, value, options)
    }
}

/// Generate types and validators for `targets` in `schema`.
///
/// No targets means the document root. Every requested target must
/// resolve; the dependency walk, naming and collision checks all finish
/// before any code is generated.
pub fn generate(
    schema: &Value,
    targets: &[Target],
    options: &GenerateOptions,
) -> Result<Generation, GenerateError> {
    let doc = SchemaDocument::new(schema)?;
    let root = [Target::root()];
    let targets = if targets.is_empty() { &root[..] } else { targets };
    debug!(draft = ?doc.draft(), targets = targets.len(), "starting generation");

    let requested: Vec<Pointer> = targets.iter().map(|t| t.pointer.clone()).collect();
    let collected = collect(&doc, &requested)?;
    let registry = NameRegistry::build(&collected, targets, options.source_name.as_deref())?;
    let ctx = Context::new(doc, &registry);

    let mut entries = Vec::with_capacity(collected.len());
    let mut plans = PlanSet::default();
    for pointer in &collected {
        let names = registry.get(pointer).ok_or_else(|| {
            GenerateError::Internal(format!("no name registered for {pointer}"))
        })?;
        let node = doc.node_at(pointer)?;
        let type_declaration = types::declaration(&ctx, &node, names);
        let plan = Plan {
            type_name: names.type_name.clone(),
            validator_name: names.validator_name.clone(),
            exported: names.exported,
            check: validator::compile(&ctx, &node),
        };
        entries.push(GeneratedEntry {
            pointer: pointer.clone(),
            type_name: names.type_name.clone(),
            validator_name: names.validator_name.clone(),
            exported: names.exported,
            type_declaration,
            validators: validator_functions(&plan),
        });
        plans.insert(pointer.clone(), plan);
    }

    info!(entries = entries.len(), "generated types and validators");
    Ok(Generation {
        entries,
        plans,
        source_name: options.source_name.clone(),
        runtime_import: options.runtime_import.clone(),
        header: options.header.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_targets_mean_the_root() {
        let schema = json!({ "type": "string" });
        let generation = generate(&schema, &[], &GenerateOptions::default()).unwrap();
        assert_eq!(generation.entries.len(), 1);
        assert_eq!(generation.entries[0].type_name, "Root");
        assert!(generation.entries[0].exported);
    }

    #[test]
    fn header_and_import_come_first() {
        let schema = json!({ "type": "boolean" });
        let options = GenerateOptions {
            source_name: Some("flag.json".into()),
            runtime_import: "@acme/runtime".into(),
            header: Some("Owned by the platform team".into()),
        };
        let text = generate(&schema, &[], &options).unwrap().text();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("// Generated by schemagen from flag.json. Do not edit."));
        assert_eq!(lines.next(), Some("// Owned by the platform team"));
        assert_eq!(
            lines.next(),
            Some("import type { ValidationIssue, ValidationOptions, ValidationResult } from \"@acme/runtime\";")
        );
        assert!(text.contains("export type Flag = boolean;"), "{text}");
    }

    #[test]
    fn unknown_target_is_fatal() {
        let schema = json!({ "definitions": {} });
        let targets = [Target::new(Pointer::parse("#/definitions/Missing").unwrap())];
        let err = generate(&schema, &targets, &GenerateOptions::default()).unwrap_err();
        assert!(matches!(err, GenerateError::Pointer(_)), "{err}");
    }
}
