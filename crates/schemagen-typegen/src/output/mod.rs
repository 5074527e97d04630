//! Code generation from normalized schemas.
//!
//! [`types`] compiles schema nodes into TypeScript type declarations and
//! [`validator`] compiles them into validation plans, TypeScript validator
//! functions and an in-process evaluator. Both read the same [`Context`].

pub mod types;
pub mod validator;

use crate::input::SchemaDocument;
use crate::names::{EntryNames, NameRegistry};
use crate::pointer::Pointer;
use serde_json::Value;
use tracing::warn;

/// Read-only state shared by the compilers during one generation run.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    pub doc: SchemaDocument<'a>,
    pub registry: &'a NameRegistry,
}

/// Where a `$ref` leads.
#[derive(Debug)]
pub(crate) enum RefTarget<'a> {
    /// A generated entry; reference it by name.
    Registered(&'a Pointer, &'a EntryNames),
    /// Not generated; the schema has to be expanded in place.
    Inline(Pointer, &'a Value),
    Unresolved,
}

impl<'a> Context<'a> {
    pub fn new(doc: SchemaDocument<'a>, registry: &'a NameRegistry) -> Self {
        Self { doc, registry }
    }

    /// Resolve `reference` against the registry, falling back to the
    /// normalizer and then to a definitions lookup. Every fallback warns.
    pub(crate) fn resolve_ref(&self, reference: &str) -> RefTarget<'a> {
        if let Ok(pointer) = Pointer::parse_ref(reference) {
            if let Some((pointer, names)) = self.registry.get_key_value(&pointer) {
                return RefTarget::Registered(pointer, names);
            }
        }

        let resolved = match self.doc.resolve_ref(reference) {
            Some(found) => {
                warn!(reference, "unregistered $ref resolved through the schema normalizer");
                Some(found)
            }
            None => self.definitions_lookup(reference),
        };

        match resolved {
            Some((pointer, value)) => match self.registry.get_key_value(&pointer) {
                Some((pointer, names)) => RefTarget::Registered(pointer, names),
                None => RefTarget::Inline(pointer, value),
            },
            None => {
                warn!(reference, "unresolvable $ref, falling back to unknown");
                RefTarget::Unresolved
            }
        }
    }

    fn definitions_lookup(&self, reference: &str) -> Option<(Pointer, &'a Value)> {
        let name = reference.rsplit('/').next().filter(|s| !s.is_empty())?;
        let raw = self.doc.raw();
        self.doc.draft().definitions_keys().into_iter().find_map(|key| {
            let value = raw.get(key)?.get(name)?;
            warn!(reference, "unregistered $ref found under `{key}` by name");
            Some((Pointer::from_segments([key, name]), value))
        })
    }
}
