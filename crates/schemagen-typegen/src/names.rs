//! Name assignment for collected pointers.

use crate::error::GenerateError;
use crate::pointer::Pointer;
use crate::runtime::RUNTIME_TYPES;
use crate::target::Target;
use indexmap::IndexMap;
use std::collections::HashMap;

/// Type names the generated module already binds: the imported runtime
/// contract types plus the `Record` utility type used for open objects.
pub const RESERVED_TYPE_NAMES: [&str; 4] = [
    RUNTIME_TYPES[0],
    RUNTIME_TYPES[1],
    RUNTIME_TYPES[2],
    "Record",
];

/// Names assigned to one generated entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryNames {
    pub type_name: String,
    pub validator_name: String,
    /// Requested directly rather than pulled in as a dependency.
    pub exported: bool,
}

/// Pointer → name mapping shared by both compilers.
///
/// Built in one pass over the whole collected set, so a collision anywhere
/// surfaces before any code is emitted.
#[derive(Debug, Clone, Default)]
pub struct NameRegistry {
    by_pointer: IndexMap<Pointer, EntryNames>,
    by_name: HashMap<String, Pointer>,
    by_validator: HashMap<String, Pointer>,
}

impl NameRegistry {
    /// Assign names to `pointers` in order.
    ///
    /// `source_name` is the schema file name used for the root pointer.
    pub fn build<'p>(
        pointers: impl IntoIterator<Item = &'p Pointer>,
        targets: &[Target],
        source_name: Option<&str>,
    ) -> Result<Self, GenerateError> {
        let mut registry = Self::default();
        for pointer in pointers {
            let target = targets.iter().find(|t| &t.pointer == pointer);
            let type_name = match target.and_then(|t| t.name.as_deref()) {
                Some(explicit) => explicit.to_string(),
                None => derived_name(pointer, source_name),
            };
            registry.insert(pointer.clone(), type_name, target.is_some())?;
        }
        Ok(registry)
    }

    fn insert(
        &mut self,
        pointer: Pointer,
        type_name: String,
        exported: bool,
    ) -> Result<(), GenerateError> {
        if RESERVED_TYPE_NAMES.contains(&type_name.as_str()) {
            return Err(GenerateError::ReservedName {
                name: type_name,
                pointer,
            });
        }
        let validator_name = validator_name(&type_name);
        claim(&mut self.by_name, &type_name, &pointer)?;
        claim(&mut self.by_validator, &validator_name, &pointer)?;
        self.by_pointer.insert(
            pointer,
            EntryNames {
                validator_name,
                type_name,
                exported,
            },
        );
        Ok(())
    }

    pub fn get(&self, pointer: &Pointer) -> Option<&EntryNames> {
        self.by_pointer.get(pointer)
    }

    pub fn get_key_value(&self, pointer: &Pointer) -> Option<(&Pointer, &EntryNames)> {
        self.by_pointer.get_key_value(pointer)
    }

    pub fn contains(&self, pointer: &Pointer) -> bool {
        self.by_pointer.contains_key(pointer)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Pointer, &EntryNames)> {
        self.by_pointer.iter()
    }

    pub fn len(&self) -> usize {
        self.by_pointer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_pointer.is_empty()
    }
}

/// Bind `name` to `pointer`, failing if another pointer already holds it.
fn claim(
    taken: &mut HashMap<String, Pointer>,
    name: &str,
    pointer: &Pointer,
) -> Result<(), GenerateError> {
    match taken.get(name) {
        Some(existing) if existing != pointer => Err(GenerateError::NameCollision {
            name: name.to_string(),
            first: existing.clone(),
            second: pointer.clone(),
        }),
        _ => {
            taken.insert(name.to_string(), pointer.clone());
            Ok(())
        }
    }
}

fn derived_name(pointer: &Pointer, source_name: Option<&str>) -> String {
    let raw = match pointer.last() {
        Some(segment) => segment.to_string(),
        None => source_name.map(file_stem).unwrap_or_default(),
    };
    let name = pascal_case(&raw);
    if name.is_empty() {
        return "Root".to_string();
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        return format!("T{name}");
    }
    name
}

fn file_stem(file_name: &str) -> String {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    match base.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => base.to_string(),
    }
}

/// Split on anything that is not an identifier character and capitalize
/// each piece. Empty pieces vanish.
pub fn pascal_case(input: &str) -> String {
    input
        .split(|c: char| !(c.is_alphanumeric() || c == '$'))
        .filter(|segment| !segment.is_empty())
        .map(capitalize)
        .collect()
}

/// `validate` + the type name with its first character uppercased.
pub fn validator_name(type_name: &str) -> String {
    format!("validate{}", capitalize(type_name))
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
