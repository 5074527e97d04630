//! Dependency collection over `$ref` graphs.

use crate::error::GenerateError;
use crate::input::SchemaDocument;
use crate::input::jsonschema::child_position;
use crate::pointer::Pointer;
use indexmap::IndexSet;
use serde_json::Value;
use tracing::{debug, warn};

/// Expand `requested` into every pointer reachable through `$ref`.
///
/// Requested pointers must resolve; a failure there is fatal. Broken or
/// non-local references found during the walk are warned about and
/// skipped. The result is in depth-first preorder.
pub fn collect(
    doc: &SchemaDocument<'_>,
    requested: &[Pointer],
) -> Result<IndexSet<Pointer>, GenerateError> {
    for pointer in requested {
        pointer.resolve(doc.raw())?;
    }

    let mut visited = IndexSet::new();
    for pointer in requested {
        visit(doc, pointer.clone(), &mut visited);
    }
    debug!(count = visited.len(), "collected schema pointers");
    Ok(visited)
}

fn visit(doc: &SchemaDocument<'_>, pointer: Pointer, visited: &mut IndexSet<Pointer>) {
    if visited.contains(&pointer) {
        return;
    }
    let value = match pointer.resolve(doc.raw()) {
        Ok(value) => value,
        Err(err) => {
            warn!("skipping unresolvable reference: {err}");
            return;
        }
    };
    visited.insert(pointer);

    let mut refs = Vec::new();
    scan_refs(value, false, &mut refs);
    for reference in refs {
        if reference != "#" && !reference.starts_with("#/") {
            warn!(reference, "skipping unsupported non-local $ref");
            continue;
        }
        match Pointer::parse_ref(reference) {
            Ok(target) => visit(doc, target, visited),
            Err(err) => warn!("skipping malformed $ref: {err}"),
        }
    }
}

/// Every `$ref` string under `value`, in document order.
fn scan_refs<'v>(value: &'v Value, in_name_map: bool, out: &mut Vec<&'v str>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                if !in_name_map && key == "$ref" {
                    if let Value::String(reference) = child {
                        out.push(reference);
                    }
                    continue;
                }
                if let Some(child_in_name_map) = child_position(in_name_map, key) {
                    scan_refs(child, child_in_name_map, out);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                scan_refs(item, false, out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pointers(raw: &Value, requested: &[&str]) -> Vec<String> {
        let doc = SchemaDocument::new(raw).unwrap();
        let requested: Vec<Pointer> = requested
            .iter()
            .map(|p| Pointer::parse_ref(p).unwrap())
            .collect();
        collect(&doc, &requested)
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn follows_refs_depth_first() {
        let raw = json!({
            "definitions": {
                "User": { "properties": { "address": { "$ref": "#/definitions/Address" } } },
                "Address": { "properties": { "country": { "$ref": "#/definitions/Country" } } },
                "Country": { "type": "string" },
                "Unused": { "type": "string" }
            }
        });
        assert_eq!(
            pointers(&raw, &["#/definitions/User"]),
            [
                "#/definitions/User",
                "#/definitions/Address",
                "#/definitions/Country"
            ]
        );
    }

    #[test]
    fn cycles_terminate() {
        let raw = json!({
            "definitions": {
                "Node": {
                    "properties": {
                        "next": { "$ref": "#/definitions/Node" },
                        "root": { "$ref": "#" }
                    }
                }
            },
            "$ref": "#/definitions/Node"
        });
        assert_eq!(
            pointers(&raw, &["#/definitions/Node"]),
            ["#/definitions/Node", "#"]
        );
    }

    #[test]
    fn skips_broken_external_and_data_refs() {
        let raw = json!({
            "properties": {
                "a": { "$ref": "#/definitions/Missing" },
                "b": { "$ref": "other.json#/x" },
                "c": { "const": { "$ref": "#/definitions/Real" } },
                "d": { "$ref": "#/definitions/Real" }
            },
            "definitions": { "Real": {} }
        });
        assert_eq!(pointers(&raw, &["#"]), ["#", "#/definitions/Real"]);
    }

    #[test]
    fn properties_named_like_data_keywords_are_scanned() {
        let raw = json!({
            "$defs": {
                "Outer": {
                    "properties": {
                        "default": { "$ref": "#/$defs/Cfg" },
                        "$ref": { "$ref": "#/$defs/Leaf" }
                    }
                },
                "Cfg": { "properties": { "child": { "$ref": "#/$defs/Cfg" } } },
                "Leaf": { "type": "string" },
                "const": { "type": "number" }
            },
            "properties": { "n": { "$ref": "#/$defs/const" } }
        });
        assert_eq!(
            pointers(&raw, &["#/$defs/Outer"]),
            ["#/$defs/Outer", "#/$defs/Cfg", "#/$defs/Leaf"]
        );
        assert_eq!(
            pointers(&raw, &["#"]),
            ["#", "#/$defs/Cfg", "#/$defs/Leaf", "#/$defs/const"]
        );
    }

    #[test]
    fn unresolvable_request_is_fatal() {
        let raw = json!({});
        let doc = SchemaDocument::new(&raw).unwrap();
        let err = collect(&doc, &[Pointer::parse("#/definitions/Nope").unwrap()]).unwrap_err();
        assert!(matches!(err, GenerateError::Pointer(_)));
    }
}
