//! JSON Schema normalizer.
//!
//! Reads raw JSON Schema (drafts 04 through 2020-12) into [`SchemaNode`]s
//! and answers pointer/anchor resolution queries against the raw document.

use crate::error::GenerateError;
use crate::ir::*;
use crate::pointer::Pointer;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::debug;

/// Keywords whose values are instance data rather than subschemas.
const DATA_KEYWORDS: [&str; 4] = ["const", "enum", "default", "examples"];

/// Keywords whose values map user-chosen names to subschemas.
const NAME_MAP_KEYWORDS: [&str; 6] = [
    "properties",
    "patternProperties",
    "$defs",
    "definitions",
    "dependentSchemas",
    "dependencies",
];

/// Where a child of a raw JSON object sits during a walk of schema JSON.
///
/// `in_name_map` is true when the object is a name map (the value of
/// `properties`, `$defs` and friends), whose keys are names, not keywords.
/// Returns `None` for instance data that must not be searched, otherwise
/// whether the child is itself a name map.
pub(crate) fn child_position(in_name_map: bool, key: &str) -> Option<bool> {
    if in_name_map {
        return Some(false);
    }
    if DATA_KEYWORDS.contains(&key) {
        return None;
    }
    Some(NAME_MAP_KEYWORDS.contains(&key))
}

/// A raw schema document plus its detected draft.
#[derive(Debug, Clone, Copy)]
pub struct SchemaDocument<'a> {
    raw: &'a Value,
    draft: Draft,
}

impl<'a> SchemaDocument<'a> {
    pub fn new(raw: &'a Value) -> Result<Self, GenerateError> {
        if !raw.is_object() && !raw.is_boolean() {
            return Err(GenerateError::InvalidSchema(format!(
                "schema document must be an object or a boolean, found {}",
                json_kind(raw)
            )));
        }
        let draft = Draft::detect(raw.get("$schema").and_then(Value::as_str));
        debug!(?draft, "detected schema draft");
        Ok(Self { raw, draft })
    }

    pub fn raw(&self) -> &'a Value {
        self.raw
    }

    pub fn draft(&self) -> Draft {
        self.draft
    }

    /// Normalize the schema at `pointer`.
    pub fn node_at(&self, pointer: &Pointer) -> Result<SchemaNode, GenerateError> {
        Ok(self.node(pointer.resolve(self.raw)?))
    }

    /// Normalize one schema location.
    pub fn node(&self, value: &Value) -> SchemaNode {
        let map = match value {
            Value::Bool(true) => return SchemaNode::new(SchemaKind::Any),
            Value::Bool(false) => return SchemaNode::new(SchemaKind::Never),
            Value::Object(map) => map,
            _ => return SchemaNode::new(SchemaKind::Any),
        };
        SchemaNode {
            kind: self.kind(map),
            description: map
                .get("description")
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }

    fn kind(&self, map: &Map<String, Value>) -> SchemaKind {
        if let Some(value) = map.get("const") {
            return SchemaKind::Const(value.clone());
        }
        if let Some(Value::Array(values)) = map.get("enum") {
            return SchemaKind::Enum(values.clone());
        }
        if let Some(branches) = self.branches(map, "oneOf") {
            return SchemaKind::OneOf(branches);
        }
        if let Some(branches) = self.branches(map, "anyOf") {
            return SchemaKind::AnyOf(branches);
        }
        if let Some(branches) = self.branches(map, "allOf") {
            return SchemaKind::AllOf(branches);
        }
        if let Some(Value::String(reference)) = map.get("$ref") {
            return SchemaKind::Ref(reference.clone());
        }

        match map.get("type") {
            Some(Value::String(name)) => self.typed(map, name),
            Some(Value::Array(names)) => {
                let primitives: Vec<PrimitiveType> = names
                    .iter()
                    .filter_map(Value::as_str)
                    .filter_map(PrimitiveType::from_name)
                    .collect();
                match primitives.as_slice() {
                    [] => SchemaKind::Any,
                    [single] => self.typed(map, single.name()),
                    _ => SchemaKind::TypeUnion(primitives),
                }
            }
            _ if map.contains_key("properties") => self.object(map),
            _ if map.contains_key("items") || map.contains_key("prefixItems") => self.array(map),
            _ => SchemaKind::Any,
        }
    }

    fn typed(&self, map: &Map<String, Value>, name: &str) -> SchemaKind {
        match PrimitiveType::from_name(name) {
            Some(PrimitiveType::String) => SchemaKind::String(StringConstraints {
                min_length: uint(map, "minLength"),
                max_length: uint(map, "maxLength"),
                pattern: map
                    .get("pattern")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            }),
            Some(PrimitiveType::Number) => SchemaKind::Number(number(map, false)),
            Some(PrimitiveType::Integer) => SchemaKind::Number(number(map, true)),
            Some(PrimitiveType::Boolean) => SchemaKind::Boolean,
            Some(PrimitiveType::Null) => SchemaKind::Null,
            Some(PrimitiveType::Array) => self.array(map),
            Some(PrimitiveType::Object) => self.object(map),
            None => {
                debug!(name, "unrecognized type keyword, treating as unknown");
                SchemaKind::Any
            }
        }
    }

    fn branches(&self, map: &Map<String, Value>, keyword: &str) -> Option<Vec<SchemaNode>> {
        match map.get(keyword) {
            Some(Value::Array(items)) => Some(items.iter().map(|v| self.node(v)).collect()),
            _ => None,
        }
    }

    fn array(&self, map: &Map<String, Value>) -> SchemaKind {
        let items = match map.get("items") {
            Some(Value::Array(list)) => Some(Items::List(list.iter().map(|v| self.node(v)).collect())),
            Some(single @ (Value::Object(_) | Value::Bool(_))) => {
                Some(Items::Single(Box::new(self.node(single))))
            }
            _ => None,
        };
        SchemaKind::Array(ArraySchema {
            items,
            prefix_items: self.branches(map, "prefixItems"),
            min_items: uint(map, "minItems"),
            max_items: uint(map, "maxItems"),
            unique_items: map.get("uniqueItems").and_then(Value::as_bool) == Some(true),
        })
    }

    fn object(&self, map: &Map<String, Value>) -> SchemaKind {
        let properties = map.get("properties").and_then(Value::as_object).map(|props| {
            props
                .iter()
                .map(|(key, value)| (key.clone(), self.node(value)))
                .collect::<IndexMap<_, _>>()
        });
        let required = map
            .get("required")
            .and_then(Value::as_array)
            .map(|keys| {
                keys.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        SchemaKind::Object(ObjectSchema {
            properties,
            required,
            additional_properties: map.get("additionalProperties").and_then(Value::as_bool),
            min_properties: uint(map, "minProperties"),
            max_properties: uint(map, "maxProperties"),
        })
    }

    /// Resolve a `$ref` value against this document.
    ///
    /// Supports `#`, `#/...` pointers and plain-name anchors. Returns `None`
    /// for anything unresolvable, including external references.
    pub fn resolve_ref(&self, reference: &str) -> Option<(Pointer, &'a Value)> {
        if reference == "#" || reference.starts_with("#/") {
            let pointer = Pointer::parse_ref(reference).ok()?;
            let value = pointer.resolve(self.raw).ok()?;
            return Some((pointer, value));
        }
        let anchor = reference.strip_prefix('#')?;
        if anchor.is_empty() {
            return None;
        }
        self.find_anchor(self.raw, &Pointer::root(), anchor, false)
    }

    fn find_anchor(
        &self,
        value: &'a Value,
        at: &Pointer,
        anchor: &str,
        in_name_map: bool,
    ) -> Option<(Pointer, &'a Value)> {
        match value {
            Value::Object(map) => {
                if !in_name_map && self.declares_anchor(map, anchor) {
                    return Some((at.clone(), value));
                }
                map.iter().find_map(|(key, child)| {
                    let child_in_name_map = child_position(in_name_map, key)?;
                    self.find_anchor(child, &at.child(key.as_str()), anchor, child_in_name_map)
                })
            }
            Value::Array(items) => items.iter().enumerate().find_map(|(i, child)| {
                self.find_anchor(child, &at.child(i.to_string()), anchor, false)
            }),
            _ => None,
        }
    }

    fn declares_anchor(&self, map: &Map<String, Value>, anchor: &str) -> bool {
        let fragment_id = |key: &str| {
            map.get(key)
                .and_then(Value::as_str)
                .and_then(|id| id.strip_prefix('#'))
                == Some(anchor)
        };
        match self.draft {
            Draft::Draft4 => fragment_id("id"),
            Draft::Draft6 | Draft::Draft7 => fragment_id("$id"),
            Draft::Draft2019_09 | Draft::Draft2020_12 => {
                map.get("$anchor").and_then(Value::as_str) == Some(anchor)
            }
        }
    }
}

fn uint(map: &Map<String, Value>, key: &str) -> Option<u64> {
    let value = map.get(key)?;
    value
        .as_u64()
        .or_else(|| value.as_f64().filter(|f| *f >= 0.0 && f.fract() == 0.0).map(|f| f as u64))
}

fn number(map: &Map<String, Value>, integer: bool) -> NumberConstraints {
    let exclusive = |key: &str| match map.get(key) {
        Some(Value::Bool(flag)) => Some(Exclusive::Flag(*flag)),
        Some(value) => value.as_f64().map(Exclusive::Bound),
        None => None,
    };
    NumberConstraints {
        integer,
        minimum: map.get("minimum").and_then(Value::as_f64),
        maximum: map.get("maximum").and_then(Value::as_f64),
        exclusive_minimum: exclusive("exclusiveMinimum"),
        exclusive_maximum: exclusive("exclusiveMaximum"),
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn normalize(value: Value) -> SchemaKind {
        let doc = SchemaDocument::new(&value).unwrap();
        doc.node(&value).kind
    }

    #[test]
    fn detects_drafts() {
        let v = json!({ "$schema": "http://json-schema.org/draft-04/schema#" });
        assert_eq!(SchemaDocument::new(&v).unwrap().draft(), Draft::Draft4);
        let v = json!({ "$schema": "https://json-schema.org/draft/2019-09/schema" });
        assert_eq!(SchemaDocument::new(&v).unwrap().draft(), Draft::Draft2019_09);
        let v = json!({});
        assert_eq!(SchemaDocument::new(&v).unwrap().draft(), Draft::Draft2020_12);
    }

    #[test]
    fn rejects_non_schema_documents() {
        assert!(matches!(
            SchemaDocument::new(&json!([1, 2])),
            Err(GenerateError::InvalidSchema(_))
        ));
    }

    #[test]
    fn keyword_precedence() {
        assert_eq!(
            normalize(json!({ "type": "string", "const": "a" })),
            SchemaKind::Const(json!("a"))
        );
        assert!(matches!(
            normalize(json!({ "enum": [1, 2], "oneOf": [] })),
            SchemaKind::Enum(v) if v.len() == 2
        ));
        assert!(matches!(
            normalize(json!({ "oneOf": [{}], "$ref": "#/a" })),
            SchemaKind::OneOf(_)
        ));
        assert_eq!(
            normalize(json!({ "$ref": "#/a", "type": "string" })),
            SchemaKind::Ref("#/a".into())
        );
    }

    #[test]
    fn boolean_schemas() {
        assert_eq!(normalize(json!(true)), SchemaKind::Any);
        assert_eq!(normalize(json!(false)), SchemaKind::Never);
    }

    #[test]
    fn infers_object_and_array() {
        assert!(matches!(
            normalize(json!({ "properties": { "a": {} } })),
            SchemaKind::Object(_)
        ));
        assert!(matches!(
            normalize(json!({ "items": { "type": "string" } })),
            SchemaKind::Array(_)
        ));
        assert_eq!(normalize(json!({ "minLength": 3 })), SchemaKind::Any);
    }

    #[test]
    fn type_lists() {
        assert_eq!(
            normalize(json!({ "type": ["string", "null"] })),
            SchemaKind::TypeUnion(vec![PrimitiveType::String, PrimitiveType::Null])
        );
        assert!(matches!(
            normalize(json!({ "type": ["integer"], "minimum": 2 })),
            SchemaKind::Number(n) if n.integer && n.minimum == Some(2.0)
        ));
    }

    #[test]
    fn numeric_exclusive_forms() {
        let SchemaKind::Number(n) = normalize(json!({
            "type": "number", "minimum": 0, "exclusiveMinimum": true, "exclusiveMaximum": 10
        })) else {
            panic!("expected number");
        };
        assert_eq!(n.exclusive_minimum, Some(Exclusive::Flag(true)));
        assert_eq!(n.exclusive_maximum, Some(Exclusive::Bound(10.0)));
    }

    #[test]
    fn object_details() {
        let SchemaKind::Object(o) = normalize(json!({
            "type": "object",
            "properties": { "b": { "type": "string" }, "a": { "type": "number" } },
            "required": ["a"],
            "additionalProperties": false
        })) else {
            panic!("expected object");
        };
        let keys: Vec<_> = o.properties.as_ref().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["b", "a"]);
        assert!(o.is_required("a") && !o.is_required("b"));
        assert_eq!(o.additional_properties, Some(false));
    }

    #[test]
    fn resolves_pointers_and_anchors() {
        let raw = json!({
            "$defs": {
                "User": { "$anchor": "user", "type": "object" },
                "Sample": { "const": { "$anchor": "user" } }
            }
        });
        let doc = SchemaDocument::new(&raw).unwrap();
        let (pointer, _) = doc.resolve_ref("#/$defs/User").unwrap();
        assert_eq!(pointer.to_string(), "#/$defs/User");
        let (pointer, value) = doc.resolve_ref("#user").unwrap();
        assert_eq!(pointer.to_string(), "#/$defs/User");
        assert_eq!(value["type"], "object");
        assert!(doc.resolve_ref("#nobody").is_none());
        assert!(doc.resolve_ref("other.json#/a").is_none());
        assert!(doc.resolve_ref("#").unwrap().0.is_root());
    }

    #[test]
    fn anchors_under_data_named_properties_are_found() {
        let raw = json!({
            "properties": {
                "default": { "$anchor": "settings", "type": "object" },
                "enum": { "properties": { "x": { "$anchor": "deep" } } }
            }
        });
        let doc = SchemaDocument::new(&raw).unwrap();
        assert_eq!(
            doc.resolve_ref("#settings").unwrap().0.to_string(),
            "#/properties/default"
        );
        assert_eq!(
            doc.resolve_ref("#deep").unwrap().0.to_string(),
            "#/properties/enum/properties/x"
        );
    }

    #[test]
    fn draft7_anchor_uses_id() {
        let raw = json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "definitions": { "Item": { "$id": "#item" } }
        });
        let doc = SchemaDocument::new(&raw).unwrap();
        assert_eq!(
            doc.resolve_ref("#item").unwrap().0.to_string(),
            "#/definitions/Item"
        );
    }
}
