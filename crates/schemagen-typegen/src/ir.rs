//! Normalized schema IR.
//!
//! A [`SchemaNode`] is a read-only view of one schema location with the
//! keyword soup of JSON Schema folded into a closed set of variants.
//! References stay symbolic (`$ref` strings) so that the tree is always
//! finite, even for cyclic schemas.

use indexmap::IndexMap;
use serde_json::Value;

/// JSON Schema dialect, detected from `$schema`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Draft {
    Draft4,
    Draft6,
    Draft7,
    Draft2019_09,
    Draft2020_12,
}

impl Draft {
    /// Detect the draft from a `$schema` URI. Unknown or absent URIs mean 2020-12.
    pub fn detect(schema_uri: Option<&str>) -> Self {
        let Some(uri) = schema_uri else {
            return Draft::Draft2020_12;
        };
        if uri.contains("draft-04") {
            Draft::Draft4
        } else if uri.contains("draft-06") {
            Draft::Draft6
        } else if uri.contains("draft-07") {
            Draft::Draft7
        } else if uri.contains("2019-09") {
            Draft::Draft2019_09
        } else {
            Draft::Draft2020_12
        }
    }

    /// Keywords holding reusable definitions, most idiomatic first.
    pub fn definitions_keys(self) -> [&'static str; 2] {
        if self >= Draft::Draft2019_09 {
            ["$defs", "definitions"]
        } else {
            ["definitions", "$defs"]
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    pub kind: SchemaKind,
    pub description: Option<String>,
}

impl SchemaNode {
    pub fn new(kind: SchemaKind) -> Self {
        Self {
            kind,
            description: None,
        }
    }
}

/// The variant a schema location normalizes to.
///
/// Variants are listed in the order they are recognized: a node carrying
/// both `const` and `type` is a `Const`.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    /// Accepts anything (`true`, `{}`, unrecognized shapes).
    Any,
    /// Accepts nothing (`false`).
    Never,
    Const(Value),
    Enum(Vec<Value>),
    OneOf(Vec<SchemaNode>),
    AnyOf(Vec<SchemaNode>),
    AllOf(Vec<SchemaNode>),
    Ref(String),
    String(StringConstraints),
    Number(NumberConstraints),
    Boolean,
    Null,
    Array(ArraySchema),
    Object(ObjectSchema),
    /// `type` given as a list of primitive names.
    TypeUnion(Vec<PrimitiveType>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveType {
    String,
    Number,
    Integer,
    Boolean,
    Null,
    Array,
    Object,
}

impl PrimitiveType {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "string" => PrimitiveType::String,
            "number" => PrimitiveType::Number,
            "integer" => PrimitiveType::Integer,
            "boolean" => PrimitiveType::Boolean,
            "null" => PrimitiveType::Null,
            "array" => PrimitiveType::Array,
            "object" => PrimitiveType::Object,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            PrimitiveType::String => "string",
            PrimitiveType::Number => "number",
            PrimitiveType::Integer => "integer",
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Null => "null",
            PrimitiveType::Array => "array",
            PrimitiveType::Object => "object",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringConstraints {
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub pattern: Option<String>,
}

/// `exclusiveMinimum`/`exclusiveMaximum` in either of their spellings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Exclusive {
    /// Draft 06+: the exclusive bound itself.
    Bound(f64),
    /// Draft 04: makes the paired `minimum`/`maximum` exclusive.
    Flag(bool),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumberConstraints {
    pub integer: bool,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub exclusive_minimum: Option<Exclusive>,
    pub exclusive_maximum: Option<Exclusive>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Items {
    /// One schema for every element (or the trailing elements of a prefix tuple).
    Single(Box<SchemaNode>),
    /// Legacy list form: one schema per position.
    List(Vec<SchemaNode>),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArraySchema {
    pub items: Option<Items>,
    pub prefix_items: Option<Vec<SchemaNode>>,
    pub min_items: Option<u64>,
    pub max_items: Option<u64>,
    pub unique_items: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectSchema {
    /// Declared properties; `None` when the keyword is absent.
    pub properties: Option<IndexMap<String, SchemaNode>>,
    pub required: Vec<String>,
    /// `Some(false)` only when `additionalProperties` is literally `false`.
    pub additional_properties: Option<bool>,
    pub min_properties: Option<u64>,
    pub max_properties: Option<u64>,
}

impl ObjectSchema {
    pub fn is_required(&self, key: &str) -> bool {
        self.required.iter().any(|r| r == key)
    }
}
