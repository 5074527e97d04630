//! Validation plans.
//!
//! A [`Check`] tree is the target-independent form of a validator: it is
//! what the emitter prints as TypeScript and what the evaluator runs
//! in-process. Compiling to a plan is where references get resolved,
//! regexes get vetted and the draft-specific numeric bounds get folded into
//! a single representation.

use super::issue::IssueCode;
use crate::ir::*;
use crate::output::{Context, RefTarget};
use crate::pointer::Pointer;
use crate::tuple::{self, TupleShape};
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub enum Check {
    /// No constraints.
    Any,
    /// Always fails.
    Never,
    Const(Value),
    Enum(Vec<Value>),
    /// Delegate to another entry's validator.
    Ref { pointer: Pointer, validator: String },
    TypeUnion(Vec<PrimitiveType>),
    String(StringCheck),
    Number(NumberCheck),
    Boolean,
    Null,
    Array(Box<ArrayCheck>),
    Object(ObjectCheck),
    OneOf(Vec<Check>),
    AnyOf(Vec<Check>),
}

impl Check {
    /// Whether this check can never produce an issue.
    pub fn is_trivial(&self) -> bool {
        matches!(self, Check::Any)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringCheck {
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    /// Only patterns that compiled at generation time.
    pub pattern: Option<Pattern>,
}

/// An ECMAScript regular expression, compiled once with the same dialect
/// the emitted `new RegExp(...)` uses.
#[derive(Clone)]
pub struct Pattern {
    source: String,
    compiled: Arc<regress::Regex>,
}

impl Pattern {
    pub fn new(source: &str) -> Result<Self, regress::Error> {
        Ok(Self {
            source: source.to_string(),
            compiled: Arc::new(regress::Regex::new(source)?),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Unanchored search, like `RegExp.prototype.test`.
    pub fn is_match(&self, text: &str) -> bool {
        self.compiled.find(text).is_some()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.source).finish()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumberCheck {
    pub integer: bool,
    pub bounds: Vec<Bound>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundKind {
    Lower,
    Upper,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bound {
    pub kind: BoundKind,
    pub value: f64,
    pub exclusive: bool,
}

impl Bound {
    /// Whether `n` falls outside this bound.
    pub fn violated_by(&self, n: f64) -> bool {
        match (self.kind, self.exclusive) {
            (BoundKind::Lower, false) => n < self.value,
            (BoundKind::Lower, true) => n <= self.value,
            (BoundKind::Upper, false) => n > self.value,
            (BoundKind::Upper, true) => n >= self.value,
        }
    }

    pub fn code(&self) -> IssueCode {
        match self.kind {
            BoundKind::Lower => IssueCode::TooSmall,
            BoundKind::Upper => IssueCode::TooBig,
        }
    }

    /// Issue message and expected text.
    pub fn texts(&self) -> (String, String) {
        let n = super::issue::js_number(self.value);
        let (words, op) = match (self.kind, self.exclusive) {
            (BoundKind::Lower, false) => ("greater than or equal to", ">="),
            (BoundKind::Lower, true) => ("greater than", ">"),
            (BoundKind::Upper, false) => ("less than or equal to", "<="),
            (BoundKind::Upper, true) => ("less than", "<"),
        };
        (format!("Number must be {words} {n}"), format!("{op} {n}"))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayCheck {
    pub elements: Elements,
    pub min_items: Option<u64>,
    pub max_items: Option<u64>,
    pub unique: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Elements {
    None,
    Uniform(Check),
    FixedTuple(Vec<Check>),
    OpenTuple { prefix: Vec<Check>, rest: Check },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectCheck {
    pub min_properties: Option<u64>,
    pub max_properties: Option<u64>,
    pub required: Vec<String>,
    /// Declared properties, checked only when present.
    pub properties: Vec<(String, Check)>,
    /// Declared keys when unknown keys are rejected.
    pub closed: Option<Vec<String>>,
}

/// A compiled validator for one generated entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub type_name: String,
    pub validator_name: String,
    pub exported: bool,
    pub check: Check,
}

/// Every plan of a generation run, keyed by pointer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanSet {
    plans: IndexMap<Pointer, Plan>,
}

impl PlanSet {
    pub fn insert(&mut self, pointer: Pointer, plan: Plan) {
        self.plans.insert(pointer, plan);
    }

    pub fn get(&self, pointer: &Pointer) -> Option<&Plan> {
        self.plans.get(pointer)
    }

    pub fn by_type_name(&self, type_name: &str) -> Option<(&Pointer, &Plan)> {
        self.plans.iter().find(|(_, plan)| plan.type_name == type_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Pointer, &Plan)> {
        self.plans.iter()
    }

    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }
}

/// Compile `node` into a check tree.
///
/// The inline-expansion guard is scoped to this call.
pub fn compile(ctx: &Context<'_>, node: &SchemaNode) -> Check {
    PlanCompiler {
        ctx,
        in_progress: HashSet::new(),
    }
    .compile(node)
}

struct PlanCompiler<'c, 'a> {
    ctx: &'c Context<'a>,
    in_progress: HashSet<Pointer>,
}

impl PlanCompiler<'_, '_> {
    fn compile(&mut self, node: &SchemaNode) -> Check {
        match &node.kind {
            SchemaKind::Any => Check::Any,
            SchemaKind::Never => Check::Never,
            SchemaKind::Const(value) => Check::Const(value.clone()),
            SchemaKind::Enum(values) => Check::Enum(values.clone()),
            SchemaKind::OneOf(branches) => match self.branches("oneOf", branches) {
                Some(checks) => Check::OneOf(checks),
                None => Check::Any,
            },
            SchemaKind::AnyOf(branches) => match self.branches("anyOf", branches) {
                Some(checks) => Check::AnyOf(checks),
                None => Check::Any,
            },
            SchemaKind::AllOf(_) => {
                warn!("allOf is reflected in the generated type only; it is not enforced at runtime");
                Check::Any
            }
            SchemaKind::Ref(reference) => self.reference(reference),
            SchemaKind::String(constraints) => Check::String(string_check(constraints)),
            SchemaKind::Number(constraints) => Check::Number(number_check(constraints)),
            SchemaKind::Boolean => Check::Boolean,
            SchemaKind::Null => Check::Null,
            SchemaKind::Array(array) => Check::Array(Box::new(self.array(array))),
            SchemaKind::Object(object) => Check::Object(self.object(object)),
            SchemaKind::TypeUnion(primitives) => Check::TypeUnion(primitives.clone()),
        }
    }

    fn branches(&mut self, keyword: &str, branches: &[SchemaNode]) -> Option<Vec<Check>> {
        if branches.is_empty() {
            warn!(keyword, "empty combinator accepts any value");
            return None;
        }
        Some(branches.iter().map(|b| self.compile(b)).collect())
    }

    fn reference(&mut self, reference: &str) -> Check {
        match self.ctx.resolve_ref(reference) {
            RefTarget::Registered(pointer, names) => Check::Ref {
                pointer: pointer.clone(),
                validator: names.validator_name.clone(),
            },
            RefTarget::Inline(pointer, value) => {
                if !self.in_progress.insert(pointer.clone()) {
                    warn!(%pointer, "recursive unregistered $ref contributes no checks");
                    return Check::Any;
                }
                let node = self.ctx.doc.node(value);
                let check = self.compile(&node);
                self.in_progress.remove(&pointer);
                check
            }
            RefTarget::Unresolved => Check::Any,
        }
    }

    fn array(&mut self, array: &ArraySchema) -> ArrayCheck {
        let elements = match tuple::detect(array) {
            TupleShape::NotTuple { items: None } => Elements::None,
            TupleShape::NotTuple { items: Some(items) } => match self.compile(items) {
                Check::Any => Elements::None,
                check => Elements::Uniform(check),
            },
            TupleShape::Fixed { positions } => {
                Elements::FixedTuple(positions.iter().map(|p| self.compile(p)).collect())
            }
            TupleShape::Open { prefix, rest } => Elements::OpenTuple {
                prefix: prefix.iter().map(|p| self.compile(p)).collect(),
                rest: self.compile(rest),
            },
        };
        ArrayCheck {
            elements,
            min_items: array.min_items,
            max_items: array.max_items,
            unique: array.unique_items,
        }
    }

    fn object(&mut self, object: &ObjectSchema) -> ObjectCheck {
        let properties: Vec<(String, Check)> = object
            .properties
            .iter()
            .flatten()
            .map(|(key, prop)| (key.clone(), self.compile(prop)))
            .collect();
        let closed = object
            .properties
            .as_ref()
            .filter(|_| object.additional_properties == Some(false))
            .map(|declared| declared.keys().cloned().collect());
        ObjectCheck {
            min_properties: object.min_properties,
            max_properties: object.max_properties,
            required: object.required.clone(),
            properties: properties
                .into_iter()
                .filter(|(_, check)| !check.is_trivial())
                .collect(),
            closed,
        }
    }
}

fn string_check(constraints: &StringConstraints) -> StringCheck {
    let pattern = constraints
        .pattern
        .as_deref()
        .and_then(|source| match Pattern::new(source) {
            Ok(pattern) => Some(pattern),
            Err(err) => {
                warn!(pattern = source, "skipping invalid pattern: {err}");
                None
            }
        });
    StringCheck {
        min_length: constraints.min_length,
        max_length: constraints.max_length,
        pattern,
    }
}

fn number_check(constraints: &NumberConstraints) -> NumberCheck {
    let flag = |exclusive: Option<Exclusive>| matches!(exclusive, Some(Exclusive::Flag(true)));
    let bound = |exclusive: Option<Exclusive>| match exclusive {
        Some(Exclusive::Bound(value)) => Some(value),
        _ => None,
    };

    let mut bounds = Vec::new();
    if let Some(value) = constraints.minimum {
        bounds.push(Bound {
            kind: BoundKind::Lower,
            value,
            exclusive: flag(constraints.exclusive_minimum),
        });
    }
    if let Some(value) = bound(constraints.exclusive_minimum) {
        bounds.push(Bound {
            kind: BoundKind::Lower,
            value,
            exclusive: true,
        });
    }
    if let Some(value) = constraints.maximum {
        bounds.push(Bound {
            kind: BoundKind::Upper,
            value,
            exclusive: flag(constraints.exclusive_maximum),
        });
    }
    if let Some(value) = bound(constraints.exclusive_maximum) {
        bounds.push(Bound {
            kind: BoundKind::Upper,
            value,
            exclusive: true,
        });
    }
    NumberCheck {
        integer: constraints.integer,
        bounds,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::SchemaDocument;
    use crate::names::NameRegistry;
    use serde_json::json;

    fn plan(raw: &Value, registered: &[&str], at: &str) -> Check {
        let doc = SchemaDocument::new(raw).unwrap();
        let pointers: Vec<Pointer> = registered
            .iter()
            .map(|p| Pointer::parse_ref(p).unwrap())
            .collect();
        let registry = NameRegistry::build(&pointers, &[], None).unwrap();
        let ctx = Context::new(doc, &registry);
        let node = doc.node_at(&Pointer::parse_ref(at).unwrap()).unwrap();
        compile(&ctx, &node)
    }

    #[test]
    fn draft4_exclusive_flags_tighten_the_paired_bound() {
        let raw = json!({ "type": "number", "minimum": 0, "exclusiveMinimum": true, "maximum": 5 });
        let Check::Number(n) = plan(&raw, &[], "#") else {
            panic!("expected number check");
        };
        assert_eq!(
            n.bounds,
            vec![
                Bound { kind: BoundKind::Lower, value: 0.0, exclusive: true },
                Bound { kind: BoundKind::Upper, value: 5.0, exclusive: false },
            ]
        );
    }

    #[test]
    fn numeric_exclusive_bounds_stand_alone() {
        let raw = json!({ "type": "integer", "exclusiveMaximum": 10 });
        let Check::Number(n) = plan(&raw, &[], "#") else {
            panic!("expected number check");
        };
        assert!(n.integer);
        assert_eq!(
            n.bounds,
            vec![Bound { kind: BoundKind::Upper, value: 10.0, exclusive: true }]
        );
        assert!(n.bounds[0].violated_by(10.0));
        assert!(!n.bounds[0].violated_by(9.0));
    }

    #[test]
    fn invalid_patterns_are_dropped() {
        let raw = json!({ "type": "string", "pattern": "([a-z", "minLength": 1 });
        assert_eq!(
            plan(&raw, &[], "#"),
            Check::String(StringCheck { min_length: Some(1), max_length: None, pattern: None })
        );
        let raw = json!({ "type": "string", "pattern": "^[a-z]+$" });
        assert!(matches!(plan(&raw, &[], "#"), Check::String(s) if s.pattern.is_some()));
    }

    #[test]
    fn patterns_use_ecmascript_syntax() {
        let lookahead = Pattern::new("^(?!admin).*$").unwrap();
        assert!(lookahead.is_match("alice"));
        assert!(!lookahead.is_match("admin"));
        let backreference = Pattern::new(r"^(a+)-\1$").unwrap();
        assert!(backreference.is_match("aa-aa"));
        assert!(!backreference.is_match("aa-a"));
        assert!(Pattern::new("[").is_err());

        let raw = json!({ "type": "string", "pattern": "^(?!admin).*$" });
        let Check::String(s) = plan(&raw, &[], "#") else {
            panic!("expected string check");
        };
        assert_eq!(s.pattern.map(|p| p.to_string()).as_deref(), Some("^(?!admin).*$"));
    }

    #[test]
    fn registered_refs_delegate() {
        let raw = json!({
            "properties": { "a": { "$ref": "#/definitions/A" } },
            "definitions": { "A": { "type": "string" } }
        });
        let Check::Object(o) = plan(&raw, &["#", "#/definitions/A"], "#") else {
            panic!("expected object check");
        };
        assert_eq!(
            o.properties,
            vec![(
                "a".to_string(),
                Check::Ref {
                    pointer: Pointer::parse("#/definitions/A").unwrap(),
                    validator: "validateA".to_string()
                }
            )]
        );
    }

    #[test]
    fn recursive_inline_expansion_terminates() {
        let raw = json!({
            "definitions": {
                "Tree": {
                    "type": "object",
                    "properties": { "children": { "type": "array", "items": { "$ref": "#/definitions/Tree" } } }
                }
            },
            "$ref": "#/definitions/Tree"
        });
        let Check::Object(outer) = plan(&raw, &["#"], "#") else {
            panic!("expected inlined object check");
        };
        // The nested self-reference contributes nothing, so the property
        // check collapses to an unconstrained array.
        let Check::Array(children) = &outer.properties[0].1 else {
            panic!("expected array check");
        };
        assert_eq!(children.elements, Elements::None);
    }

    #[test]
    fn all_of_and_empty_combinators_are_unconstrained() {
        let raw = json!({ "allOf": [{ "type": "string" }] });
        assert_eq!(plan(&raw, &[], "#"), Check::Any);
        let raw = json!({ "oneOf": [] });
        assert_eq!(plan(&raw, &[], "#"), Check::Any);
    }

    #[test]
    fn closed_objects_list_declared_keys() {
        let raw = json!({
            "type": "object",
            "properties": { "a": {}, "b": { "type": "number" } },
            "additionalProperties": false
        });
        let Check::Object(o) = plan(&raw, &[], "#") else {
            panic!("expected object check");
        };
        assert_eq!(o.closed, Some(vec!["a".to_string(), "b".to_string()]));
        assert_eq!(o.properties.len(), 1);
    }

    #[test]
    fn objects_without_declared_properties_stay_open() {
        let raw = json!({ "type": "object", "additionalProperties": false });
        assert_eq!(plan(&raw, &[], "#"), Check::Object(ObjectCheck::default()));

        let raw = json!({ "type": "object", "properties": {}, "additionalProperties": false });
        let Check::Object(o) = plan(&raw, &[], "#") else {
            panic!("expected object check");
        };
        assert_eq!(o.closed, Some(Vec::new()));
    }
}
