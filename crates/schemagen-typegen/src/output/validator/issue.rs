//! Validation issue vocabulary shared by the emitter, the evaluator and the
//! runtime contract module.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    InvalidType,
    InvalidValue,
    TooSmall,
    TooBig,
    InvalidString,
    NotInteger,
    NotUnique,
    UnrecognizedKey,
    MissingKey,
}

impl IssueCode {
    pub const ALL: [IssueCode; 9] = [
        IssueCode::InvalidType,
        IssueCode::InvalidValue,
        IssueCode::TooSmall,
        IssueCode::TooBig,
        IssueCode::InvalidString,
        IssueCode::NotInteger,
        IssueCode::NotUnique,
        IssueCode::UnrecognizedKey,
        IssueCode::MissingKey,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            IssueCode::InvalidType => "invalid_type",
            IssueCode::InvalidValue => "invalid_value",
            IssueCode::TooSmall => "too_small",
            IssueCode::TooBig => "too_big",
            IssueCode::InvalidString => "invalid_string",
            IssueCode::NotInteger => "not_integer",
            IssueCode::NotUnique => "not_unique",
            IssueCode::UnrecognizedKey => "unrecognized_key",
            IssueCode::MissingKey => "missing_key",
        }
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One step of an issue path: an object key or an array index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathToken {
    Key(String),
    Index(usize),
}

impl From<&str> for PathToken {
    fn from(key: &str) -> Self {
        PathToken::Key(key.to_string())
    }
}

impl From<usize> for PathToken {
    fn from(index: usize) -> Self {
        PathToken::Index(index)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub code: IssueCode,
    pub path: Vec<PathToken>,
    pub message: String,
    pub expected: String,
    pub received: String,
}

/// Outcome of validating one value.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult {
    Success { data: serde_json::Value },
    Failure { issues: Vec<ValidationIssue> },
}

impl ValidationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ValidationResult::Success { .. })
    }

    /// Issues of a failed result; empty on success.
    pub fn issues(&self) -> &[ValidationIssue] {
        match self {
            ValidationResult::Success { .. } => &[],
            ValidationResult::Failure { issues } => issues,
        }
    }

    pub fn codes(&self) -> Vec<IssueCode> {
        self.issues().iter().map(|issue| issue.code).collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOptions {
    #[serde(default)]
    pub abort_early: bool,
}

impl ValidationOptions {
    pub fn abort_early() -> Self {
        Self { abort_early: true }
    }
}

/// What a count constraint is counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Counted {
    Characters,
    Elements,
    TupleElements,
    Properties,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Relation {
    AtLeast,
    AtMost,
    Exactly,
}

/// Message and expected text for a count constraint.
pub(crate) fn count_texts(counted: Counted, relation: Relation, n: u64) -> (String, String) {
    let (subject, unit, measure) = match counted {
        Counted::Characters => ("String", "character(s)", "length"),
        Counted::Elements => ("Array", "element(s)", "length"),
        Counted::TupleElements => ("Tuple", "element(s)", "length"),
        Counted::Properties => ("Object", "property(ies)", "properties"),
    };
    let (words, op) = match relation {
        Relation::AtLeast => ("at least", ">="),
        Relation::AtMost => ("at most", "<="),
        Relation::Exactly => ("exactly", "==="),
    };
    (
        format!("{subject} must contain {words} {n} {unit}"),
        format!("{measure} {op} {n}"),
    )
}

/// `expected` text for a failed `const`/`enum`: the allowed JSON values.
pub(crate) fn allowed_values(values: &[serde_json::Value]) -> String {
    values
        .iter()
        .map(js_stringify)
        .collect::<Vec<_>>()
        .join(" | ")
}

/// `expected` text for an unrecognized key.
pub(crate) fn declared_keys_text(declared: &[String]) -> String {
    if declared.is_empty() {
        return "no properties".to_string();
    }
    format!("one of {}", declared.join(", "))
}

/// `JSON.stringify` for JSON values, with JavaScript number formatting.
pub fn js_stringify(value: &serde_json::Value) -> String {
    use serde_json::Value;
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) => js_number(f),
            None => n.to_string(),
        },
        Value::String(s) => serde_json::to_string(s).unwrap_or_default(),
        Value::Array(items) => {
            let inner: Vec<String> = items.iter().map(js_stringify).collect();
            format!("[{}]", inner.join(","))
        }
        Value::Object(map) => {
            let inner: Vec<String> = map
                .iter()
                .map(|(k, v)| {
                    format!(
                        "{}:{}",
                        serde_json::to_string(k).unwrap_or_default(),
                        js_stringify(v)
                    )
                })
                .collect();
            format!("{{{}}}", inner.join(","))
        }
    }
}

/// `String(n)` for finite numbers.
pub fn js_number(n: f64) -> String {
    schemagen_surface_syntax::output::typescript::format_number(n)
}
