//! In-process evaluation of validation plans.
//!
//! Mirrors the emitted TypeScript check for check: same issue order, same
//! paths, same texts. JavaScript semantics are kept where they leak into
//! results: string lengths count UTF-16 units, integers are numbers with no
//! fractional part, and structured values compare by their `JSON.stringify`
//! text.

use super::issue::{
    Counted, IssueCode, PathToken, Relation, ValidationIssue, ValidationOptions,
    ValidationResult, allowed_values, count_texts, declared_keys_text, js_number, js_stringify,
};
use super::plan::*;
use crate::input::jsonschema::json_kind;
use crate::ir::PrimitiveType;
use crate::pointer::Pointer;
use serde_json::Value;
use std::collections::HashSet;
use std::ops::ControlFlow;

type Flow = ControlFlow<()>;

impl PlanSet {
    /// Validate `value` against the plan registered for `pointer`.
    ///
    /// Returns `None` when no plan exists for the pointer.
    pub fn validate(
        &self,
        pointer: &Pointer,
        value: &Value,
        options: ValidationOptions,
    ) -> Option<ValidationResult> {
        let plan = self.get(pointer)?;
        let mut issues = Vec::new();
        let mut path = Vec::new();
        let _ = Evaluator { plans: self }.check(
            &plan.check,
            value,
            &mut path,
            &mut issues,
            options.abort_early,
        );
        Some(if issues.is_empty() {
            ValidationResult::Success {
                data: value.clone(),
            }
        } else {
            ValidationResult::Failure { issues }
        })
    }
}

struct Evaluator<'s> {
    plans: &'s PlanSet,
}

/// Record an issue; stop when aborting.
fn report(sink: &mut Vec<ValidationIssue>, abort: bool, issue: ValidationIssue) -> Flow {
    sink.push(issue);
    if abort {
        ControlFlow::Break(())
    } else {
        ControlFlow::Continue(())
    }
}

fn issue(
    code: IssueCode,
    path: &[PathToken],
    message: impl Into<String>,
    expected: impl Into<String>,
    received: impl Into<String>,
) -> ValidationIssue {
    ValidationIssue {
        code,
        path: path.to_vec(),
        message: message.into(),
        expected: expected.into(),
        received: received.into(),
    }
}

fn invalid_type(path: &[PathToken], expected: &str, value: &Value) -> ValidationIssue {
    let kind = json_kind(value);
    issue(
        IssueCode::InvalidType,
        path,
        format!("Expected {expected}, received {kind}"),
        expected,
        kind,
    )
}

fn count_issue(
    path: &[PathToken],
    counted: Counted,
    relation: Relation,
    n: u64,
    actual: usize,
) -> Option<ValidationIssue> {
    let actual = actual as u64;
    let (violated, code) = match relation {
        Relation::AtLeast => (actual < n, IssueCode::TooSmall),
        Relation::AtMost => (actual > n, IssueCode::TooBig),
        Relation::Exactly if actual < n => (true, IssueCode::TooSmall),
        Relation::Exactly => (actual > n, IssueCode::TooBig),
    };
    if !violated {
        return None;
    }
    let (message, expected) = count_texts(counted, relation, n);
    Some(issue(code, path, message, expected, actual.to_string()))
}

impl Evaluator<'_> {
    fn check(
        &self,
        check: &Check,
        value: &Value,
        path: &mut Vec<PathToken>,
        sink: &mut Vec<ValidationIssue>,
        abort: bool,
    ) -> Flow {
        match check {
            Check::Any => ControlFlow::Continue(()),
            Check::Never => {
                let kind = json_kind(value);
                report(
                    sink,
                    abort,
                    issue(IssueCode::InvalidType, path, "No value is allowed here", "never", kind),
                )
            }
            Check::Const(expected) => {
                if js_equal(value, expected) {
                    return ControlFlow::Continue(());
                }
                let text = js_stringify(expected);
                report(
                    sink,
                    abort,
                    issue(
                        IssueCode::InvalidValue,
                        path,
                        format!("Invalid value, expected {text}"),
                        text,
                        js_stringify(value),
                    ),
                )
            }
            Check::Enum(members) => {
                if members.iter().any(|member| js_equal(value, member)) {
                    return ControlFlow::Continue(());
                }
                let allowed = allowed_values(members);
                report(
                    sink,
                    abort,
                    issue(
                        IssueCode::InvalidValue,
                        path,
                        format!("Invalid value, expected one of {allowed}"),
                        allowed,
                        js_stringify(value),
                    ),
                )
            }
            Check::Ref { pointer, .. } => self.reference(pointer, value, path, sink, abort),
            Check::TypeUnion(primitives) => {
                if primitives.iter().any(|p| primitive_matches(*p, value)) {
                    return ControlFlow::Continue(());
                }
                let expected = primitives
                    .iter()
                    .map(|p| p.name())
                    .collect::<Vec<_>>()
                    .join(" | ");
                report(sink, abort, invalid_type(path, &expected, value))
            }
            Check::String(string) => match value {
                Value::String(s) => self.string(string, s, value, path, sink, abort),
                _ => report(sink, abort, invalid_type(path, "string", value)),
            },
            Check::Number(number) => self.number(number, value, path, sink, abort),
            Check::Boolean if value.is_boolean() => ControlFlow::Continue(()),
            Check::Boolean => report(sink, abort, invalid_type(path, "boolean", value)),
            Check::Null if value.is_null() => ControlFlow::Continue(()),
            Check::Null => report(sink, abort, invalid_type(path, "null", value)),
            Check::Array(array) => match value {
                Value::Array(items) => self.array(array, items, path, sink, abort),
                _ => report(sink, abort, invalid_type(path, "array", value)),
            },
            Check::Object(object) => match value {
                Value::Object(map) => self.object(object, map, path, sink, abort),
                _ => report(sink, abort, invalid_type(path, "object", value)),
            },
            Check::OneOf(branches) => {
                let matched = branches
                    .iter()
                    .filter(|branch| self.clean(branch, value, path))
                    .count();
                if matched == 1 {
                    return ControlFlow::Continue(());
                }
                let n = branches.len();
                report(
                    sink,
                    abort,
                    issue(
                        IssueCode::InvalidType,
                        path,
                        format!("Expected exactly one of {n} schemas to match, but {matched} matched"),
                        format!("exactly one of {n} schemas"),
                        format!("{matched} matched"),
                    ),
                )
            }
            Check::AnyOf(branches) => {
                if branches.iter().any(|branch| self.clean(branch, value, path)) {
                    return ControlFlow::Continue(());
                }
                let n = branches.len();
                report(
                    sink,
                    abort,
                    issue(
                        IssueCode::InvalidType,
                        path,
                        format!("Expected at least one of {n} schemas to match"),
                        format!("at least one of {n} schemas"),
                        "none matched",
                    ),
                )
            }
        }
    }

    /// Run a combinator branch on its own sink, stopping at the first issue.
    fn clean(&self, branch: &Check, value: &Value, path: &[PathToken]) -> bool {
        let mut sink = Vec::new();
        let _ = self.check(branch, value, &mut path.to_vec(), &mut sink, true);
        sink.is_empty()
    }

    /// Check `value` one step below the current path.
    fn at(
        &self,
        check: &Check,
        value: &Value,
        token: PathToken,
        path: &mut Vec<PathToken>,
        sink: &mut Vec<ValidationIssue>,
        abort: bool,
    ) -> Flow {
        path.push(token);
        let flow = self.check(check, value, path, sink, abort);
        path.pop();
        flow
    }

    fn reference(
        &self,
        pointer: &Pointer,
        value: &Value,
        path: &[PathToken],
        sink: &mut Vec<ValidationIssue>,
        abort: bool,
    ) -> Flow {
        let Some(plan) = self.plans.get(pointer) else {
            return ControlFlow::Continue(());
        };
        let mut nested = Vec::new();
        let _ = self.check(&plan.check, value, &mut Vec::new(), &mut nested, abort);
        if nested.is_empty() {
            return ControlFlow::Continue(());
        }
        for mut issue in nested {
            let mut rebased = path.to_vec();
            rebased.append(&mut issue.path);
            issue.path = rebased;
            sink.push(issue);
        }
        if abort {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }

    fn string(
        &self,
        string: &StringCheck,
        s: &str,
        value: &Value,
        path: &[PathToken],
        sink: &mut Vec<ValidationIssue>,
        abort: bool,
    ) -> Flow {
        let length = s.encode_utf16().count();
        let bounds = [
            (string.min_length, Relation::AtLeast),
            (string.max_length, Relation::AtMost),
        ];
        for (limit, relation) in bounds {
            if let Some(found) = limit
                .and_then(|n| count_issue(path, Counted::Characters, relation, n, length))
            {
                report(sink, abort, found)?;
            }
        }
        if let Some(pattern) = &string.pattern {
            if !pattern.is_match(s) {
                report(
                    sink,
                    abort,
                    issue(
                        IssueCode::InvalidString,
                        path,
                        format!("String must match pattern /{pattern}/"),
                        format!("/{pattern}/"),
                        js_stringify(value),
                    ),
                )?;
            }
        }
        ControlFlow::Continue(())
    }

    fn number(
        &self,
        number: &NumberCheck,
        value: &Value,
        path: &[PathToken],
        sink: &mut Vec<ValidationIssue>,
        abort: bool,
    ) -> Flow {
        let expected = if number.integer { "integer" } else { "number" };
        let Some(n) = value.as_f64() else {
            return report(sink, abort, invalid_type(path, expected, value));
        };
        if number.integer && n.fract() != 0.0 {
            return report(
                sink,
                abort,
                issue(
                    IssueCode::NotInteger,
                    path,
                    "Expected integer, received float",
                    "integer",
                    js_number(n),
                ),
            );
        }
        for bound in number.bounds.iter().filter(|b| b.violated_by(n)) {
            let (message, expected) = bound.texts();
            report(sink, abort, issue(bound.code(), path, message, expected, js_number(n)))?;
        }
        ControlFlow::Continue(())
    }

    fn array(
        &self,
        array: &ArrayCheck,
        items: &[Value],
        path: &mut Vec<PathToken>,
        sink: &mut Vec<ValidationIssue>,
        abort: bool,
    ) -> Flow {
        let len = items.len();
        match &array.elements {
            Elements::None => {}
            Elements::Uniform(check) => {
                for (i, item) in items.iter().enumerate() {
                    self.at(check, item, PathToken::Index(i), path, sink, abort)?;
                }
            }
            Elements::FixedTuple(positions) => {
                let n = positions.len() as u64;
                if let Some(found) =
                    count_issue(path, Counted::TupleElements, Relation::Exactly, n, len)
                {
                    report(sink, abort, found)?;
                }
                self.positions(positions, items, path, sink, abort)?;
            }
            Elements::OpenTuple { prefix, rest } => {
                let n = prefix.len() as u64;
                if let Some(found) =
                    count_issue(path, Counted::TupleElements, Relation::AtLeast, n, len)
                {
                    report(sink, abort, found)?;
                }
                self.positions(prefix, items, path, sink, abort)?;
                for (i, item) in items.iter().enumerate().skip(prefix.len()) {
                    self.at(rest, item, PathToken::Index(i), path, sink, abort)?;
                }
            }
        }

        let bounds = [
            (array.min_items, Relation::AtLeast),
            (array.max_items, Relation::AtMost),
        ];
        for (limit, relation) in bounds {
            if let Some(found) =
                limit.and_then(|n| count_issue(path, Counted::Elements, relation, n, len))
            {
                report(sink, abort, found)?;
            }
        }

        if array.unique {
            let distinct: HashSet<String> = items.iter().map(js_stringify).collect();
            if distinct.len() != len {
                report(
                    sink,
                    abort,
                    issue(
                        IssueCode::NotUnique,
                        path,
                        "Array items must be unique",
                        "unique items",
                        "duplicate items",
                    ),
                )?;
            }
        }
        ControlFlow::Continue(())
    }

    fn positions(
        &self,
        positions: &[Check],
        items: &[Value],
        path: &mut Vec<PathToken>,
        sink: &mut Vec<ValidationIssue>,
        abort: bool,
    ) -> Flow {
        for (k, (check, item)) in positions.iter().zip(items).enumerate() {
            self.at(check, item, PathToken::Index(k), path, sink, abort)?;
        }
        ControlFlow::Continue(())
    }

    fn object(
        &self,
        object: &ObjectCheck,
        map: &serde_json::Map<String, Value>,
        path: &mut Vec<PathToken>,
        sink: &mut Vec<ValidationIssue>,
        abort: bool,
    ) -> Flow {
        let bounds = [
            (object.min_properties, Relation::AtLeast),
            (object.max_properties, Relation::AtMost),
        ];
        for (limit, relation) in bounds {
            if let Some(found) =
                limit.and_then(|n| count_issue(path, Counted::Properties, relation, n, map.len()))
            {
                report(sink, abort, found)?;
            }
        }

        for key in &object.required {
            if !map.contains_key(key) {
                let quoted = js_stringify(&Value::String(key.clone()));
                report(
                    sink,
                    abort,
                    issue(
                        IssueCode::MissingKey,
                        path,
                        format!("Missing required property {quoted}"),
                        key.clone(),
                        "undefined",
                    ),
                )?;
            }
        }

        for (key, check) in &object.properties {
            if let Some(item) = map.get(key) {
                self.at(check, item, PathToken::Key(key.clone()), path, sink, abort)?;
            }
        }

        if let Some(declared) = &object.closed {
            for key in map.keys().filter(|key| !declared.contains(key)) {
                let quoted = js_stringify(&Value::String(key.clone()));
                let mut key_path = path.clone();
                key_path.push(PathToken::Key(key.clone()));
                report(
                    sink,
                    abort,
                    issue(
                        IssueCode::UnrecognizedKey,
                        &key_path,
                        format!("Unrecognized key {quoted}"),
                        declared_keys_text(declared),
                        key.clone(),
                    ),
                )?;
            }
        }
        ControlFlow::Continue(())
    }
}

/// `===` for primitives, `JSON.stringify` equality for structured values.
fn js_equal(value: &Value, expected: &Value) -> bool {
    match (value, expected) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (Value::Array(_) | Value::Object(_), _) | (_, Value::Array(_) | Value::Object(_)) => {
            js_stringify(value) == js_stringify(expected)
        }
        _ => value == expected,
    }
}

fn primitive_matches(primitive: PrimitiveType, value: &Value) -> bool {
    match primitive {
        PrimitiveType::String => value.is_string(),
        PrimitiveType::Number => value.is_number(),
        PrimitiveType::Integer => value.as_f64().is_some_and(|n| n.fract() == 0.0),
        PrimitiveType::Boolean => value.is_boolean(),
        PrimitiveType::Null => value.is_null(),
        PrimitiveType::Array => value.is_array(),
        PrimitiveType::Object => value.is_object(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn root() -> Pointer {
        Pointer::root()
    }

    fn plans(check: Check) -> PlanSet {
        let mut set = PlanSet::default();
        set.insert(
            root(),
            Plan {
                type_name: "Root".into(),
                validator_name: "validateRoot".into(),
                exported: true,
                check,
            },
        );
        set
    }

    fn run(set: &PlanSet, value: Value, abort_early: bool) -> ValidationResult {
        set.validate(&root(), &value, ValidationOptions { abort_early })
            .unwrap()
    }

    fn account() -> Check {
        Check::Object(ObjectCheck {
            required: vec!["id".into(), "name".into(), "email".into()],
            properties: vec![(
                "id".into(),
                Check::Number(NumberCheck {
                    integer: true,
                    bounds: vec![Bound {
                        kind: BoundKind::Lower,
                        value: 1.0,
                        exclusive: false,
                    }],
                }),
            )],
            closed: Some(vec!["id".into(), "name".into(), "email".into()]),
            ..ObjectCheck::default()
        })
    }

    #[test]
    fn success_returns_the_input() {
        let set = plans(account());
        let value = json!({ "id": 3, "name": "a", "email": "b" });
        assert_eq!(
            run(&set, value.clone(), false),
            ValidationResult::Success { data: value }
        );
    }

    #[test]
    fn abort_early_stops_at_the_first_issue() {
        let set = plans(account());
        assert_eq!(run(&set, json!({}), false).issues().len(), 3);
        let aborted = run(&set, json!({}), true);
        assert_eq!(aborted.codes(), vec![IssueCode::MissingKey]);
        assert!(aborted.issues()[0].path.is_empty());
        assert_eq!(aborted.issues()[0].message, "Missing required property \"id\"");
    }

    #[test]
    fn nested_paths_and_unrecognized_keys() {
        let set = plans(account());
        let result = run(&set, json!({ "id": 0.5, "name": "a", "email": "b", "extra": 1 }), false);
        let issues = result.issues();
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].code, IssueCode::NotInteger);
        assert_eq!(issues[0].path, vec![PathToken::from("id")]);
        assert_eq!(issues[0].received, "0.5");
        assert_eq!(issues[1].code, IssueCode::UnrecognizedKey);
        assert_eq!(issues[1].path, vec![PathToken::from("extra")]);
        assert_eq!(issues[1].expected, "one of id, name, email");
    }

    #[test]
    fn refs_rebase_paths() {
        let item = Pointer::parse_ref("#/definitions/Item").unwrap();
        let mut set = plans(Check::Array(Box::new(ArrayCheck {
            elements: Elements::Uniform(Check::Ref {
                pointer: item.clone(),
                validator: "validateItem".into(),
            }),
            min_items: None,
            max_items: None,
            unique: false,
        })));
        set.insert(
            item,
            Plan {
                type_name: "Item".into(),
                validator_name: "validateItem".into(),
                exported: false,
                check: account(),
            },
        );
        let result = run(&set, json!([{ "id": 1, "name": "a", "email": "b" }, { "id": 2, "name": "a" }]), false);
        assert_eq!(result.issues().len(), 1);
        assert_eq!(result.issues()[0].path, vec![PathToken::Index(1)]);
        assert_eq!(result.issues()[0].expected, "email");
    }

    #[test]
    fn one_of_needs_exactly_one_match() {
        let set = plans(Check::OneOf(vec![
            Check::TypeUnion(vec![PrimitiveType::Number]),
            Check::TypeUnion(vec![PrimitiveType::Integer]),
        ]));
        assert!(run(&set, json!(1.5), false).is_success());
        let both = run(&set, json!(2), false);
        assert_eq!(
            both.issues()[0].message,
            "Expected exactly one of 2 schemas to match, but 2 matched"
        );
        assert_eq!(run(&set, json!("x"), false).issues()[0].received, "0 matched");
    }

    #[test]
    fn string_lengths_count_utf16_units() {
        let set = plans(Check::String(StringCheck {
            min_length: None,
            max_length: Some(1),
            pattern: Some(Pattern::new("^[a-z]+$").unwrap()),
        }));
        assert!(run(&set, json!("a"), false).is_success());
        let emoji = run(&set, json!("😀"), false);
        assert_eq!(emoji.codes(), vec![IssueCode::TooBig, IssueCode::InvalidString]);
        assert_eq!(emoji.issues()[0].received, "2");
        assert_eq!(emoji.issues()[1].received, "\"😀\"");
        assert_eq!(run(&set, json!(null), false).issues()[0].message, "Expected string, received null");
    }

    #[test]
    fn tuples_and_uniqueness() {
        let set = plans(Check::Array(Box::new(ArrayCheck {
            elements: Elements::FixedTuple(vec![
                Check::String(StringCheck::default()),
                Check::Number(NumberCheck::default()),
            ]),
            min_items: None,
            max_items: None,
            unique: true,
        })));
        assert!(run(&set, json!(["a", 1]), false).is_success());
        assert_eq!(
            run(&set, json!(["a", 1, 2]), false).codes(),
            vec![IssueCode::TooBig]
        );
        let short = run(&set, json!([3]), false);
        assert_eq!(short.codes(), vec![IssueCode::TooSmall, IssueCode::InvalidType]);
        assert_eq!(short.issues()[1].path, vec![PathToken::Index(0)]);
        assert_eq!(
            run(&set, json!(["a", "a"]), false).codes(),
            vec![IssueCode::InvalidType, IssueCode::NotUnique]
        );
    }

    #[test]
    fn const_and_enum_use_javascript_equality() {
        let set = plans(Check::Const(json!({ "a": [1, 2] })));
        assert!(run(&set, json!({ "a": [1.0, 2.0] }), false).is_success());
        assert_eq!(
            run(&set, json!({ "a": [2, 1] }), false).issues()[0].expected,
            "{\"a\":[1,2]}"
        );
        let set = plans(Check::Enum(vec![json!("x"), json!(1)]));
        assert!(run(&set, json!(1.0), false).is_success());
        let miss = run(&set, json!("y"), false);
        assert_eq!(miss.issues()[0].message, "Invalid value, expected one of \"x\" | 1");
    }

    #[test]
    fn unknown_pointer_has_no_result() {
        let set = plans(Check::Any);
        let other = Pointer::parse_ref("#/definitions/Nope").unwrap();
        assert!(set.validate(&other, &json!(1), ValidationOptions::default()).is_none());
    }
}
