//! Plan → TypeScript validator functions.
//!
//! Every leaf check pushes an issue onto a sink. At the top level the sink
//! is the function's `issues` array and `abortEarly` decides whether to
//! return right away; inside a `oneOf`/`anyOf` branch the sink is a
//! branch-local array and the branch returns at its first issue.

use super::issue::{
    Counted, IssueCode, Relation, allowed_values, count_texts, declared_keys_text, js_stringify,
};
use super::plan::*;
use crate::ir::PrimitiveType;
use schemagen_surface_syntax::{BinaryOp, Expr, Function, ObjectEntry, Param, Stmt, TypeExpr};
use serde_json::Value;

/// The safe validator for `plan`, plus the throwing wrapper when exported.
pub fn validator_functions(plan: &Plan) -> Vec<Stmt> {
    let mut functions = vec![Stmt::Function(safe_validator(plan))];
    if plan.exported {
        functions.push(Stmt::Function(unsafe_validator(plan)));
    }
    functions
}

fn options_param() -> Param {
    Param::typed("options", TypeExpr::named("ValidationOptions")).with_default(Expr::object(vec![]))
}

fn failure() -> Expr {
    Expr::object(vec![
        ("success".into(), Expr::bool(false)),
        ("issues".into(), Expr::ident("issues")),
    ])
}

fn safe_validator(plan: &Plan) -> Function {
    let mut emitter = Emitter::default();
    let site = Site {
        value: Expr::ident("value"),
        path: Vec::new(),
        sink: Sink::Top,
    };
    let checks = emitter.check(&plan.check, &site);

    let mut body = Vec::new();
    if emitter.uses_abort {
        body.push(Stmt::const_decl(
            "abortEarly",
            Expr::eq(
                Expr::member(Expr::ident("options"), "abortEarly"),
                Expr::bool(true),
            ),
        ));
    }
    body.push(Stmt::typed_const(
        "issues",
        TypeExpr::array(TypeExpr::named("ValidationIssue")),
        Expr::array(vec![]),
    ));
    body.extend(checks);
    body.push(Stmt::when(
        Expr::binary(
            length(Expr::ident("issues")),
            BinaryOp::Gt,
            Expr::number(0),
        ),
        vec![Stmt::return_stmt(Some(failure()))],
    ));
    body.push(Stmt::return_stmt(Some(Expr::object(vec![
        ("success".into(), Expr::bool(true)),
        (
            "data".into(),
            Expr::cast(Expr::ident("value"), TypeExpr::named(&plan.type_name)),
        ),
    ]))));

    Function::new(
        &plan.validator_name,
        vec![Param::typed("value", TypeExpr::unknown()), options_param()],
        body,
    )
    .returns(TypeExpr::generic(
        "ValidationResult",
        vec![TypeExpr::named(&plan.type_name)],
    ))
    .exported(plan.exported)
}

fn unsafe_validator(plan: &Plan) -> Function {
    let result = || Expr::ident("result");
    let describe = Expr::arrow(
        vec![Param::new("issue")],
        vec![Stmt::return_stmt(Some(Expr::binary(
            Expr::binary(
                Expr::method(
                    Expr::member(Expr::ident("issue"), "path"),
                    "join",
                    vec![Expr::string(".")],
                ),
                BinaryOp::Add,
                Expr::string(": "),
            ),
            BinaryOp::Add,
            Expr::member(Expr::ident("issue"), "message"),
        )))],
    );
    let message = Expr::binary(
        Expr::string(format!("{} validation failed: ", plan.type_name)),
        BinaryOp::Add,
        Expr::method(
            Expr::method(Expr::member(result(), "issues"), "map", vec![describe]),
            "join",
            vec![Expr::string("; ")],
        ),
    );

    Function::new(
        format!("unsafe{}", capitalize(&plan.validator_name)),
        vec![Param::typed("value", TypeExpr::unknown()), options_param()],
        vec![
            Stmt::const_decl(
                "result",
                Expr::call(
                    Expr::ident(&plan.validator_name),
                    vec![Expr::ident("value"), Expr::ident("options")],
                ),
            ),
            Stmt::when(
                Expr::not(Expr::member(result(), "success")),
                vec![Stmt::throw(Expr::new_instance(
                    Expr::ident("Error"),
                    vec![message],
                ))],
            ),
            Stmt::return_stmt(Some(Expr::member(result(), "data"))),
        ],
    )
    .returns(TypeExpr::named(&plan.type_name))
    .exported(true)
    .with_docs(format!(
        "Like `{}`, but returns the typed value directly and throws on invalid input.",
        plan.validator_name
    ))
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Where issues go.
#[derive(Debug, Clone)]
enum Sink {
    Top,
    Branch(String),
}

/// The value being checked, its path, and the active sink.
#[derive(Debug, Clone)]
struct Site {
    value: Expr,
    path: Vec<Expr>,
    sink: Sink,
}

impl Site {
    fn child(&self, value: Expr, segment: Expr) -> Site {
        let mut path = self.path.clone();
        path.push(segment);
        Site {
            value,
            path,
            sink: self.sink.clone(),
        }
    }
}

struct Issue {
    code: IssueCode,
    message: Expr,
    expected: Expr,
    received: Expr,
}

impl Issue {
    fn new(code: IssueCode, message: Expr, expected: impl Into<String>, received: Expr) -> Self {
        Self {
            code,
            message,
            expected: Expr::string(expected),
            received,
        }
    }
}

#[derive(Default)]
struct Emitter {
    counter: usize,
    uses_abort: bool,
}

impl Emitter {
    fn fresh(&mut self, prefix: &str) -> String {
        self.counter += 1;
        format!("{prefix}{}", self.counter)
    }

    /// Statements recording `issue` at the site's own path.
    fn report(&mut self, site: &Site, issue: Issue) -> Vec<Stmt> {
        let path = site.path.clone();
        self.report_at(site, path, issue)
    }

    fn report_at(&mut self, site: &Site, path: Vec<Expr>, issue: Issue) -> Vec<Stmt> {
        let record = Expr::object(vec![
            ("code".into(), Expr::string(issue.code.as_str())),
            ("path".into(), Expr::array(path)),
            ("message".into(), issue.message),
            ("expected".into(), issue.expected),
            ("received".into(), issue.received),
        ]);
        self.sink_push(&site.sink, vec![record])
    }

    /// Push `records` onto the sink, then stop if the sink says so.
    fn sink_push(&mut self, sink: &Sink, records: Vec<Expr>) -> Vec<Stmt> {
        match sink {
            Sink::Top => {
                self.uses_abort = true;
                vec![
                    Stmt::expr(Expr::method(Expr::ident("issues"), "push", records)),
                    Stmt::when(
                        Expr::ident("abortEarly"),
                        vec![Stmt::return_stmt(Some(failure()))],
                    ),
                ]
            }
            Sink::Branch(name) => vec![
                Stmt::expr(Expr::method(Expr::ident(name), "push", records)),
                Stmt::return_stmt(Some(Expr::ident(name))),
            ],
        }
    }

    fn check(&mut self, check: &Check, site: &Site) -> Vec<Stmt> {
        let v = || site.value.clone();
        match check {
            Check::Any => Vec::new(),
            Check::Never => self.report(
                site,
                Issue::new(
                    IssueCode::InvalidType,
                    Expr::string("No value is allowed here"),
                    "never",
                    kind_of(v()),
                ),
            ),
            Check::Const(value) => {
                let text = js_stringify(value);
                let test = match primitive_literal(value) {
                    Some(literal) => Expr::ne(v(), literal),
                    None => Expr::ne(json_stringify(v()), Expr::string(&text)),
                };
                let issue = Issue::new(
                    IssueCode::InvalidValue,
                    Expr::string(format!("Invalid value, expected {text}")),
                    text,
                    json_stringify(v()),
                );
                vec![Stmt::when(test, self.report(site, issue))]
            }
            Check::Enum(values) => {
                let allowed = allowed_values(values);
                let literals: Option<Vec<Expr>> = values.iter().map(primitive_literal).collect();
                let included = match literals {
                    Some(literals) => Expr::method(
                        Expr::cast(
                            Expr::array(literals),
                            TypeExpr::array(TypeExpr::unknown()),
                        ),
                        "includes",
                        vec![v()],
                    ),
                    None => Expr::method(
                        Expr::array(
                            values
                                .iter()
                                .map(|value| Expr::string(js_stringify(value)))
                                .collect(),
                        ),
                        "includes",
                        vec![json_stringify(v())],
                    ),
                };
                let issue = Issue::new(
                    IssueCode::InvalidValue,
                    Expr::string(format!("Invalid value, expected one of {allowed}")),
                    allowed,
                    json_stringify(v()),
                );
                vec![Stmt::when(Expr::not(included), self.report(site, issue))]
            }
            Check::Ref { validator, .. } => self.reference(validator, site),
            Check::TypeUnion(primitives) => {
                let expected = primitives
                    .iter()
                    .map(|p| p.name())
                    .collect::<Vec<_>>()
                    .join(" | ");
                let matches = primitives.iter().map(|p| primitive_test(*p, v())).collect();
                let test = match Expr::fold(BinaryOp::Or, matches) {
                    Some(any) => Expr::not(any),
                    None => Expr::bool(true),
                };
                vec![Stmt::when(test, self.report(site, invalid_type(&expected, v())))]
            }
            Check::String(string) => {
                let guard = Expr::ne(Expr::type_of(v()), Expr::string("string"));
                let fail = self.report(site, invalid_type("string", v()));
                let constraints = self.string_constraints(string, site);
                vec![guarded(guard, fail, constraints)]
            }
            Check::Number(number) => self.number(number, site),
            Check::Boolean => {
                let guard = Expr::ne(Expr::type_of(v()), Expr::string("boolean"));
                vec![Stmt::when(guard, self.report(site, invalid_type("boolean", v())))]
            }
            Check::Null => {
                let guard = Expr::ne(v(), Expr::null());
                vec![Stmt::when(guard, self.report(site, invalid_type("null", v())))]
            }
            Check::Array(array) => {
                let guard = Expr::not(is_array(v()));
                let fail = self.report(site, invalid_type("array", v()));
                let constraints = self.array_constraints(array, site);
                vec![guarded(guard, fail, constraints)]
            }
            Check::Object(object) => {
                let guard = Expr::fold(
                    BinaryOp::Or,
                    vec![
                        Expr::ne(Expr::type_of(v()), Expr::string("object")),
                        Expr::eq(v(), Expr::null()),
                        is_array(v()),
                    ],
                )
                .unwrap_or_else(|| Expr::bool(true));
                let fail = self.report(site, invalid_type("object", v()));
                let constraints = self.object_constraints(object, site);
                vec![guarded(guard, fail, constraints)]
            }
            Check::OneOf(branches) => self.one_of(branches, site),
            Check::AnyOf(branches) => self.any_of(branches, site),
        }
    }

    fn reference(&mut self, validator: &str, site: &Site) -> Vec<Stmt> {
        let result = self.fresh("r");
        let options = match site.sink {
            Sink::Top => Expr::ident("options"),
            Sink::Branch(_) => Expr::object(vec![("abortEarly".into(), Expr::bool(true))]),
        };
        let issues = Expr::member(Expr::ident(&result), "issues");

        let mut on_failure = Vec::new();
        let (target, stop) = match &site.sink {
            Sink::Top => {
                self.uses_abort = true;
                (
                    "issues".to_string(),
                    Stmt::when(
                        Expr::ident("abortEarly"),
                        vec![Stmt::return_stmt(Some(failure()))],
                    ),
                )
            }
            Sink::Branch(name) => (name.clone(), Stmt::return_stmt(Some(Expr::ident(name)))),
        };
        if site.path.is_empty() {
            on_failure.push(Stmt::expr(Expr::method(
                Expr::ident(&target),
                "push",
                vec![Expr::spread(issues)],
            )));
        } else {
            let mut path = site.path.clone();
            path.push(Expr::spread(Expr::member(Expr::ident("issue"), "path")));
            let rebased = Expr::Object(vec![
                ObjectEntry::Spread(Expr::ident("issue")),
                ObjectEntry::Property("path".into(), Expr::array(path)),
            ]);
            on_failure.push(Stmt::for_of(
                "issue",
                issues,
                vec![Stmt::expr(Expr::method(
                    Expr::ident(&target),
                    "push",
                    vec![rebased],
                ))],
            ));
        }
        on_failure.push(stop);

        vec![
            Stmt::const_decl(
                &result,
                Expr::call(Expr::ident(validator), vec![site.value.clone(), options]),
            ),
            Stmt::when(
                Expr::not(Expr::member(Expr::ident(&result), "success")),
                on_failure,
            ),
        ]
    }

    fn string_constraints(&mut self, string: &StringCheck, site: &Site) -> Vec<Stmt> {
        let v = || site.value.clone();
        let mut out = Vec::new();
        if let Some(n) = string.min_length {
            out.push(self.count_check(site, length(v()), Counted::Characters, Relation::AtLeast, n));
        }
        if let Some(n) = string.max_length {
            out.push(self.count_check(site, length(v()), Counted::Characters, Relation::AtMost, n));
        }
        if let Some(pattern) = &string.pattern {
            let test = Expr::not(Expr::method(
                Expr::new_instance(Expr::ident("RegExp"), vec![Expr::string(pattern.as_str())]),
                "test",
                vec![v()],
            ));
            let issue = Issue::new(
                IssueCode::InvalidString,
                Expr::string(format!("String must match pattern /{pattern}/")),
                format!("/{pattern}/"),
                json_stringify(v()),
            );
            out.push(Stmt::when(test, self.report(site, issue)));
        }
        out
    }

    fn number(&mut self, number: &NumberCheck, site: &Site) -> Vec<Stmt> {
        let v = || site.value.clone();
        let expected = if number.integer { "integer" } else { "number" };
        let guard = Expr::ne(Expr::type_of(v()), Expr::string("number"));
        let fail = self.report(site, invalid_type(expected, v()));

        let mut bounds = Vec::new();
        for bound in &number.bounds {
            let op = match (bound.kind, bound.exclusive) {
                (BoundKind::Lower, false) => BinaryOp::Lt,
                (BoundKind::Lower, true) => BinaryOp::Le,
                (BoundKind::Upper, false) => BinaryOp::Gt,
                (BoundKind::Upper, true) => BinaryOp::Ge,
            };
            let (message, expected) = bound.texts();
            let issue = Issue::new(bound.code(), Expr::string(message), expected, string_of(v()));
            let report = self.report(site, issue);
            bounds.push(Stmt::when(
                Expr::binary(v(), op, Expr::number(bound.value)),
                report,
            ));
        }

        if !number.integer {
            return vec![guarded(guard, fail, bounds)];
        }
        let not_integer = Expr::not(Expr::method(
            Expr::ident("Number"),
            "isInteger",
            vec![v()],
        ));
        let issue = Issue::new(
            IssueCode::NotInteger,
            Expr::string("Expected integer, received float"),
            "integer",
            string_of(v()),
        );
        let integer_fail = self.report(site, issue);
        vec![Stmt::if_stmt(
            guard,
            Stmt::block(fail),
            Some(guarded(not_integer, integer_fail, bounds)),
        )]
    }

    fn count_check(
        &mut self,
        site: &Site,
        measured: Expr,
        counted: Counted,
        relation: Relation,
        n: u64,
    ) -> Stmt {
        let (op, code) = match relation {
            Relation::AtLeast => (BinaryOp::Lt, IssueCode::TooSmall),
            Relation::AtMost => (BinaryOp::Gt, IssueCode::TooBig),
            Relation::Exactly => (BinaryOp::Ne, IssueCode::TooSmall),
        };
        let (message, expected) = count_texts(counted, relation, n);
        let issue = Issue::new(code, Expr::string(message), expected, string_of(measured.clone()));
        Stmt::when(
            Expr::binary(measured, op, Expr::number(n as f64)),
            self.report(site, issue),
        )
    }

    fn array_constraints(&mut self, array: &ArrayCheck, site: &Site) -> Vec<Stmt> {
        let v = || site.value.clone();
        let mut out = Vec::new();

        match &array.elements {
            Elements::None => {}
            Elements::Uniform(check) => out.push(self.element_loop(check, site, 0)),
            Elements::FixedTuple(positions) => {
                let n = positions.len() as u64;
                let (message, expected) = count_texts(Counted::TupleElements, Relation::Exactly, n);
                for (op, code) in [
                    (BinaryOp::Lt, IssueCode::TooSmall),
                    (BinaryOp::Gt, IssueCode::TooBig),
                ] {
                    let issue = Issue::new(
                        code,
                        Expr::string(message.clone()),
                        expected.clone(),
                        string_of(length(v())),
                    );
                    let report = self.report(site, issue);
                    out.push(Stmt::when(
                        Expr::binary(length(v()), op, Expr::number(n as f64)),
                        report,
                    ));
                }
                out.extend(self.positions(positions, site));
            }
            Elements::OpenTuple { prefix, rest } => {
                let n = prefix.len() as u64;
                out.push(self.count_check(
                    site,
                    length(v()),
                    Counted::TupleElements,
                    Relation::AtLeast,
                    n,
                ));
                out.extend(self.positions(prefix, site));
                if !rest.is_trivial() {
                    out.push(self.element_loop(rest, site, prefix.len()));
                }
            }
        }

        if let Some(n) = array.min_items {
            out.push(self.count_check(site, length(v()), Counted::Elements, Relation::AtLeast, n));
        }
        if let Some(n) = array.max_items {
            out.push(self.count_check(site, length(v()), Counted::Elements, Relation::AtMost, n));
        }
        if array.unique {
            let distinct = Expr::member(
                Expr::new_instance(
                    Expr::ident("Set"),
                    vec![Expr::method(
                        v(),
                        "map",
                        vec![Expr::arrow(
                            vec![Param::new("item")],
                            vec![Stmt::return_stmt(Some(json_stringify(Expr::ident("item"))))],
                        )],
                    )],
                ),
                "size",
            );
            let issue = Issue::new(
                IssueCode::NotUnique,
                Expr::string("Array items must be unique"),
                "unique items",
                Expr::string("duplicate items"),
            );
            out.push(Stmt::when(
                Expr::ne(distinct, length(v())),
                self.report(site, issue),
            ));
        }
        out
    }

    /// `for (let i = start; i < v.length; i++) { const item = v[i]; ... }`
    fn element_loop(&mut self, check: &Check, site: &Site, start: usize) -> Stmt {
        let index = self.fresh("i");
        let item = self.fresh("v");
        let child = site.child(Expr::ident(&item), Expr::ident(&index));
        let mut body = vec![Stmt::const_decl(
            &item,
            Expr::index(site.value.clone(), Expr::ident(&index)),
        )];
        body.extend(self.check(check, &child));
        Stmt::for_loop(
            Some(Stmt::let_decl(&index, Some(Expr::number(start as f64)))),
            Some(Expr::binary(
                Expr::ident(&index),
                BinaryOp::Lt,
                length(site.value.clone()),
            )),
            Some(Expr::increment(Expr::ident(&index))),
            Stmt::block(body),
        )
    }

    /// One guarded check per tuple position that exists in the input.
    fn positions(&mut self, positions: &[Check], site: &Site) -> Vec<Stmt> {
        let mut out = Vec::new();
        for (k, check) in positions.iter().enumerate() {
            if check.is_trivial() {
                continue;
            }
            let item = self.fresh("v");
            let child = site.child(Expr::ident(&item), Expr::number(k as f64));
            let mut body = vec![Stmt::const_decl(
                &item,
                Expr::index(site.value.clone(), Expr::number(k as f64)),
            )];
            body.extend(self.check(check, &child));
            out.push(Stmt::when(
                Expr::binary(
                    length(site.value.clone()),
                    BinaryOp::Gt,
                    Expr::number(k as f64),
                ),
                body,
            ));
        }
        out
    }

    fn object_constraints(&mut self, object: &ObjectCheck, site: &Site) -> Vec<Stmt> {
        let record = self.fresh("o");
        let o = || Expr::ident(&record);
        let keys = || Expr::method(Expr::ident("Object"), "keys", vec![o()]);
        let mut out = Vec::new();

        if let Some(n) = object.min_properties {
            out.push(self.count_check(site, length(keys()), Counted::Properties, Relation::AtLeast, n));
        }
        if let Some(n) = object.max_properties {
            out.push(self.count_check(site, length(keys()), Counted::Properties, Relation::AtMost, n));
        }

        for key in &object.required {
            let quoted = js_stringify(&Value::String(key.clone()));
            let issue = Issue::new(
                IssueCode::MissingKey,
                Expr::string(format!("Missing required property {quoted}")),
                key.clone(),
                Expr::string("undefined"),
            );
            out.push(Stmt::when(
                Expr::not(has_own(o(), key)),
                self.report(site, issue),
            ));
        }

        for (key, check) in &object.properties {
            let item = self.fresh("v");
            let child = site.child(Expr::ident(&item), Expr::string(key));
            let mut body = vec![Stmt::const_decl(&item, Expr::member(o(), key))];
            body.extend(self.check(check, &child));
            out.push(Stmt::when(has_own(o(), key), body));
        }

        if let Some(declared) = &object.closed {
            let key = self.fresh("key");
            let mut path = site.path.clone();
            path.push(Expr::ident(&key));
            let issue = Issue::new(
                IssueCode::UnrecognizedKey,
                Expr::binary(
                    Expr::string("Unrecognized key "),
                    BinaryOp::Add,
                    json_stringify(Expr::ident(&key)),
                ),
                declared_keys_text(declared),
                Expr::ident(&key),
            );
            let report = self.report_at(site, path, issue);
            let body = if declared.is_empty() {
                report
            } else {
                let known = Expr::method(
                    Expr::array(declared.iter().map(Expr::string).collect()),
                    "includes",
                    vec![Expr::ident(&key)],
                );
                vec![Stmt::when(Expr::not(known), report)]
            };
            out.push(Stmt::for_of(&key, keys(), body));
        }

        if out.is_empty() {
            return out;
        }
        let mut with_binding = vec![Stmt::const_decl(
            &record,
            Expr::cast(
                site.value.clone(),
                TypeExpr::record(TypeExpr::unknown()),
            ),
        )];
        with_binding.extend(out);
        with_binding
    }

    /// Run each branch against its own sink; returns the branch array name.
    fn branches(&mut self, branches: &[Check], site: &Site) -> (String, Stmt) {
        let mut arrows = Vec::new();
        for branch in branches {
            let sink = self.fresh("sink");
            let branch_site = Site {
                value: site.value.clone(),
                path: site.path.clone(),
                sink: Sink::Branch(sink.clone()),
            };
            let mut body = vec![Stmt::typed_const(
                &sink,
                TypeExpr::array(TypeExpr::named("ValidationIssue")),
                Expr::array(vec![]),
            )];
            body.extend(self.check(branch, &branch_site));
            body.push(Stmt::return_stmt(Some(Expr::ident(&sink))));
            arrows.push(Expr::arrow(vec![], body));
        }
        let name = self.fresh("branches");
        let decl = Stmt::const_decl(&name, Expr::array(arrows));
        (name, decl)
    }

    fn one_of(&mut self, branches: &[Check], site: &Site) -> Vec<Stmt> {
        let (list, decl) = self.branches(branches, site);
        let matched = self.fresh("matched");
        let n = branches.len();
        let issue = Issue::new(
            IssueCode::InvalidType,
            Expr::binary(
                Expr::binary(
                    Expr::string(format!(
                        "Expected exactly one of {n} schemas to match, but "
                    )),
                    BinaryOp::Add,
                    string_of(Expr::ident(&matched)),
                ),
                BinaryOp::Add,
                Expr::string(" matched"),
            ),
            format!("exactly one of {n} schemas"),
            Expr::binary(
                string_of(Expr::ident(&matched)),
                BinaryOp::Add,
                Expr::string(" matched"),
            ),
        );
        vec![
            decl,
            Stmt::let_decl(&matched, Some(Expr::number(0))),
            Stmt::for_of(
                "branch",
                Expr::ident(&list),
                vec![Stmt::when(
                    clean_branch(),
                    vec![Stmt::expr(Expr::increment(Expr::ident(&matched)))],
                )],
            ),
            Stmt::when(
                Expr::ne(Expr::ident(&matched), Expr::number(1)),
                self.report(site, issue),
            ),
        ]
    }

    fn any_of(&mut self, branches: &[Check], site: &Site) -> Vec<Stmt> {
        let (list, decl) = self.branches(branches, site);
        let matched = self.fresh("matched");
        let n = branches.len();
        let issue = Issue::new(
            IssueCode::InvalidType,
            Expr::string(format!("Expected at least one of {n} schemas to match")),
            format!("at least one of {n} schemas"),
            Expr::string("none matched"),
        );
        vec![
            decl,
            Stmt::let_decl(&matched, Some(Expr::bool(false))),
            Stmt::for_of(
                "branch",
                Expr::ident(&list),
                vec![Stmt::when(
                    clean_branch(),
                    vec![
                        Stmt::expr(Expr::assign(Expr::ident(&matched), Expr::bool(true))),
                        Stmt::Break,
                    ],
                )],
            ),
            Stmt::when(Expr::not(Expr::ident(&matched)), self.report(site, issue)),
        ]
    }
}

/// `if (guard) { fail } else { constraints }`, without an empty else.
fn guarded(guard: Expr, fail: Vec<Stmt>, constraints: Vec<Stmt>) -> Stmt {
    let alternate = (!constraints.is_empty()).then(|| Stmt::block(constraints));
    Stmt::if_stmt(guard, Stmt::block(fail), alternate)
}

fn clean_branch() -> Expr {
    Expr::eq(
        length(Expr::call(Expr::ident("branch"), vec![])),
        Expr::number(0),
    )
}

fn invalid_type(expected: &str, value: Expr) -> Issue {
    Issue::new(
        IssueCode::InvalidType,
        Expr::binary(
            Expr::string(format!("Expected {expected}, received ")),
            BinaryOp::Add,
            kind_of(value.clone()),
        ),
        expected,
        kind_of(value),
    )
}

/// `v === null ? "null" : Array.isArray(v) ? "array" : typeof v`
fn kind_of(value: Expr) -> Expr {
    Expr::conditional(
        Expr::eq(value.clone(), Expr::null()),
        Expr::string("null"),
        Expr::conditional(
            is_array(value.clone()),
            Expr::string("array"),
            Expr::type_of(value),
        ),
    )
}

fn primitive_test(primitive: PrimitiveType, v: Expr) -> Expr {
    let type_is = |name: &str, v: Expr| Expr::eq(Expr::type_of(v), Expr::string(name));
    match primitive {
        PrimitiveType::String => type_is("string", v),
        PrimitiveType::Number => type_is("number", v),
        PrimitiveType::Integer => Expr::method(Expr::ident("Number"), "isInteger", vec![v]),
        PrimitiveType::Boolean => type_is("boolean", v),
        PrimitiveType::Null => Expr::eq(v, Expr::null()),
        PrimitiveType::Array => is_array(v),
        PrimitiveType::Object => Expr::and(
            Expr::and(type_is("object", v.clone()), Expr::ne(v.clone(), Expr::null())),
            Expr::not(is_array(v)),
        ),
    }
}

fn primitive_literal(value: &Value) -> Option<Expr> {
    Some(match value {
        Value::Null => Expr::null(),
        Value::Bool(b) => Expr::bool(*b),
        Value::Number(n) => Expr::number(n.as_f64()?),
        Value::String(s) => Expr::string(s),
        Value::Array(_) | Value::Object(_) => return None,
    })
}

fn is_array(value: Expr) -> Expr {
    Expr::method(Expr::ident("Array"), "isArray", vec![value])
}

fn length(value: Expr) -> Expr {
    Expr::member(value, "length")
}

fn json_stringify(value: Expr) -> Expr {
    Expr::method(Expr::ident("JSON"), "stringify", vec![value])
}

fn string_of(value: Expr) -> Expr {
    Expr::call(Expr::ident("String"), vec![value])
}

fn has_own(object: Expr, key: &str) -> Expr {
    Expr::method(
        Expr::member(
            Expr::member(Expr::ident("Object"), "prototype"),
            "hasOwnProperty",
        ),
        "call",
        vec![object, Expr::string(key)],
    )
}
