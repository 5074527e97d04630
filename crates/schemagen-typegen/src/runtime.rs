//! The validation runtime contract.
//!
//! Generated files only `import type` from this module, so it has no
//! runtime code: it declares the shapes every generated validator returns.

use crate::output::validator::IssueCode;
use schemagen_surface_syntax::{Field, Literal, Program, Stmt, TypeExpr, TypeScriptWriter};
use std::sync::LazyLock;

/// Module specifier generated files import the runtime types from.
pub const DEFAULT_RUNTIME_IMPORT: &str = "./validation-runtime";

/// Type names generated files import from the runtime module.
pub const RUNTIME_TYPES: [&str; 3] = ["ValidationIssue", "ValidationOptions", "ValidationResult"];

/// The runtime contract module, rendered once.
pub static RUNTIME_MODULE: LazyLock<String> = LazyLock::new(runtime_module);

/// Source text of the runtime contract module.
pub fn runtime_module() -> String {
    TypeScriptWriter::emit(&runtime_program())
}

fn runtime_program() -> Program {
    let codes = IssueCode::ALL
        .iter()
        .map(|code| TypeExpr::Literal(Literal::String(code.as_str().to_string())))
        .collect();
    let bool_literal = |b: bool| TypeExpr::Literal(Literal::Bool(b));

    Program::new(vec![
        Stmt::comment("Validation runtime contract shared by generated validators."),
        alias("ValidationIssueCode", TypeExpr::union(codes), None),
        alias(
            "PathSegment",
            TypeExpr::union(vec![TypeExpr::string(), TypeExpr::number()]),
            Some("An object key or an array index."),
        ),
        Stmt::Interface {
            name: "ValidationIssue".into(),
            fields: vec![
                Field::required("code", TypeExpr::named("ValidationIssueCode")),
                Field::required("path", TypeExpr::array(TypeExpr::named("PathSegment")))
                    .with_docs("Location of the offending value, from the validated root."),
                Field::required("message", TypeExpr::string()),
                Field::required("expected", TypeExpr::string()),
                Field::required("received", TypeExpr::string()),
            ],
            exported: true,
            docs: Some("One reason a value was rejected.".into()),
        },
        alias(
            "ValidationResult<T>",
            TypeExpr::union(vec![
                TypeExpr::Object(vec![
                    Field::required("success", bool_literal(true)),
                    Field::required("data", TypeExpr::named("T")),
                ]),
                TypeExpr::Object(vec![
                    Field::required("success", bool_literal(false)),
                    Field::required(
                        "issues",
                        TypeExpr::array(TypeExpr::named("ValidationIssue")),
                    ),
                ]),
            ]),
            None,
        ),
        Stmt::Interface {
            name: "ValidationOptions".into(),
            fields: vec![
                Field::optional("abortEarly", TypeExpr::boolean())
                    .with_docs("Stop at the first issue instead of collecting all of them."),
            ],
            exported: true,
            docs: None,
        },
    ])
}

fn alias(name: &str, ty: TypeExpr, docs: Option<&str>) -> Stmt {
    Stmt::TypeAlias {
        name: name.to_string(),
        ty,
        exported: true,
        docs: docs.map(str::to_string),
    }
}
