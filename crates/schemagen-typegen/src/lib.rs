//! TypeScript types and runtime validators from JSON Schema.
//!
//! `schemagen-typegen` reads a JSON Schema document, walks the `$ref` graph
//! from the requested targets, and produces one TypeScript module holding a
//! type declaration and a validator function per reachable schema.
//!
//! # Architecture
//!
//! ```text
//! JSON Schema ─> SchemaDocument ─> collect ─> NameRegistry ─┬─> types      ─> type declarations
//!                (input)           (pointers)  (names)       └─> validator  ─> Check plan ─┬─> TypeScript validators
//!                                                                                           └─> in-process evaluator
//! ```
//!
//! # Example
//!
//! ```
//! use schemagen_typegen::{GenerateOptions, Target, ValidationOptions, generate};
//!
//! let schema = serde_json::json!({
//!     "$defs": {
//!         "User": {
//!             "type": "object",
//!             "properties": { "id": { "type": "integer", "minimum": 1 } },
//!             "required": ["id"]
//!         }
//!     }
//! });
//! let targets = ["#/$defs/User".parse::<Target>().unwrap()];
//! let generation = generate(&schema, &targets, &GenerateOptions::default()).unwrap();
//!
//! let text = generation.text();
//! assert!(text.contains("export interface User {"));
//! assert!(text.contains("export function validateUser("));
//!
//! let result = generation
//!     .validate("User", &serde_json::json!({ "id": 0 }), ValidationOptions::default())
//!     .unwrap();
//! assert!(!result.is_success());
//! ```

pub mod collect;
pub mod error;
pub mod generate;
pub mod input;
pub mod ir;
pub mod names;
pub mod output;
pub mod pointer;
pub mod runtime;
pub mod target;
pub mod tuple;

pub use error::GenerateError;
pub use generate::{GenerateOptions, GeneratedEntry, Generation, generate};
pub use input::SchemaDocument;
pub use output::validator::{
    IssueCode, PathToken, ValidationIssue, ValidationOptions, ValidationResult,
};
pub use pointer::{Pointer, PointerError};
pub use runtime::{DEFAULT_RUNTIME_IMPORT, RUNTIME_MODULE, runtime_module};
pub use target::{Target, TargetError};
