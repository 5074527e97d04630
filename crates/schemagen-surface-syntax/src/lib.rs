//! Code-builder IR and pretty-printer for generated TypeScript.
//!
//! Generators assemble a [`Program`] out of statements, expressions and type
//! expressions, then hand it to a [`Writer`] that prints source text. The
//! writer owns layout, indentation, quoting and parenthesization, so callers
//! never concatenate source fragments by hand.
//!
//! # Example
//!
//! ```
//! use schemagen_surface_syntax::{Expr, Program, Stmt, TypeScriptWriter};
//!
//! let program = Program::new(vec![Stmt::const_decl("x", Expr::number(1))]);
//! assert_eq!(TypeScriptWriter::emit(&program), "const x = 1;\n");
//! ```

pub mod ir;
pub mod traits;

pub mod output;

// Re-exports: IR types
pub use ir::{
    BinaryOp, Expr, Field, Function, Literal, ObjectEntry, Param, Program, Stmt, TypeExpr,
    UnaryOp,
};

// Re-exports: Traits
pub use traits::Writer;

// Re-exports: Built-in writers
#[cfg(feature = "write-typescript")]
pub use output::typescript::{TYPESCRIPT_WRITER, TypeScriptWriter, TypeScriptWriterImpl};
