//! Input format parsers.
//!
//! The JSON Schema normalizer turns raw documents into [`SchemaNode`](crate::ir::SchemaNode)s.

pub(crate) mod jsonschema;

pub use jsonschema::SchemaDocument;
