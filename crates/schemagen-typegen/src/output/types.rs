//! Type declaration compiler.
//!
//! Never fails: anything it cannot express becomes `unknown`.

use super::{Context, RefTarget};
use crate::ir::*;
use crate::names::EntryNames;
use crate::pointer::Pointer;
use crate::tuple::{self, TupleShape};
use schemagen_surface_syntax::{Field, Literal, Stmt, TypeExpr, TypeScriptWriter};
use serde_json::Value;
use std::collections::HashSet;
use tracing::warn;

/// Compile the declaration for one generated entry.
///
/// A top-level object with properties becomes an `interface`; anything
/// else a `type` alias.
pub fn declaration(ctx: &Context<'_>, node: &SchemaNode, names: &EntryNames) -> Stmt {
    let mut compiler = TypeCompiler::new(ctx);
    let docs = node.description.clone();

    if let SchemaKind::Object(object) = &node.kind {
        if let Some(properties) = object.properties.as_ref().filter(|p| !p.is_empty()) {
            return Stmt::Interface {
                name: names.type_name.clone(),
                fields: properties
                    .iter()
                    .map(|(key, prop)| compiler.field(object, key, prop))
                    .collect(),
                exported: names.exported,
                docs,
            };
        }
    }

    Stmt::TypeAlias {
        name: names.type_name.clone(),
        ty: compiler.compile(node),
        exported: names.exported,
        docs,
    }
}

struct TypeCompiler<'c, 'a> {
    ctx: &'c Context<'a>,
    /// Unregistered refs currently being expanded inline.
    in_progress: HashSet<Pointer>,
}

impl<'c, 'a> TypeCompiler<'c, 'a> {
    fn new(ctx: &'c Context<'a>) -> Self {
        Self {
            ctx,
            in_progress: HashSet::new(),
        }
    }

    fn compile(&mut self, node: &SchemaNode) -> TypeExpr {
        match &node.kind {
            SchemaKind::Any => TypeExpr::unknown(),
            SchemaKind::Never => TypeExpr::never(),
            SchemaKind::Const(value) => literal_type(value).unwrap_or_else(TypeExpr::unknown),
            SchemaKind::Enum(values) => {
                if values.is_empty() {
                    return TypeExpr::never();
                }
                TypeExpr::union(
                    values
                        .iter()
                        .map(|v| literal_type(v).unwrap_or_else(TypeExpr::unknown))
                        .collect(),
                )
            }
            SchemaKind::OneOf(branches) | SchemaKind::AnyOf(branches) => {
                if branches.is_empty() {
                    return TypeExpr::unknown();
                }
                TypeExpr::union(branches.iter().map(|b| self.compile(b)).collect())
            }
            SchemaKind::AllOf(branches) => {
                if branches.is_empty() {
                    return TypeExpr::unknown();
                }
                TypeExpr::intersection(branches.iter().map(|b| self.compile(b)).collect())
            }
            SchemaKind::Ref(reference) => self.reference(reference),
            SchemaKind::String(_) => TypeExpr::string(),
            SchemaKind::Number(_) => TypeExpr::number(),
            SchemaKind::Boolean => TypeExpr::boolean(),
            SchemaKind::Null => TypeExpr::null(),
            SchemaKind::Array(array) => self.array(array),
            SchemaKind::Object(object) => match object.properties.as_ref() {
                Some(properties) if !properties.is_empty() => TypeExpr::Object(
                    properties
                        .iter()
                        .map(|(key, prop)| self.field(object, key, prop))
                        .collect(),
                ),
                // `properties: {}` with `additionalProperties: false` admits no keys.
                Some(_) if object.additional_properties == Some(false) => {
                    TypeExpr::record(TypeExpr::never())
                }
                _ => TypeExpr::record(TypeExpr::unknown()),
            },
            SchemaKind::TypeUnion(primitives) => {
                let mut members: Vec<TypeExpr> = Vec::new();
                for primitive in primitives {
                    let ty = primitive_type(*primitive);
                    if !members.contains(&ty) {
                        members.push(ty);
                    }
                }
                TypeExpr::union(members)
            }
        }
    }

    fn field(&mut self, object: &ObjectSchema, key: &str, prop: &SchemaNode) -> Field {
        let ty = self.compile(prop);
        let field = if object.is_required(key) {
            Field::required(key, ty)
        } else {
            Field::optional(key, ty)
        };
        match &prop.description {
            Some(docs) => field.with_docs(docs.clone()),
            None => field,
        }
    }

    fn array(&mut self, array: &ArraySchema) -> TypeExpr {
        match tuple::detect(array) {
            TupleShape::NotTuple { items: None } => TypeExpr::array(TypeExpr::unknown()),
            TupleShape::NotTuple { items: Some(items) } => TypeExpr::array(self.compile(items)),
            TupleShape::Fixed { positions } => TypeExpr::Tuple {
                elements: positions.iter().map(|p| self.compile(p)).collect(),
                rest: None,
                rest_note: None,
            },
            TupleShape::Open { prefix, rest } => {
                let elements = prefix.iter().map(|p| self.compile(p)).collect();
                let rest_type = self.compile(rest);
                TypeExpr::Tuple {
                    elements,
                    rest: Some(Box::new(TypeExpr::unknown())),
                    rest_note: Some(format!(
                        "items: {}",
                        TypeScriptWriter::emit_type(&rest_type)
                    )),
                }
            }
        }
    }

    fn reference(&mut self, reference: &str) -> TypeExpr {
        match self.ctx.resolve_ref(reference) {
            RefTarget::Registered(_, names) => TypeExpr::named(names.type_name.clone()),
            RefTarget::Inline(pointer, value) => {
                if self.in_progress.contains(&pointer) {
                    warn!(%pointer, "recursive unregistered $ref, typing the cycle as unknown");
                    return TypeExpr::unknown();
                }
                self.in_progress.insert(pointer.clone());
                let node = self.ctx.doc.node(value);
                let ty = self.compile(&node);
                self.in_progress.remove(&pointer);
                ty
            }
            RefTarget::Unresolved => TypeExpr::unknown(),
        }
    }
}

fn literal_type(value: &Value) -> Option<TypeExpr> {
    let literal = match value {
        Value::Null => Literal::Null,
        Value::Bool(b) => Literal::Bool(*b),
        Value::Number(n) => Literal::Number(n.as_f64()?),
        Value::String(s) => Literal::String(s.clone()),
        Value::Array(_) | Value::Object(_) => return None,
    };
    Some(TypeExpr::Literal(literal))
}

fn primitive_type(primitive: PrimitiveType) -> TypeExpr {
    match primitive {
        PrimitiveType::String => TypeExpr::string(),
        PrimitiveType::Number | PrimitiveType::Integer => TypeExpr::number(),
        PrimitiveType::Boolean => TypeExpr::boolean(),
        PrimitiveType::Null => TypeExpr::null(),
        PrimitiveType::Array => TypeExpr::array(TypeExpr::unknown()),
        PrimitiveType::Object => TypeExpr::record(TypeExpr::unknown()),
    }
}
