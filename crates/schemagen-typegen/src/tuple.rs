//! Tuple detection across draft encodings.

use crate::ir::{ArraySchema, Items, SchemaNode};

/// How an array schema constrains element positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TupleShape<'a> {
    /// Every element uses the same schema, if any.
    NotTuple { items: Option<&'a SchemaNode> },
    /// Exactly `positions.len()` elements, one schema each.
    Fixed { positions: &'a [SchemaNode] },
    /// A typed prefix followed by any number of `rest` elements.
    Open {
        prefix: &'a [SchemaNode],
        rest: &'a SchemaNode,
    },
}

/// Classify an array schema.
///
/// `prefixItems` wins when present; it is open-ended iff a single-schema
/// `items` trails it. Otherwise list-form `items` is a fixed legacy tuple.
pub fn detect(array: &ArraySchema) -> TupleShape<'_> {
    if let Some(prefix) = &array.prefix_items {
        return match &array.items {
            Some(Items::Single(rest)) => TupleShape::Open {
                prefix,
                rest: rest.as_ref(),
            },
            _ => TupleShape::Fixed { positions: prefix },
        };
    }
    match &array.items {
        Some(Items::List(positions)) => TupleShape::Fixed { positions },
        Some(Items::Single(items)) => TupleShape::NotTuple {
            items: Some(items.as_ref()),
        },
        None => TupleShape::NotTuple { items: None },
    }
}
