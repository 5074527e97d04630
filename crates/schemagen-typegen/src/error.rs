//! Error types for generation.

use crate::pointer::{Pointer, PointerError};
use crate::target::TargetError;
use thiserror::Error;

/// Fatal errors raised by a generation run.
///
/// Anything recoverable is logged as a warning instead and never reaches
/// this type.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Pointer(#[from] PointerError),

    #[error(transparent)]
    Target(#[from] TargetError),

    #[error(
        "name collision: {first} and {second} both resolve to `{name}`; \
         supply an explicit name for one of them (e.g. --target path={second},name=Other)"
    )]
    NameCollision {
        name: String,
        first: Pointer,
        second: Pointer,
    },

    #[error(
        "{pointer} resolves to `{name}`, which the generated module already binds; \
         supply an explicit name for it (e.g. --target path={pointer},name=Other)"
    )]
    ReservedName { name: String, pointer: Pointer },

    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    #[error("internal error: {0}")]
    Internal(String),
}
