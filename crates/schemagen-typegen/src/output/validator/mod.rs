//! Runtime validators.
//!
//! A schema node is compiled once into a [`plan::Check`] tree. The tree is
//! then either emitted as TypeScript ([`emit`]) or run directly against a
//! JSON value ([`eval`]); both walk it the same way, so they agree on
//! which issues a value produces.

pub mod emit;
pub mod eval;
pub mod issue;
pub mod plan;

pub use emit::validator_functions;
pub use issue::{IssueCode, PathToken, ValidationIssue, ValidationOptions, ValidationResult};
pub use plan::{Check, Pattern, Plan, PlanSet, compile};
