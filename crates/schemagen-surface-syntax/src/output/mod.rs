//! Output writers - emit IR as source code.

#[cfg(feature = "write-typescript")]
pub mod typescript;

#[cfg(feature = "write-typescript")]
pub use typescript::{TYPESCRIPT_WRITER, TypeScriptWriter, TypeScriptWriterImpl};
