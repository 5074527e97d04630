//! Target specifiers: which schema locations to generate, and under what name.
//!
//! Accepted forms:
//!
//! ```text
//! #/definitions/User
//! path=#/definitions/User,name=Account
//! ```

use crate::pointer::{Pointer, PointerError};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TargetError {
    #[error("invalid target `{target}`: `{pair}` is not a key=value pair")]
    Malformed { target: String, pair: String },

    #[error("invalid target `{target}`: `{pair}` has an empty key or value")]
    EmptyKeyOrValue { target: String, pair: String },

    #[error("invalid target `{target}`: unknown key `{key}` (expected `path` or `name`)")]
    UnknownKey { target: String, key: String },

    #[error("invalid target `{target}`: key `{key}` given more than once")]
    DuplicateKey { target: String, key: String },

    #[error("invalid target `{0}`: missing `path`")]
    MissingPath(String),

    #[error("invalid target `{target}`: {source}")]
    Pointer {
        target: String,
        #[source]
        source: PointerError,
    },
}

/// A requested generation unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub pointer: Pointer,
    pub name: Option<String>,
}

impl Target {
    pub fn new(pointer: Pointer) -> Self {
        Self {
            pointer,
            name: None,
        }
    }

    pub fn named(pointer: Pointer, name: impl Into<String>) -> Self {
        Self {
            pointer,
            name: Some(name.into()),
        }
    }

    pub fn root() -> Self {
        Self::new(Pointer::root())
    }
}

impl FromStr for Target {
    type Err = TargetError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let pointer_error = |source| TargetError::Pointer {
            target: input.to_string(),
            source,
        };

        if input.starts_with('#') {
            return Pointer::parse_ref(input)
                .map(Target::new)
                .map_err(pointer_error);
        }

        let mut path = None;
        let mut name = None;
        for pair in input.split(',') {
            let Some((key, value)) = pair.split_once('=') else {
                return Err(TargetError::Malformed {
                    target: input.to_string(),
                    pair: pair.to_string(),
                });
            };
            let (key, value) = (key.trim(), value.trim());
            if key.is_empty() || value.is_empty() {
                return Err(TargetError::EmptyKeyOrValue {
                    target: input.to_string(),
                    pair: pair.to_string(),
                });
            }
            let slot = match key {
                "path" => &mut path,
                "name" => &mut name,
                _ => {
                    return Err(TargetError::UnknownKey {
                        target: input.to_string(),
                        key: key.to_string(),
                    });
                }
            };
            if slot.replace(value.to_string()).is_some() {
                return Err(TargetError::DuplicateKey {
                    target: input.to_string(),
                    key: key.to_string(),
                });
            }
        }

        let path = path.ok_or_else(|| TargetError::MissingPath(input.to_string()))?;
        let pointer = Pointer::parse_ref(&path).map_err(pointer_error)?;
        Ok(Target { pointer, name })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_pointer() {
        let t: Target = "#/definitions/User".parse().unwrap();
        assert_eq!(t.pointer.to_string(), "#/definitions/User");
        assert_eq!(t.name, None);

        let root: Target = "#".parse().unwrap();
        assert!(root.pointer.is_root());
    }

    #[test]
    fn key_value_form() {
        let t: Target = "path=#/$defs/User,name=Account".parse().unwrap();
        assert_eq!(t.pointer.to_string(), "#/$defs/User");
        assert_eq!(t.name.as_deref(), Some("Account"));

        let t: Target = "name=Everything, path=#".parse().unwrap();
        assert!(t.pointer.is_root());
    }

    #[test]
    fn rejects_bad_specifiers() {
        assert!(matches!(
            "path=#/a,oops".parse::<Target>(),
            Err(TargetError::Malformed { .. })
        ));
        assert!(matches!(
            "path=,name=X".parse::<Target>(),
            Err(TargetError::EmptyKeyOrValue { .. })
        ));
        assert!(matches!(
            "path=#/a,kind=X".parse::<Target>(),
            Err(TargetError::UnknownKey { key, .. }) if key == "kind"
        ));
        assert!(matches!(
            "name=X".parse::<Target>(),
            Err(TargetError::MissingPath(_))
        ));
        assert!(matches!(
            "path=#/a,path=#/b".parse::<Target>(),
            Err(TargetError::DuplicateKey { .. })
        ));
        assert!(matches!(
            "path=definitions/User".parse::<Target>(),
            Err(TargetError::Pointer { .. })
        ));
        assert!(matches!(
            "#/".parse::<Target>(),
            Err(TargetError::Pointer { .. })
        ));
    }
}
