//! Root-relative JSON pointers (`#`, `#/a/b`).

use serde_json::Value;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PointerError {
    #[error("invalid pointer `{0}`: expected `#` or a path starting with `#/`")]
    Malformed(String),

    #[error("invalid pointer `{0}`: empty path after `#/`")]
    Empty(String),

    #[error("invalid pointer `{0}`: percent-escapes do not decode to UTF-8")]
    BadEncoding(String),

    #[error("pointer {pointer} not found: no `{segment}` in the schema")]
    NotFound { pointer: String, segment: String },

    #[error("pointer {pointer} not found: cannot descend into `{segment}` of a scalar value")]
    NotTraversable { pointer: String, segment: String },

    #[error("pointer {pointer} not found: `{segment}` is not an array index")]
    BadIndex { pointer: String, segment: String },
}

/// A pointer into the schema document.
///
/// The empty segment list is the document root and displays as `#`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pointer {
    segments: Vec<String>,
}

impl Pointer {
    pub fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a strict `#/...` pointer. A non-empty path is required.
    ///
    /// The input is a URI fragment, so percent-escapes are decoded before
    /// the path is split and `~` escapes are applied.
    pub fn parse(input: &str) -> Result<Self, PointerError> {
        let Some(rest) = input.strip_prefix("#/") else {
            return Err(PointerError::Malformed(input.to_string()));
        };
        if rest.is_empty() {
            return Err(PointerError::Empty(input.to_string()));
        }
        let decoded = urlencoding::decode(rest)
            .map_err(|_| PointerError::BadEncoding(input.to_string()))?;
        Ok(Self {
            segments: decoded.split('/').map(unescape).collect(),
        })
    }

    /// Parse a `$ref`/target value. Accepts `#` for the root as well.
    pub fn parse_ref(input: &str) -> Result<Self, PointerError> {
        if input == "#" {
            return Ok(Self::root());
        }
        Self::parse(input)
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    /// Walk `document` along this pointer.
    pub fn resolve<'a>(&self, document: &'a Value) -> Result<&'a Value, PointerError> {
        let mut current = document;
        for segment in &self.segments {
            current = match current {
                Value::Object(map) => map.get(segment).ok_or_else(|| PointerError::NotFound {
                    pointer: self.to_string(),
                    segment: segment.clone(),
                })?,
                Value::Array(items) => {
                    let index: usize = segment.parse().map_err(|_| PointerError::BadIndex {
                        pointer: self.to_string(),
                        segment: segment.clone(),
                    })?;
                    items.get(index).ok_or_else(|| PointerError::NotFound {
                        pointer: self.to_string(),
                        segment: segment.clone(),
                    })?
                }
                _ => {
                    return Err(PointerError::NotTraversable {
                        pointer: self.to_string(),
                        segment: segment.clone(),
                    });
                }
            };
        }
        Ok(current)
    }
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("#")?;
        for segment in &self.segments {
            write!(f, "/{}", segment.replace('~', "~0").replace('/', "~1"))?;
        }
        Ok(())
    }
}

fn unescape(segment: &str) -> String {
    // `~1` first so that `~01` decodes to `~1`, not `/`.
    segment.replace("~1", "/").replace("~0", "~")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_and_display() {
        let p = Pointer::parse("#/definitions/User").unwrap();
        assert_eq!(p.segments(), ["definitions", "User"]);
        assert_eq!(p.to_string(), "#/definitions/User");
        assert_eq!(Pointer::root().to_string(), "#");
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!(matches!(
            Pointer::parse("definitions/User"),
            Err(PointerError::Malformed(_))
        ));
        assert!(matches!(Pointer::parse("#/"), Err(PointerError::Empty(_))));
        assert!(matches!(Pointer::parse("#"), Err(PointerError::Malformed(_))));
    }

    #[test]
    fn parse_ref_accepts_root() {
        assert!(Pointer::parse_ref("#").unwrap().is_root());
        assert_eq!(Pointer::parse_ref("#/a").unwrap().last(), Some("a"));
    }

    #[test]
    fn escapes_round_trip() {
        let p = Pointer::parse("#/paths/~1users~1{id}/a~0b").unwrap();
        assert_eq!(p.segments(), ["paths", "/users/{id}", "a~b"]);
        assert_eq!(p.to_string(), "#/paths/~1users~1{id}/a~0b");
        assert_eq!(Pointer::parse("#/~01").unwrap().segments(), ["~1"]);
    }

    #[test]
    fn fragments_are_percent_decoded() {
        let p = Pointer::parse("#/$defs/My%20Type").unwrap();
        assert_eq!(p.segments(), ["$defs", "My Type"]);
        let doc = json!({ "$defs": { "My Type": { "type": "string" }, "a/b": 1 } });
        assert_eq!(p.resolve(&doc).unwrap()["type"], "string");
        let escaped = Pointer::parse("#/$defs/a~1b").unwrap();
        assert_eq!(escaped.resolve(&doc).unwrap(), &json!(1));
        assert!(matches!(
            Pointer::parse("#/$defs/%FF"),
            Err(PointerError::BadEncoding(_))
        ));
    }

    #[test]
    fn resolve_objects_and_arrays() {
        let doc = json!({ "a": { "b": [10, { "c": true }] } });
        let p = Pointer::parse("#/a/b/1/c").unwrap();
        assert_eq!(p.resolve(&doc).unwrap(), &json!(true));
        assert_eq!(Pointer::root().resolve(&doc).unwrap(), &doc);
    }

    #[test]
    fn resolve_errors_name_the_segment() {
        let doc = json!({ "a": { "b": [1] } });
        let err = Pointer::parse("#/a/missing").unwrap().resolve(&doc).unwrap_err();
        assert_eq!(
            err,
            PointerError::NotFound {
                pointer: "#/a/missing".into(),
                segment: "missing".into()
            }
        );
        assert!(matches!(
            Pointer::parse("#/a/b/x").unwrap().resolve(&doc),
            Err(PointerError::BadIndex { .. })
        ));
        assert!(matches!(
            Pointer::parse("#/a/b/0/deeper").unwrap().resolve(&doc),
            Err(PointerError::NotTraversable { .. })
        ));
        assert!(
            err.to_string().contains("#/a/missing") && err.to_string().contains("`missing`")
        );
    }
}
