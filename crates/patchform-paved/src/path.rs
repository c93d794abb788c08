//! Field path representation and parsing.
//!
//! A field path addresses a location in a JSON document using dot-separated
//! map keys, bracketed indices and the `[*]` wildcard:
//!
//! ```text
//! metadata.labels[app.kubernetes.io/name]
//! spec.forProvider.rules[0].cidr
//! metadata.ownerReferences[*].name
//! ```
//!
//! Bracket content that is not an integer (and not `*`) is a map key, which
//! lets keys contain dots. A quoted key such as `["*"]` is always a map key.

use crate::{PavedError, PavedResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const WILDCARD: &str = "*";

/// A single segment in a field path.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Segment {
    /// Map key access.
    Field(String),
    /// Sequence index access.
    Index(usize),
    /// Every element of a sequence, or every entry of a map.
    Wildcard,
}

impl Segment {
    /// Create a field segment.
    #[inline]
    pub fn field(name: impl Into<String>) -> Self {
        Segment::Field(name.into())
    }

    /// Create an index segment.
    #[inline]
    pub fn index(i: usize) -> Self {
        Segment::Index(i)
    }

    /// Returns true if this is the wildcard segment.
    #[inline]
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Segment::Wildcard)
    }

    /// Interpret the content of a `[...]` group.
    fn bracketed(inner: &str) -> Option<Self> {
        if inner.is_empty() {
            return None;
        }
        if inner == WILDCARD {
            return Some(Segment::Wildcard);
        }
        Some(match inner.parse::<usize>() {
            Ok(i) => Segment::Index(i),
            Err(_) => Segment::Field(inner.to_owned()),
        })
    }

    /// Interpret a dot-separated field name.
    fn dotted(name: &str) -> Self {
        if name == WILDCARD {
            Segment::Wildcard
        } else {
            Segment::Field(name.to_owned())
        }
    }
}

impl From<String> for Segment {
    fn from(s: String) -> Self {
        Segment::Field(s)
    }
}

impl From<&str> for Segment {
    fn from(s: &str) -> Self {
        Segment::Field(s.to_owned())
    }
}

impl From<usize> for Segment {
    fn from(i: usize) -> Self {
        Segment::Index(i)
    }
}

/// A parsed field path.
///
/// # Examples
///
/// ```
/// use patchform_paved::{Path, Segment};
///
/// let path = Path::parse("spec.containers[0].image").unwrap();
/// assert_eq!(path.len(), 4);
/// assert_eq!(path[2], Segment::Index(0));
/// assert_eq!(path.to_string(), "spec.containers[0].image");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Path(Vec<Segment>);

impl Path {
    /// Create an empty path (the document root).
    #[inline]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Create a path from a vector of segments.
    #[inline]
    pub fn from_segments(segments: Vec<Segment>) -> Self {
        Self(segments)
    }

    /// Parse a field path string. The empty string is the root.
    pub fn parse(input: &str) -> PavedResult<Self> {
        let mut segments = Vec::new();
        let mut rest = input;
        let mut after_dot = false;

        while !rest.is_empty() {
            if let Some(open) = rest.strip_prefix('[') {
                if after_dot {
                    return Err(PavedError::invalid_path(input, "'[' may not follow '.'"));
                }
                if let Some(quoted) = open.strip_prefix('"') {
                    let close = quoted
                        .find("\"]")
                        .ok_or_else(|| PavedError::invalid_path(input, "unterminated '[\"'"))?;
                    segments.push(Segment::Field(quoted[..close].to_owned()));
                    rest = &quoted[close + 2..];
                } else {
                    let close = open
                        .find(']')
                        .ok_or_else(|| PavedError::invalid_path(input, "unterminated '['"))?;
                    let segment = Segment::bracketed(&open[..close])
                        .ok_or_else(|| PavedError::invalid_path(input, "empty brackets"))?;
                    segments.push(segment);
                    rest = &open[close + 1..];
                }
            } else {
                let end = rest
                    .find(|c: char| matches!(c, '.' | '[' | ']'))
                    .unwrap_or(rest.len());
                if end == 0 {
                    return Err(PavedError::invalid_path(input, "empty field name"));
                }
                segments.push(Segment::dotted(&rest[..end]));
                rest = &rest[end..];
            }

            after_dot = false;
            if let Some(next) = rest.strip_prefix('.') {
                if next.is_empty() {
                    return Err(PavedError::invalid_path(input, "trailing '.'"));
                }
                rest = next;
                after_dot = true;
            } else if !rest.is_empty() && !rest.starts_with('[') {
                return Err(PavedError::invalid_path(input, "expected '.' or '['"));
            }
        }

        Ok(Self(segments))
    }

    /// Append a field segment and return self (builder pattern).
    #[inline]
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.0.push(Segment::Field(name.into()));
        self
    }

    /// Append an index segment and return self (builder pattern).
    #[inline]
    pub fn index(mut self, i: usize) -> Self {
        self.0.push(Segment::Index(i));
        self
    }

    /// Append a wildcard segment and return self (builder pattern).
    #[inline]
    pub fn wildcard(mut self) -> Self {
        self.0.push(Segment::Wildcard);
        self
    }

    /// Push a segment onto the path.
    #[inline]
    pub fn push(&mut self, seg: Segment) {
        self.0.push(seg);
    }

    /// Get the segments of this path.
    #[inline]
    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    /// Check if this path is empty (root).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the number of segments in this path.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if any segment is a wildcard.
    #[inline]
    pub fn has_wildcards(&self) -> bool {
        self.0.iter().any(Segment::is_wildcard)
    }

    /// The first `len` segments of this path.
    #[inline]
    pub fn truncated(&self, len: usize) -> Path {
        Path(self.0[..len.min(self.0.len())].to_vec())
    }

    /// Iterate over the segments.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Segment> {
        self.0.iter()
    }
}

/// Field names that can be written after a dot without brackets.
fn is_plain_field(name: &str) -> bool {
    !name.is_empty() && name != WILDCARD && !name.contains(|c: char| matches!(c, '.' | '[' | ']'))
}

/// Field names that only survive a round trip as `["name"]`.
fn needs_quotes(name: &str) -> bool {
    name.is_empty() || name == WILDCARD || name.starts_with('"') || name.contains(']')
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.0.iter().enumerate() {
            match seg {
                Segment::Field(name) if is_plain_field(name) => {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(name)?;
                }
                Segment::Field(name) if needs_quotes(name) => write!(f, "[\"{name}\"]")?,
                Segment::Field(name) => write!(f, "[{name}]")?,
                Segment::Index(idx) => write!(f, "[{idx}]")?,
                Segment::Wildcard => f.write_str("[*]")?,
            }
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = PavedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Path::parse(s)
    }
}

impl TryFrom<String> for Path {
    type Error = PavedError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Path::parse(&s)
    }
}

impl From<Path> for String {
    fn from(path: Path) -> Self {
        path.to_string()
    }
}

impl FromIterator<Segment> for Path {
    fn from_iter<I: IntoIterator<Item = Segment>>(iter: I) -> Self {
        Path(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl std::ops::Index<usize> for Path {
    type Output = Segment;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

/// Construct a `Path` from a sequence of segments.
///
/// String literals become field segments and integers become index segments.
///
/// ```
/// use patchform_paved::path;
///
/// let p = path!("spec", "containers", 0, "image");
/// assert_eq!(p.to_string(), "spec.containers[0].image");
/// ```
#[macro_export]
macro_rules! path {
    () => {
        $crate::Path::root()
    };
    ($($seg:expr),+ $(,)?) => {{
        let mut p = $crate::Path::root();
        $(
            p.push($crate::Segment::from($seg));
        )+
        p
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dotted() {
        let path = Path::parse("metadata.labels.app").unwrap();
        assert_eq!(path, path!("metadata", "labels", "app"));
    }

    #[test]
    fn test_parse_index_and_wildcard() {
        let path = Path::parse("spec.items[2].ports[*].port").unwrap();
        assert_eq!(
            path.segments(),
            &[
                Segment::field("spec"),
                Segment::field("items"),
                Segment::Index(2),
                Segment::field("ports"),
                Segment::Wildcard,
                Segment::field("port"),
            ]
        );
        assert!(path.has_wildcards());
    }

    #[test]
    fn test_parse_bracketed_key_with_dots() {
        let path = Path::parse("metadata.annotations[crossplane.io/external-name]").unwrap();
        assert_eq!(path[2], Segment::field("crossplane.io/external-name"));
        assert_eq!(
            path.to_string(),
            "metadata.annotations[crossplane.io/external-name]"
        );
    }

    #[test]
    fn test_parse_dotted_wildcard() {
        let path = Path::parse("spec.*.name").unwrap();
        assert_eq!(path[1], Segment::Wildcard);
    }

    #[test]
    fn test_parse_empty_is_root() {
        assert!(Path::parse("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["a..b", ".a", "a.", "a[0", "a[]", "a[0]b", "a.[0]", "a]b"] {
            let err = Path::parse(bad).unwrap_err();
            assert!(
                matches!(err, PavedError::InvalidPath { .. }),
                "{bad} should be invalid, got {err:?}"
            );
        }
    }

    #[test]
    fn test_display_roundtrip() {
        for text in [
            "a",
            "a.b[0].c",
            "a[*].b",
            "[0].a",
            "a[b.c].d",
            "metadata.ownerReferences[*].name",
        ] {
            let path = Path::parse(text).unwrap();
            assert_eq!(path.to_string(), text);
        }
    }

    #[test]
    fn test_quoted_keys_roundtrip() {
        let path = path!("labels", "*", "a]b", "");
        assert_eq!(path.to_string(), r#"labels["*"]["a]b"][""]"#);
        assert_eq!(Path::parse(&path.to_string()).unwrap(), path);
        assert!(!path.has_wildcards());

        assert_eq!(Path::parse(r#"a["0"]"#).unwrap(), path!("a", "0"));
        assert!(Path::parse(r#"a["b]"#).is_err());
    }

    #[test]
    fn test_truncated() {
        let path = path!("a", "b", 3);
        assert_eq!(path.truncated(2), path!("a", "b"));
        assert_eq!(path.truncated(10), path);
    }

    #[test]
    fn test_path_serde_as_string() {
        let path = Path::parse("spec.items[0]").unwrap();
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, "\"spec.items[0]\"");
        let parsed: Path = serde_json::from_str(&json).unwrap();
        assert_eq!(path, parsed);
    }
}
