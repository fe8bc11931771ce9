//! Dotted key paths addressing options in the schema and the resolved tree.

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Error returned when a key path string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidKeyPathError {
    /// The offending path text.
    pub path: String,
    /// Why the text was rejected.
    pub reason: String,
}

impl fmt::Display for InvalidKeyPathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid key path '{}': {}", self.path, self.reason)
    }
}

impl std::error::Error for InvalidKeyPathError {}

/// A dotted path naming a single option, such as `services.files.enable`.
///
/// Paths are ordered lexicographically by segment, which keeps every
/// tree and report iteration deterministic.
///
/// # Examples
///
/// ```
/// use strata::KeyPath;
///
/// let path: KeyPath = "services.files.enable".parse().unwrap();
/// assert_eq!(path.segments().len(), 3);
/// assert_eq!(path.to_string(), "services.files.enable");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyPath {
    segments: Vec<String>,
}

impl KeyPath {
    /// Parse a dotted path string.
    ///
    /// Segments must be non-empty and contain only ASCII alphanumerics,
    /// `_`, or `-`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidKeyPathError`] if the string is empty, contains an
    /// empty segment, or a segment contains a forbidden character.
    pub fn parse(text: &str) -> Result<Self, InvalidKeyPathError> {
        if text.is_empty() {
            return Err(InvalidKeyPathError {
                path: text.to_string(),
                reason: "path is empty".to_string(),
            });
        }
        let mut segments = Vec::new();
        for segment in text.split('.') {
            if segment.is_empty() {
                return Err(InvalidKeyPathError {
                    path: text.to_string(),
                    reason: "empty segment".to_string(),
                });
            }
            if let Some(bad) = segment
                .chars()
                .find(|c| !c.is_ascii_alphanumeric() && *c != '_' && *c != '-')
            {
                return Err(InvalidKeyPathError {
                    path: text.to_string(),
                    reason: format!("segment '{segment}' contains '{bad}'"),
                });
            }
            segments.push(segment.to_string());
        }
        Ok(Self { segments })
    }

    /// The individual segments of the path.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The final segment of the path.
    #[must_use]
    pub fn last(&self) -> &str {
        // parse() guarantees at least one segment
        self.segments.last().map_or("", String::as_str)
    }

    /// The path with its final segment removed, or `None` at the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.segments.len() < 2 {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// Extend the path with one more segment.
    ///
    /// # Examples
    ///
    /// ```
    /// use strata::KeyPath;
    ///
    /// let base: KeyPath = "services.files".parse().unwrap();
    /// assert_eq!(base.child("enable").to_string(), "services.files.enable");
    /// ```
    #[must_use]
    pub fn child(&self, segment: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.to_string());
        Self { segments }
    }

    /// Check whether `prefix` is a leading run of this path's segments.
    #[must_use]
    pub fn starts_with(&self, prefix: &Self) -> bool {
        self.segments.len() >= prefix.segments.len()
            && self.segments[..prefix.segments.len()] == prefix.segments[..]
    }

    /// The segments remaining after `prefix`, if `prefix` leads this path.
    #[must_use]
    pub fn strip_prefix(&self, prefix: &Self) -> Option<&[String]> {
        if self.starts_with(prefix) {
            Some(&self.segments[prefix.segments.len()..])
        } else {
            None
        }
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

impl FromStr for KeyPath {
    type Err = InvalidKeyPathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for KeyPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for KeyPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(DeError::custom)
    }
}


#[cfg(test)]
#[cfg(feature = "property-tests")]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn segment_strategy() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9_-]{0,8}".prop_map(|s| s)
    }

    fn path_strategy() -> impl Strategy<Value = String> {
        proptest::collection::vec(segment_strategy(), 1..5).prop_map(|segs| segs.join("."))
    }

    proptest! {
        // PROPERTY: parse followed by Display returns the original text
        #[test]
        fn prop_parse_display_roundtrip(text in path_strategy()) {
            let path = KeyPath::parse(&text).unwrap();
            prop_assert_eq!(path.to_string(), text);
        }

        // PROPERTY: a child path always starts with its parent
        #[test]
        fn prop_child_starts_with_parent(text in path_strategy(), seg in segment_strategy()) {
            let base = KeyPath::parse(&text).unwrap();
            let child = base.child(&seg);
            prop_assert!(child.starts_with(&base));
            prop_assert_eq!(child.parent().unwrap(), base);
        }
    }
}
