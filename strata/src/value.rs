//! The dynamic value type carried by configuration fragments.
//!
//! Every fragment contributes exactly one [`Value`] to one key path. The
//! merge engine combines values per key according to the declared merge
//! strategy, and the validator checks the combined values against the
//! declared option types afterwards.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A configuration value contributed by a fragment or produced by a merge.
///
/// Values are deliberately untyped at submission time: fragments may place
/// any value at any declared path, and shape problems surface as validation
/// violations rather than merge failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// A boolean, typically a feature toggle.
    Bool(bool),
    /// A text value.
    Str(String),
    /// An ordered list of text values.
    List(Vec<String>),
    /// The explicit absence of a value.
    Null,
}

impl Value {
    /// A short name for the value's shape, used in diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "boolean",
            Self::Str(_) => "string",
            Self::List(_) => "list",
            Self::Null => "null",
        }
    }

    /// Truthiness as seen by condition guards.
    ///
    /// Booleans are themselves, strings and lists are truthy when non-empty,
    /// and null is always falsy.
    ///
    /// # Examples
    ///
    /// ```
    /// use strata::Value;
    ///
    /// assert!(Value::Bool(true).is_truthy());
    /// assert!(Value::Str("smbd".to_string()).is_truthy());
    /// assert!(!Value::Str(String::new()).is_truthy());
    /// assert!(!Value::Null.is_truthy());
    /// ```
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Str(s) => !s.is_empty(),
            Self::List(items) => !items.is_empty(),
            Self::Null => false,
        }
    }

    /// Returns the boolean if this is a boolean value.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the string if this is a text value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the items if this is a list value.
    #[must_use]
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Check whether this is the explicit null value.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Str(s) => write!(f, "{s}"),
            Self::List(items) => write!(f, "{}", items.join(" ")),
            Self::Null => Ok(()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

impl From<Vec<&str>> for Value {
    fn from(items: Vec<&str>) -> Self {
        Self::List(items.into_iter().map(str::to_string).collect())
    }
}
