//! The resolved configuration tree produced by a merge.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

use crate::schema::KeyPath;
use crate::value::Value;

const NULL: Value = Value::Null;

/// The final value of every resolved option, keyed by path.
///
/// Iteration order is the lexicographic path order, so serialized trees
/// and reports are deterministic. Reads of absent paths yield
/// [`Value::Null`] via [`get_or_null`](Self::get_or_null), which is the
/// view guards and renderers take.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedTree {
    values: BTreeMap<KeyPath, Value>,
}

impl ResolvedTree {
    /// Create an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the value at a path, replacing any previous value.
    pub fn insert(&mut self, path: KeyPath, value: Value) {
        self.values.insert(path, value);
    }

    /// The value at a path, if present.
    #[must_use]
    pub fn get(&self, path: &KeyPath) -> Option<&Value> {
        self.values.get(path)
    }

    /// The value at a path, with absence reading as null.
    #[must_use]
    pub fn get_or_null(&self, path: &KeyPath) -> &Value {
        self.values.get(path).unwrap_or(&NULL)
    }

    /// Check whether a path carries a value.
    #[must_use]
    pub fn contains(&self, path: &KeyPath) -> bool {
        self.values.contains_key(path)
    }

    /// All entries in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&KeyPath, &Value)> {
        self.values.iter()
    }

    /// The number of resolved paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check whether the tree is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Serialize for ResolvedTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (path, value) in &self.values {
            map.serialize_entry(&path.to_string(), value)?;
        }
        map.end()
    }
}
