//! Guard expressions deciding whether conditional fragments apply.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::merge::ResolvedTree;
use crate::schema::KeyPath;
use crate::value::Value;

/// A condition over resolved option values.
///
/// Guards gate conditional fragments and express schema assertions. They
/// only read the tree; evaluating a guard can never modify values. A path
/// absent from the tree reads as [`Value::Null`].
///
/// In YAML, guards use one key per node:
///
/// ```yaml
/// all:
///   - truthy: services.files.enable
///   - equals:
///       path: services.files.settings.security
///       value: user
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Guard {
    /// True when the value at `path` equals `value`.
    Equals {
        /// The option path to read.
        path: KeyPath,
        /// The value it must equal.
        value: Value,
    },
    /// True when the value at the path is truthy (see [`Value::is_truthy`]).
    Truthy(KeyPath),
    /// True when every sub-guard is true. Empty means true.
    All(Vec<Guard>),
    /// True when at least one sub-guard is true. Empty means false.
    Any(Vec<Guard>),
    /// True when the sub-guard is false.
    Not(Box<Guard>),
}

impl Guard {
    /// Evaluate the guard against a resolved tree.
    #[must_use]
    pub fn evaluate(&self, tree: &ResolvedTree) -> bool {
        match self {
            Self::Equals { path, value } => tree.get_or_null(path) == value,
            Self::Truthy(path) => tree.get_or_null(path).is_truthy(),
            Self::All(guards) => guards.iter().all(|g| g.evaluate(tree)),
            Self::Any(guards) => guards.iter().any(|g| g.evaluate(tree)),
            Self::Not(inner) => !inner.evaluate(tree),
        }
    }

    /// Every option path the guard reads.
    ///
    /// The conditional evaluator uses this to decide when a guard is
    /// decidable and to reject guards on undeclared paths.
    #[must_use]
    pub fn referenced_paths(&self) -> BTreeSet<&KeyPath> {
        let mut paths = BTreeSet::new();
        self.collect_paths(&mut paths);
        paths
    }

    fn collect_paths<'a>(&'a self, paths: &mut BTreeSet<&'a KeyPath>) {
        match self {
            Self::Equals { path, .. } | Self::Truthy(path) => {
                paths.insert(path);
            }
            Self::All(guards) | Self::Any(guards) => {
                for guard in guards {
                    guard.collect_paths(paths);
                }
            }
            Self::Not(inner) => inner.collect_paths(paths),
        }
    }
}

impl fmt::Display for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equals { path, value } => {
                if value.is_null() {
                    write!(f, "{path} == null")
                } else {
                    write!(f, "{path} == {value}")
                }
            }
            Self::Truthy(path) => write!(f, "{path}"),
            Self::All(guards) => {
                let parts: Vec<String> = guards.iter().map(ToString::to_string).collect();
                write!(f, "({})", parts.join(" && "))
            }
            Self::Any(guards) => {
                let parts: Vec<String> = guards.iter().map(ToString::to_string).collect();
                write!(f, "({})", parts.join(" || "))
            }
            Self::Not(inner) => write!(f, "!{inner}"),
        }
    }
}
