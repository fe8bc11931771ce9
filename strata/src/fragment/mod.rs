//! Configuration fragments: single-key contributions from named sources.
//!
//! Composition is accumulate-only. Sources submit fragments into a
//! [`FragmentStore`]; nothing ever edits or removes a submitted fragment.
//! The merge engine later combines all fragments per key according to the
//! schema's merge strategies.

mod environment;
mod guard;
mod loader;
mod store;

pub use environment::{environment_fragments, ENV_PREFIX, ENV_PRIORITY};
pub use guard::Guard;
pub use loader::{load_fragment_dir, load_fragment_file, user_fragment_dir};
pub use store::FragmentStore;

use serde::Serialize;

use crate::schema::KeyPath;
use crate::value::Value;

/// The priority assigned to fragments that do not choose one.
pub const DEFAULT_PRIORITY: i64 = 0;

/// One value contribution to one option path.
///
/// A fragment records which source submitted it, a priority for
/// override-style merging, a store-assigned submission order, and an
/// optional guard that must hold before the fragment participates
/// in merging at all.
///
/// # Examples
///
/// ```
/// use strata::{Fragment, Value};
///
/// let fragment = Fragment::new(
///     "site.yaml",
///     "build.name".parse().unwrap(),
///     Value::from("samba"),
/// )
/// .with_priority(10);
///
/// assert_eq!(fragment.source(), "site.yaml");
/// assert_eq!(fragment.priority(), 10);
/// assert!(!fragment.is_conditional());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fragment {
    source: String,
    priority: i64,
    order: u64,
    path: KeyPath,
    value: Value,
    guard: Option<Guard>,
}

impl Fragment {
    /// Create an unconditional fragment with the default priority.
    ///
    /// The submission order stays zero until the fragment enters a
    /// [`FragmentStore`].
    #[must_use]
    pub fn new(source: &str, path: KeyPath, value: Value) -> Self {
        Self {
            source: source.to_string(),
            priority: DEFAULT_PRIORITY,
            order: 0,
            path,
            value,
            guard: None,
        }
    }

    /// Set the priority used by override-style merging.
    #[must_use]
    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    /// Attach a guard; the fragment only participates when it holds.
    #[must_use]
    pub fn with_guard(mut self, guard: Guard) -> Self {
        self.guard = Some(guard);
        self
    }

    pub(crate) fn with_order(mut self, order: u64) -> Self {
        self.order = order;
        self
    }

    /// The identity of the submitting source.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The fragment's priority.
    #[must_use]
    pub fn priority(&self) -> i64 {
        self.priority
    }

    /// The store-assigned submission order.
    #[must_use]
    pub fn order(&self) -> u64 {
        self.order
    }

    /// The option path the fragment contributes to.
    #[must_use]
    pub fn path(&self) -> &KeyPath {
        &self.path
    }

    /// The contributed value.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// The guard, if the fragment is conditional.
    #[must_use]
    pub fn guard(&self) -> Option<&Guard> {
        self.guard.as_ref()
    }

    /// Check whether the fragment carries a guard.
    #[must_use]
    pub fn is_conditional(&self) -> bool {
        self.guard.is_some()
    }

    /// A short description for warnings and error messages.
    #[must_use]
    pub fn describe(&self) -> String {
        match &self.guard {
            Some(guard) => format!(
                "'{}' from '{}' guarded on {}",
                self.path, self.source, guard
            ),
            None => format!("'{}' from '{}'", self.path, self.source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(s: &str) -> KeyPath {
        s.parse().unwrap()
    }

    #[test]
    fn test_new_defaults() {
        let fragment = Fragment::new("defaults", path("build.name"), Value::from("samba"));
        assert_eq!(fragment.priority(), DEFAULT_PRIORITY);
        assert_eq!(fragment.order(), 0);
        assert!(fragment.guard().is_none());
        assert!(!fragment.is_conditional());
    }

    #[test]
    fn test_builders() {
        let fragment = Fragment::new("site.yaml", path("tls.enable"), Value::Bool(true))
            .with_priority(50)
            .with_guard(Guard::Truthy(path("hardened")));
        assert_eq!(fragment.priority(), 50);
        assert!(fragment.is_conditional());
        assert_eq!(
            fragment.guard(),
            Some(&Guard::Truthy(path("hardened")))
        );
    }

    #[test]
    fn test_describe() {
        let plain = Fragment::new("site.yaml", path("build.name"), Value::from("samba"));
        assert_eq!(plain.describe(), "'build.name' from 'site.yaml'");

        let guarded = plain.clone().with_guard(Guard::Truthy(path("hardened")));
        assert_eq!(
            guarded.describe(),
            "'build.name' from 'site.yaml' guarded on hardened"
        );
    }
}
