//! The accumulate-only store fragments are submitted into.

use crate::fragment::Fragment;

/// An append-only collection of fragments, in submission order.
///
/// The store assigns each fragment a monotonically increasing order
/// number on submission; every downstream ordering rule that speaks of
/// "submission order" means this number. There is no way to remove or
/// edit a fragment once submitted.
///
/// # Examples
///
/// ```
/// use strata::{Fragment, FragmentStore, Value};
///
/// let mut store = FragmentStore::new();
/// store.submit(Fragment::new(
///     "defaults",
///     "build.name".parse().unwrap(),
///     Value::from("samba"),
/// ));
/// assert_eq!(store.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FragmentStore {
    fragments: Vec<Fragment>,
    next_order: u64,
}

impl FragmentStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Submit one fragment, assigning it the next submission order.
    pub fn submit(&mut self, fragment: Fragment) {
        let order = self.next_order;
        self.next_order += 1;
        self.fragments.push(fragment.with_order(order));
    }

    /// Submit several fragments, preserving their relative order.
    pub fn submit_all<I: IntoIterator<Item = Fragment>>(&mut self, fragments: I) {
        for fragment in fragments {
            self.submit(fragment);
        }
    }

    /// All submitted fragments, in submission order.
    #[must_use]
    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// The number of submitted fragments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Check whether nothing has been submitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}
