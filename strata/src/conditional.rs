//! Fixed-point resolution of conditional fragments.
//!
//! Guarded fragments only participate in merging once their guard is
//! decidable. The evaluator runs rounds: merge the active fragments,
//! then admit or discard every pending fragment whose guard reads only
//! settled paths. A path is settled once no pending fragment targets it;
//! from that point its merged value can never change, so admission and
//! discard decisions are final.

use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::fragment::{Fragment, FragmentStore};
use crate::merge::{MergeEngine, ResolvedTree};
use crate::schema::{KeyPath, OptionSchema};

/// The result of conditional resolution: the final tree plus an account
/// of what happened to every guarded fragment.
#[derive(Debug, Clone)]
pub struct EvaluationOutcome {
    /// The resolved tree after the final merge.
    pub tree: ResolvedTree,
    /// Warnings from the final merge, such as override ties.
    pub warnings: Vec<String>,
    /// Guarded fragments whose guard held.
    pub admitted: Vec<Fragment>,
    /// Guarded fragments whose guard was decided false.
    pub discarded: Vec<Fragment>,
    /// The number of admit/discard rounds performed.
    pub rounds: usize,
}

/// Resolves guarded fragments to a fixed point, then merges.
///
/// # Examples
///
/// ```
/// use strata::{
///     ConditionalEvaluator, Fragment, FragmentStore, Guard, MergeStrategy, OptionDecl,
///     OptionSchema, OptionType, Value,
/// };
///
/// let mut schema = OptionSchema::new();
/// schema
///     .declare(OptionDecl::new(
///         "hardened".parse().unwrap(),
///         OptionType::Bool,
///         MergeStrategy::BoolOr,
///         "",
///     ))
///     .unwrap();
/// schema
///     .declare(OptionDecl::new(
///         "audit".parse().unwrap(),
///         OptionType::Bool,
///         MergeStrategy::BoolOr,
///         "",
///     ))
///     .unwrap();
///
/// let mut store = FragmentStore::new();
/// store.submit(Fragment::new(
///     "site",
///     "hardened".parse().unwrap(),
///     Value::Bool(true),
/// ));
/// store.submit(
///     Fragment::new("policy", "audit".parse().unwrap(), Value::Bool(true))
///         .with_guard(Guard::Truthy("hardened".parse().unwrap())),
/// );
///
/// let outcome = ConditionalEvaluator::resolve(&store, &schema).unwrap();
/// assert_eq!(
///     outcome.tree.get(&"audit".parse().unwrap()),
///     Some(&Value::Bool(true))
/// );
/// ```
pub struct ConditionalEvaluator;

impl ConditionalEvaluator {
    /// Resolve all guards and merge the surviving fragments.
    ///
    /// Unconditional fragments are active from the start. Each round
    /// merges the active set, then decides every pending fragment whose
    /// guard references only settled paths. A guard reading a settled
    /// path that carries no value sees null, like any other absent path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownKey`] if a guard references an undeclared
    /// path, [`Error::UnresolvedCondition`] if a round makes no progress
    /// while fragments are still pending (mutually dependent guards), or
    /// any merge error.
    pub fn resolve(store: &FragmentStore, schema: &OptionSchema) -> Result<EvaluationOutcome> {
        for fragment in store.fragments() {
            if let Some(guard) = fragment.guard() {
                for referenced in guard.referenced_paths() {
                    if !schema.contains(referenced) {
                        return Err(Error::UnknownKey {
                            path: referenced.clone(),
                            source_id: fragment.source().to_string(),
                        });
                    }
                }
            }
        }

        let mut active: Vec<Fragment> = Vec::new();
        let mut pending: Vec<Fragment> = Vec::new();
        for fragment in store.fragments() {
            if fragment.is_conditional() {
                pending.push(fragment.clone());
            } else {
                active.push(fragment.clone());
            }
        }

        let mut admitted = Vec::new();
        let mut discarded = Vec::new();
        let mut rounds = 0;

        while !pending.is_empty() {
            rounds += 1;
            let tree = MergeEngine::merge(&active, schema)?.tree;
            let pending_targets: BTreeSet<KeyPath> =
                pending.iter().map(|f| f.path().clone()).collect();

            let mut still_pending = Vec::new();
            let mut progressed = false;
            for fragment in pending {
                if Self::is_decidable(&fragment, &pending_targets) {
                    progressed = true;
                    if Self::guard_holds(&fragment, &tree) {
                        log::debug!("round {rounds}: admitted {}", fragment.describe());
                        admitted.push(fragment.clone());
                        active.push(fragment);
                    } else {
                        log::debug!("round {rounds}: discarded {}", fragment.describe());
                        discarded.push(fragment);
                    }
                } else {
                    still_pending.push(fragment);
                }
            }

            if !progressed {
                let descriptions = still_pending.iter().map(Fragment::describe).collect();
                return Err(Error::UnresolvedCondition {
                    pending: descriptions,
                });
            }
            pending = still_pending;
        }

        let outcome = MergeEngine::merge(&active, schema)?;
        Ok(EvaluationOutcome {
            tree: outcome.tree,
            warnings: outcome.warnings,
            admitted,
            discarded,
            rounds,
        })
    }

    fn is_decidable(fragment: &Fragment, pending_targets: &BTreeSet<KeyPath>) -> bool {
        fragment.guard().map_or(true, |guard| {
            guard
                .referenced_paths()
                .iter()
                .all(|path| !pending_targets.contains(path))
        })
    }

    fn guard_holds(fragment: &Fragment, tree: &ResolvedTree) -> bool {
        fragment.guard().map_or(true, |guard| guard.evaluate(tree))
    }
}
