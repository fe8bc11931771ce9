//! Combining fragments into a resolved tree.
//!
//! The merge engine groups fragments by path and combines each group
//! according to the merge strategy declared for that path. It performs
//! no type checking beyond what a strategy structurally needs; shape
//! problems are the validator's concern.

mod tree;

pub use tree::ResolvedTree;

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::fragment::Fragment;
use crate::schema::{KeyPath, MergeStrategy, OptionDecl, OptionSchema};
use crate::value::Value;

/// The result of a merge: the tree plus non-fatal warnings.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    /// The resolved tree.
    pub tree: ResolvedTree,
    /// Human-readable warnings, such as override priority ties.
    pub warnings: Vec<String>,
}

/// Combines fragments into a [`ResolvedTree`] under a schema.
///
/// # Examples
///
/// ```
/// use strata::{
///     Fragment, MergeEngine, MergeStrategy, OptionDecl, OptionSchema, OptionType, Value,
/// };
///
/// let mut schema = OptionSchema::new();
/// schema
///     .declare(OptionDecl::new(
///         "build.name".parse().unwrap(),
///         OptionType::Str,
///         MergeStrategy::Override,
///         "Name of the package to build",
///     ))
///     .unwrap();
///
/// let fragments = vec![Fragment::new(
///     "defaults",
///     "build.name".parse().unwrap(),
///     Value::from("samba"),
/// )];
/// let outcome = MergeEngine::merge(&fragments, &schema).unwrap();
/// assert_eq!(
///     outcome.tree.get(&"build.name".parse().unwrap()),
///     Some(&Value::from("samba"))
/// );
/// ```
pub struct MergeEngine;

impl MergeEngine {
    /// Merge fragments into a resolved tree.
    ///
    /// Every fragment path must be declared in the schema. Keys no
    /// fragment targets receive their declared default, if any; keys
    /// with neither fragments nor a default stay absent from the tree.
    ///
    /// Guards are not consulted here. Callers feed in the fragments that
    /// should participate; the conditional evaluator decides admission.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownKey`] for a fragment targeting an
    /// undeclared path, or [`Error::Merge`] when a group of values cannot
    /// be combined under the declared strategy.
    pub fn merge(fragments: &[Fragment], schema: &OptionSchema) -> Result<MergeOutcome> {
        let mut by_path: BTreeMap<&KeyPath, (&OptionDecl, Vec<&Fragment>)> = BTreeMap::new();
        for fragment in fragments {
            match schema.get(fragment.path()) {
                Some(decl) => {
                    by_path
                        .entry(fragment.path())
                        .or_insert_with(|| (decl, Vec::new()))
                        .1
                        .push(fragment);
                }
                None => {
                    return Err(Error::UnknownKey {
                        path: fragment.path().clone(),
                        source_id: fragment.source().to_string(),
                    });
                }
            }
        }

        let mut tree = ResolvedTree::new();
        let mut warnings = Vec::new();
        for (path, (decl, group)) in by_path {
            let value = match decl.strategy {
                MergeStrategy::Override => Self::merge_override(path, &group, &mut warnings),
                MergeStrategy::ListAppend => Self::merge_list_append(path, &group)?,
                MergeStrategy::BoolAnd | MergeStrategy::BoolOr => {
                    Self::merge_bool(path, &group, decl.strategy)?
                }
                MergeStrategy::Concat => Self::merge_concat(path, &group)?,
            };
            tree.insert(path.clone(), value);
        }

        for decl in schema.options() {
            if !tree.contains(&decl.path) {
                if let Some(default) = &decl.default {
                    tree.insert(decl.path.clone(), default.clone());
                }
            }
        }

        Ok(MergeOutcome { tree, warnings })
    }

    fn merge_override(path: &KeyPath, group: &[&Fragment], warnings: &mut Vec<String>) -> Value {
        let mut winner: Option<&Fragment> = None;
        for fragment in group {
            let better = winner.map_or(true, |w| {
                (fragment.priority(), fragment.order()) > (w.priority(), w.order())
            });
            if better {
                winner = Some(fragment);
            }
        }
        let Some(winner) = winner else {
            return Value::Null;
        };

        let tied: Vec<String> = group
            .iter()
            .filter(|f| f.priority() == winner.priority() && f.order() != winner.order())
            .map(|f| format!("'{}'", f.source()))
            .collect();
        if !tied.is_empty() {
            warnings.push(format!(
                "override tie on '{path}' at priority {}: later submission from '{}' wins over {}",
                winner.priority(),
                winner.source(),
                tied.join(", ")
            ));
        }
        winner.value().clone()
    }

    fn merge_list_append(path: &KeyPath, group: &[&Fragment]) -> Result<Value> {
        let mut sorted = group.to_vec();
        sorted.sort_by_key(|f| f.order());

        let mut items = Vec::new();
        for fragment in sorted {
            match fragment.value().as_list() {
                Some(list) => items.extend(list.iter().cloned()),
                None => {
                    return Err(Error::Merge {
                        path: path.clone(),
                        strategy: MergeStrategy::ListAppend,
                        detail: format!(
                            "value from '{}' is {}, expected list",
                            fragment.source(),
                            fragment.value().type_name()
                        ),
                    });
                }
            }
        }
        Ok(Value::List(items))
    }

    fn merge_bool(path: &KeyPath, group: &[&Fragment], strategy: MergeStrategy) -> Result<Value> {
        let and = matches!(strategy, MergeStrategy::BoolAnd);
        let mut result = and;
        for fragment in group {
            let Some(b) = fragment.value().as_bool() else {
                return Err(Error::Merge {
                    path: path.clone(),
                    strategy,
                    detail: format!(
                        "value from '{}' is {}, expected boolean",
                        fragment.source(),
                        fragment.value().type_name()
                    ),
                });
            };
            result = if and { result && b } else { result || b };
        }
        Ok(Value::Bool(result))
    }

    fn merge_concat(path: &KeyPath, group: &[&Fragment]) -> Result<Value> {
        let mut sorted = group.to_vec();
        sorted.sort_by_key(|f| f.order());

        let mut pieces = Vec::new();
        for fragment in sorted {
            match fragment.value().as_str() {
                Some(s) => pieces.push(s.to_string()),
                None => {
                    return Err(Error::Merge {
                        path: path.clone(),
                        strategy: MergeStrategy::Concat,
                        detail: format!(
                            "value from '{}' is {}, expected string",
                            fragment.source(),
                            fragment.value().type_name()
                        ),
                    });
                }
            }
        }
        Ok(Value::Str(pieces.join("\n")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::FragmentStore;
    use crate::schema::OptionType;

    fn path(s: &str) -> KeyPath {
        s.parse().unwrap()
    }

    fn schema_with(p: &str, ty: OptionType, strategy: MergeStrategy) -> OptionSchema {
        let mut schema = OptionSchema::new();
        schema
            .declare(OptionDecl::new(path(p), ty, strategy, ""))
            .unwrap();
        schema
    }

    fn submit_all(fragments: Vec<Fragment>) -> FragmentStore {
        let mut store = FragmentStore::new();
        store.submit_all(fragments);
        store
    }

    #[test]
    fn test_override_highest_priority_wins() {
        let schema = schema_with("greeting", OptionType::Str, MergeStrategy::Override);
        let store = submit_all(vec![
            Fragment::new("low", path("greeting"), Value::from("a")).with_priority(10),
            Fragment::new("high", path("greeting"), Value::from("b")).with_priority(20),
        ]);

        let outcome = MergeEngine::merge(store.fragments(), &schema).unwrap();
        assert_eq!(outcome.tree.get(&path("greeting")), Some(&Value::from("b")));
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_override_priority_beats_submission_order() {
        let schema = schema_with("greeting", OptionType::Str, MergeStrategy::Override);
        let store = submit_all(vec![
            Fragment::new("high", path("greeting"), Value::from("b")).with_priority(20),
            Fragment::new("low", path("greeting"), Value::from("a")).with_priority(10),
        ]);

        let outcome = MergeEngine::merge(store.fragments(), &schema).unwrap();
        assert_eq!(outcome.tree.get(&path("greeting")), Some(&Value::from("b")));
    }

    #[test]
    fn test_override_tie_last_submission_wins_with_warning() {
        let schema = schema_with("greeting", OptionType::Str, MergeStrategy::Override);
        let store = submit_all(vec![
            Fragment::new("first", path("greeting"), Value::from("a")).with_priority(10),
            Fragment::new("second", path("greeting"), Value::from("b")).with_priority(10),
        ]);

        let outcome = MergeEngine::merge(store.fragments(), &schema).unwrap();
        assert_eq!(outcome.tree.get(&path("greeting")), Some(&Value::from("b")));
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("'first'"));
        assert!(outcome.warnings[0].contains("'second'"));
        assert!(outcome.warnings[0].contains("greeting"));
    }

    #[test]
    fn test_list_append_in_submission_order() {
        let schema = schema_with("items", OptionType::StrList, MergeStrategy::ListAppend);
        let store = submit_all(vec![
            Fragment::new("one", path("items"), Value::from(vec!["x"])),
            Fragment::new("two", path("items"), Value::from(vec!["y"])),
        ]);

        let outcome = MergeEngine::merge(store.fragments(), &schema).unwrap();
        assert_eq!(
            outcome.tree.get(&path("items")),
            Some(&Value::from(vec!["x", "y"]))
        );
    }

    #[test]
    fn test_list_append_ignores_priority() {
        let schema = schema_with("items", OptionType::StrList, MergeStrategy::ListAppend);
        let store = submit_all(vec![
            Fragment::new("one", path("items"), Value::from(vec!["x"])).with_priority(1),
            Fragment::new("two", path("items"), Value::from(vec!["y"])).with_priority(100),
        ]);

        let outcome = MergeEngine::merge(store.fragments(), &schema).unwrap();
        assert_eq!(
            outcome.tree.get(&path("items")),
            Some(&Value::from(vec!["x", "y"]))
        );
    }

    #[test]
    fn test_list_append_rejects_non_list() {
        let schema = schema_with("items", OptionType::StrList, MergeStrategy::ListAppend);
        let store = submit_all(vec![
            Fragment::new("one", path("items"), Value::from(vec!["x"])),
            Fragment::new("two", path("items"), Value::from("y")),
        ]);

        let err = MergeEngine::merge(store.fragments(), &schema).unwrap_err();
        assert!(matches!(err, Error::Merge { .. }));
        assert!(format!("{err}").contains("'two'"));
        assert!(format!("{err}").contains("expected list"));
    }

    #[test]
    fn test_bool_and() {
        let schema = schema_with("hardened", OptionType::Bool, MergeStrategy::BoolAnd);
        let store = submit_all(vec![
            Fragment::new("one", path("hardened"), Value::Bool(true)),
            Fragment::new("two", path("hardened"), Value::Bool(false)),
        ]);

        let outcome = MergeEngine::merge(store.fragments(), &schema).unwrap();
        assert_eq!(outcome.tree.get(&path("hardened")), Some(&Value::Bool(false)));
    }

    #[test]
    fn test_bool_or() {
        let schema = schema_with("enable", OptionType::Bool, MergeStrategy::BoolOr);
        let store = submit_all(vec![
            Fragment::new("one", path("enable"), Value::Bool(false)),
            Fragment::new("two", path("enable"), Value::Bool(true)),
        ]);

        let outcome = MergeEngine::merge(store.fragments(), &schema).unwrap();
        assert_eq!(outcome.tree.get(&path("enable")), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_bool_strategy_rejects_non_bool() {
        let schema = schema_with("enable", OptionType::Bool, MergeStrategy::BoolOr);
        let store = submit_all(vec![Fragment::new(
            "one",
            path("enable"),
            Value::from("yes"),
        )]);

        let err = MergeEngine::merge(store.fragments(), &schema).unwrap_err();
        assert!(format!("{err}").contains("expected boolean"));
    }

    #[test]
    fn test_concat_joins_in_submission_order() {
        let schema = schema_with("extra", OptionType::Str, MergeStrategy::Concat);
        let store = submit_all(vec![
            Fragment::new("one", path("extra"), Value::from("line a")).with_priority(100),
            Fragment::new("two", path("extra"), Value::from("line b")).with_priority(1),
        ]);

        let outcome = MergeEngine::merge(store.fragments(), &schema).unwrap();
        assert_eq!(
            outcome.tree.get(&path("extra")),
            Some(&Value::from("line a\nline b"))
        );
    }

    #[test]
    fn test_unknown_key_is_fatal() {
        let schema = schema_with("known", OptionType::Str, MergeStrategy::Override);
        let store = submit_all(vec![Fragment::new(
            "site.yaml",
            path("unknwon"),
            Value::from("x"),
        )]);

        let err = MergeEngine::merge(store.fragments(), &schema).unwrap_err();
        assert!(matches!(err, Error::UnknownKey { .. }));
        assert!(format!("{err}").contains("unknwon"));
        assert!(format!("{err}").contains("site.yaml"));
    }

    #[test]
    fn test_defaults_fill_untargeted_keys() {
        let mut schema = OptionSchema::new();
        schema
            .declare(
                OptionDecl::new(
                    path("enable"),
                    OptionType::Bool,
                    MergeStrategy::BoolOr,
                    "",
                )
                .with_default(Value::Bool(false)),
            )
            .unwrap();
        schema
            .declare(OptionDecl::new(
                path("name"),
                OptionType::Str,
                MergeStrategy::Override,
                "",
            ))
            .unwrap();

        let outcome = MergeEngine::merge(&[], &schema).unwrap();
        assert_eq!(outcome.tree.get(&path("enable")), Some(&Value::Bool(false)));
        assert_eq!(outcome.tree.get(&path("name")), None);
    }

    #[test]
    fn test_default_not_used_when_fragment_present() {
        let mut schema = OptionSchema::new();
        schema
            .declare(
                OptionDecl::new(
                    path("enable"),
                    OptionType::Bool,
                    MergeStrategy::BoolOr,
                    "",
                )
                .with_default(Value::Bool(false)),
            )
            .unwrap();

        let store = submit_all(vec![Fragment::new(
            "site.yaml",
            path("enable"),
            Value::Bool(true),
        )]);
        let outcome = MergeEngine::merge(store.fragments(), &schema).unwrap();
        assert_eq!(outcome.tree.get(&path("enable")), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_override_does_not_type_check() {
        // Shape problems are the validator's concern; override merges
        // whatever value wins.
        let schema = schema_with("name", OptionType::Str, MergeStrategy::Override);
        let store = submit_all(vec![Fragment::new(
            "site.yaml",
            path("name"),
            Value::Bool(true),
        )]);

        let outcome = MergeEngine::merge(store.fragments(), &schema).unwrap();
        assert_eq!(outcome.tree.get(&path("name")), Some(&Value::Bool(true)));
    }
}

// ============================================================================
// Property-based tests
// ============================================================================
