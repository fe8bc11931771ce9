//! Validation of resolved trees against the schema.
//!
//! Validation runs after merging and conditional resolution, and is the
//! only place shape problems surface. The validator always walks the
//! whole schema and every assertion, so one pass reports every problem
//! at once.

use serde::Serialize;
use std::fmt;

use crate::merge::ResolvedTree;
use crate::schema::{KeyPath, OptionSchema};

/// One problem found in a resolved tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Violation {
    /// A resolved value does not match its declared type.
    Type {
        /// The option path carrying the mismatched value.
        path: KeyPath,
        /// The declared type.
        expected: String,
        /// The shape of the resolved value.
        actual: String,
    },
    /// A mandatory option ended up with no value at all.
    MissingValue {
        /// The mandatory option path.
        path: KeyPath,
    },
    /// A schema assertion evaluated to false.
    Assertion {
        /// The assertion's message.
        message: String,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type {
                path,
                expected,
                actual,
            } => write!(
                f,
                "type violation at '{path}': expected {expected}, found {actual}"
            ),
            Self::MissingValue { path } => {
                write!(f, "missing value for mandatory option '{path}'")
            }
            Self::Assertion { message } => write!(f, "assertion failed: {message}"),
        }
    }
}

/// Checks a resolved tree against declared types, mandatory options,
/// and assertions.
///
/// # Examples
///
/// ```
/// use strata::{
///     MergeStrategy, OptionDecl, OptionSchema, OptionType, ResolvedTree, Validator, Value,
/// };
///
/// let mut schema = OptionSchema::new();
/// schema
///     .declare(
///         OptionDecl::new(
///             "build.name".parse().unwrap(),
///             OptionType::Str,
///             MergeStrategy::Override,
///             "",
///         )
///         .with_mandatory(),
///     )
///     .unwrap();
///
/// let tree = ResolvedTree::new();
/// let violations = Validator::validate(&tree, &schema);
/// assert_eq!(violations.len(), 1);
/// ```
pub struct Validator;

impl Validator {
    /// Collect every violation in the tree. Never stops early.
    #[must_use]
    pub fn validate(tree: &ResolvedTree, schema: &OptionSchema) -> Vec<Violation> {
        let mut violations = Vec::new();

        for decl in schema.options() {
            match tree.get(&decl.path) {
                Some(value) => {
                    if !decl.ty.matches(value) {
                        violations.push(Violation::Type {
                            path: decl.path.clone(),
                            expected: decl.ty.to_string(),
                            actual: value.type_name().to_string(),
                        });
                    }
                }
                None => {
                    if decl.mandatory {
                        violations.push(Violation::MissingValue {
                            path: decl.path.clone(),
                        });
                    }
                }
            }
        }

        for assertion in schema.assertions() {
            if !assertion.condition.evaluate(tree) {
                violations.push(Violation::Assertion {
                    message: assertion.message.clone(),
                });
            }
        }

        violations
    }
}
