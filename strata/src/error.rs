//! Error types for the strata library.
//!
//! This module provides a comprehensive error hierarchy for all stages of
//! the evaluation pipeline, using `thiserror` for ergonomic error handling.

use thiserror::Error;

use crate::schema::{KeyPath, MergeStrategy};
use crate::validate::Violation;

/// Result type alias for operations that may fail with a strata error.
///
/// # Examples
///
/// ```
/// use strata::{Error, Result};
///
/// fn example_operation() -> Result<bool> {
///     Ok(true)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the strata library.
///
/// This enum encompasses all error conditions that can occur while merging
/// fragments, resolving conditions, validating the tree, rendering artifacts,
/// and planning or applying activation.
#[derive(Debug, Error)]
pub enum Error {
    /// A fragment or guard referenced a key path not declared in the schema.
    #[error("unknown option '{path}' (from source '{source_id}')")]
    UnknownKey {
        /// The undeclared key path.
        path: KeyPath,
        /// The source that contributed the offending fragment or guard.
        source_id: String,
    },

    /// A key's contributing values cannot be combined under its merge strategy.
    #[error("cannot merge '{path}' with strategy {strategy}: {detail}")]
    Merge {
        /// The key path whose values could not be combined.
        path: KeyPath,
        /// The merge strategy declared for the key.
        strategy: MergeStrategy,
        /// A description of the invalid combination.
        detail: String,
    },

    /// Conditional fragments remained undecidable after the fixed point.
    #[error("unresolved conditions after fixed point: {}", pending.join("; "))]
    UnresolvedCondition {
        /// Descriptions of the pending fragments and the guards blocking them.
        pending: Vec<String>,
    },

    /// The resolved tree failed validation.
    ///
    /// Carries every violation found in the pass; the validator never stops
    /// at the first problem.
    #[error("configuration invalid: {} violation(s)", violations.len())]
    InvalidConfiguration {
        /// All violations collected by the validator.
        violations: Vec<Violation>,
    },

    /// The service-unit dependency graph contains a cycle.
    #[error("dependency cycle among units: {}", units.join(", "))]
    CyclicDependency {
        /// The units participating in the cycle.
        units: Vec<String>,
    },

    /// An option schema could not be constructed.
    #[error("schema error: {detail}")]
    Schema {
        /// A description of the declaration problem.
        detail: String,
    },

    /// A configuration source supplied malformed input.
    #[error("configuration source '{source_id}': {detail}")]
    Source {
        /// The identity of the offending source.
        source_id: String,
        /// A description of the malformed input.
        detail: String,
    },

    /// An artifact could not be derived from the resolved tree.
    #[error("render error: {detail}")]
    Render {
        /// A description of the rendering failure.
        detail: String,
    },

    /// The service backend rejected or failed an action.
    #[error("service backend failure for unit '{unit}': {detail}")]
    Backend {
        /// The unit the action targeted.
        unit: String,
        /// A description of the failure, including exit status if known.
        detail: String,
    },

    /// The build backend failed to produce an artifact.
    #[error("build failure at step '{step}': {detail}")]
    Build {
        /// The build step that failed.
        step: String,
        /// A log excerpt or description of the failure.
        detail: String,
    },

    /// A YAML document could not be parsed or serialized.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<crate::schema::InvalidKeyPathError> for Error {
    fn from(err: crate::schema::InvalidKeyPathError) -> Self {
        Self::Schema {
            detail: format!("invalid key path '{}': {}", err.path, err.reason),
        }
    }
}

impl Error {
    /// Check if the error carries collected validation violations.
    ///
    /// # Examples
    ///
    /// ```
    /// use strata::Error;
    ///
    /// let err = Error::InvalidConfiguration { violations: vec![] };
    /// assert!(err.is_validation_failure());
    /// ```
    #[must_use]
    pub fn is_validation_failure(&self) -> bool {
        matches!(self, Self::InvalidConfiguration { .. })
    }

    /// Returns the collected violations, if this is a validation failure.
    ///
    /// # Examples
    ///
    /// ```
    /// use strata::Error;
    ///
    /// let err = Error::InvalidConfiguration { violations: vec![] };
    /// assert_eq!(err.violations().map(<[_]>::len), Some(0));
    /// ```
    #[must_use]
    pub fn violations(&self) -> Option<&[Violation]> {
        match self {
            Self::InvalidConfiguration { violations } => Some(violations),
            _ => None,
        }
    }
}
