//! One isolated evaluation pass from fragments to rendered artifacts.
//!
//! A pass owns its fragment store, so concurrent passes never share
//! state. Each run recomputes everything from scratch: merge, the
//! conditional fixed point, validation, and rendering. There is no
//! incremental mutation, which is what makes repeated evaluation
//! reproducible.

use std::collections::BTreeMap;

use crate::conditional::ConditionalEvaluator;
use crate::error::{Error, Result};
use crate::fragment::{Fragment, FragmentStore};
use crate::merge::ResolvedTree;
use crate::render::{Artifact, ArtifactId, BuildRecipe, Renderer, UnitDescriptor};
use crate::schema::OptionSchema;
use crate::validate::Validator;

/// Everything a successful pass produces.
#[derive(Debug, Clone)]
pub struct PassOutput {
    /// The fully resolved configuration tree.
    pub tree: ResolvedTree,
    /// Non-fatal merge warnings, such as override priority ties.
    pub warnings: Vec<String>,
    /// The number of conditional admit/discard rounds performed.
    pub rounds: usize,
    /// All derived artifacts.
    pub artifacts: Vec<Artifact>,
    /// Descriptors of every unit that should be running.
    pub units: Vec<UnitDescriptor>,
    /// The build recipe, when a build is configured.
    pub recipe: Option<BuildRecipe>,
}

impl PassOutput {
    /// The digest of every artifact, keyed by identity.
    #[must_use]
    pub fn artifact_digests(&self) -> BTreeMap<ArtifactId, String> {
        self.artifacts
            .iter()
            .map(|a| (a.id.clone(), a.digest()))
            .collect()
    }
}

/// An isolated evaluation pass: schema plus accumulating fragments.
///
/// # Examples
///
/// ```
/// use strata::{
///     EvaluationPass, Fragment, MergeStrategy, OptionDecl, OptionSchema, OptionType, Value,
/// };
///
/// let mut schema = OptionSchema::new();
/// schema
///     .declare(OptionDecl::new(
///         "services.files.enable".parse().unwrap(),
///         OptionType::Bool,
///         MergeStrategy::BoolOr,
///         "",
///     ))
///     .unwrap();
///
/// let mut pass = EvaluationPass::new(schema);
/// pass.submit(Fragment::new(
///     "site.yaml",
///     "services.files.enable".parse().unwrap(),
///     Value::Bool(true),
/// ));
///
/// let output = pass.run().unwrap();
/// assert_eq!(
///     output.tree.get(&"services.files.enable".parse().unwrap()),
///     Some(&Value::Bool(true))
/// );
/// ```
#[derive(Debug)]
pub struct EvaluationPass {
    schema: OptionSchema,
    store: FragmentStore,
}

impl EvaluationPass {
    /// Create a pass over the given schema with an empty store.
    #[must_use]
    pub fn new(schema: OptionSchema) -> Self {
        Self {
            schema,
            store: FragmentStore::new(),
        }
    }

    /// The schema this pass evaluates against.
    #[must_use]
    pub fn schema(&self) -> &OptionSchema {
        &self.schema
    }

    /// The pass's fragment store.
    #[must_use]
    pub fn store(&self) -> &FragmentStore {
        &self.store
    }

    /// Submit one fragment.
    pub fn submit(&mut self, fragment: Fragment) {
        self.store.submit(fragment);
    }

    /// Submit several fragments, preserving their relative order.
    pub fn submit_all<I: IntoIterator<Item = Fragment>>(&mut self, fragments: I) {
        self.store.submit_all(fragments);
    }

    /// Run the full pipeline: merge, conditionals, validate, render.
    ///
    /// The pass itself is not consumed; running it again performs a
    /// wholly fresh recomputation over the same fragments.
    ///
    /// # Errors
    ///
    /// Returns any merge or conditional error, or
    /// [`Error::InvalidConfiguration`] carrying every violation the
    /// validator collected. Nothing is rendered for an invalid tree.
    pub fn run(&self) -> Result<PassOutput> {
        let outcome = ConditionalEvaluator::resolve(&self.store, &self.schema)?;
        log::debug!(
            "resolved {} paths in {} conditional round(s)",
            outcome.tree.len(),
            outcome.rounds
        );

        let violations = Validator::validate(&outcome.tree, &self.schema);
        if !violations.is_empty() {
            return Err(Error::InvalidConfiguration { violations });
        }

        let rendered = Renderer::render(&outcome.tree, &self.schema)?;
        Ok(PassOutput {
            tree: outcome.tree,
            warnings: outcome.warnings,
            rounds: outcome.rounds,
            artifacts: rendered.artifacts,
            units: rendered.units,
            recipe: rendered.recipe,
        })
    }
}
