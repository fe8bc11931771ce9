//! Pure derivation of artifacts and unit descriptors from a resolved tree.
//!
//! Rendering never touches the filesystem, the clock, or any backend.
//! It reads the tree and the schema and produces values, so the same
//! inputs always produce byte-identical artifacts.

mod artifact;
mod recipe;
mod text;
mod unit;

pub use artifact::{Artifact, ArtifactId, ArtifactKind};
pub use recipe::{BuildRecipe, SourceSpec};
pub use unit::UnitDescriptor;

use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::Result;
use crate::merge::ResolvedTree;
use crate::schema::{KeyPath, OptionSchema};
use crate::value::Value;

/// Everything one render pass produces.
#[derive(Debug, Clone, Serialize)]
pub struct RenderOutput {
    /// All artifacts: recipes first, then configuration texts, then units.
    pub artifacts: Vec<Artifact>,
    /// Descriptors of every unit that should be running.
    pub units: Vec<UnitDescriptor>,
    /// The build recipe, when a build is configured.
    pub recipe: Option<BuildRecipe>,
}

impl RenderOutput {
    /// The digest of every artifact, keyed by identity.
    #[must_use]
    pub fn artifact_digests(&self) -> BTreeMap<ArtifactId, String> {
        self.artifacts
            .iter()
            .map(|a| (a.id.clone(), a.digest()))
            .collect()
    }

    /// Look up one artifact by identity.
    #[must_use]
    pub fn artifact(&self, id: &ArtifactId) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| &a.id == id)
    }
}

/// Derives artifacts and unit descriptors from a resolved tree.
pub struct Renderer;

impl Renderer {
    /// Render all artifacts and unit descriptors.
    ///
    /// The tree is expected to have passed validation; rendering still
    /// reports structural gaps (such as an enabled feature without a
    /// package) as [`crate::Error::Render`] rather than producing
    /// incomplete output.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Render`] for structurally incomplete
    /// input, or a YAML error if recipe serialization fails.
    pub fn render(tree: &ResolvedTree, schema: &OptionSchema) -> Result<RenderOutput> {
        let mut artifacts = Vec::new();

        let recipe = match recipe::render_build(tree, schema)? {
            Some((recipe, mut recipe_artifacts)) => {
                artifacts.append(&mut recipe_artifacts);
                Some(recipe)
            }
            None => None,
        };

        artifacts.extend(text::render_service_texts(tree, schema)?);

        let (units, mut unit_artifacts) = unit::render_service_units(tree, schema)?;
        artifacts.append(&mut unit_artifacts);

        Ok(RenderOutput {
            artifacts,
            units,
            recipe,
        })
    }
}

pub(crate) fn str_value<'a>(tree: &'a ResolvedTree, path: &KeyPath) -> Option<&'a str> {
    match tree.get_or_null(path) {
        Value::Str(s) => Some(s),
        _ => None,
    }
}

pub(crate) fn list_value(tree: &ResolvedTree, path: &KeyPath) -> Vec<String> {
    tree.get_or_null(path)
        .as_list()
        .map(<[String]>::to_vec)
        .unwrap_or_default()
}

pub(crate) fn bool_value(tree: &ResolvedTree, path: &KeyPath) -> bool {
    tree.get_or_null(path).as_bool().unwrap_or(false)
}

pub(crate) fn enabled_services(tree: &ResolvedTree, schema: &OptionSchema) -> Result<Vec<String>> {
    let prefix = KeyPath::parse("services")?;
    let mut services = Vec::new();
    for decl in schema.options_under(&prefix) {
        let segments = decl.path.segments();
        if segments.len() == 3 && segments[2] == "enable" && bool_value(tree, &decl.path) {
            services.push(segments[1].clone());
        }
    }
    Ok(services)
}
