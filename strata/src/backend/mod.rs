//! Backends: the only places side effects happen.
//!
//! The core pipeline is pure. Builds and unit actions go through the
//! traits here, and the recorded [`SystemState`] is owned by whoever
//! embeds the library; the core never persists anything itself.

mod memory;

pub use memory::{InMemoryBuildBackend, InMemoryServiceBackend};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::activation::Action;
use crate::error::Result;
use crate::render::{ArtifactId, BuildRecipe, UnitDescriptor};

/// What the previous activation left behind.
///
/// The planner compares this against the current render to decide which
/// units to stop, start, or restart. The recorded digests are how
/// restart triggers detect artifact content changes across passes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemState {
    /// Every unit the previous activation left running, by name.
    #[serde(default)]
    pub units: BTreeMap<String, UnitDescriptor>,
    /// The digest each artifact had when last applied.
    #[serde(default)]
    pub artifact_digests: BTreeMap<ArtifactId, String>,
}

impl SystemState {
    /// Capture the state a successful activation of `units` leaves behind.
    #[must_use]
    pub fn capture(units: &[UnitDescriptor], digests: &BTreeMap<ArtifactId, String>) -> Self {
        Self {
            units: units
                .iter()
                .map(|u| (u.name.clone(), u.clone()))
                .collect(),
            artifact_digests: digests.clone(),
        }
    }
}

/// Executes unit actions and remembers what is running.
///
/// Implementations may talk to a real service manager or keep everything
/// in memory for tests and dry experimentation.
pub trait ServiceBackend {
    /// The state left behind by the previous activation.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Backend`] if the state cannot be read.
    fn system_state(&self) -> Result<SystemState>;

    /// Apply one action to one unit.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Backend`] if the action fails; the
    /// executor stops at the first failure.
    fn apply(&mut self, unit: &UnitDescriptor, action: &Action) -> Result<()>;

    /// Record the state a fully applied activation leaves behind.
    ///
    /// Called once after every action of a plan succeeded.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Backend`] if the state cannot be stored.
    fn record_state(
        &mut self,
        units: &[UnitDescriptor],
        digests: &BTreeMap<ArtifactId, String>,
    ) -> Result<()>;
}

/// The outcome of a successful build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOutcome {
    /// The name of the produced package.
    pub package: String,
    /// Log lines emitted by the build.
    #[serde(default)]
    pub log: Vec<String>,
}

/// Turns a build recipe into a package.
pub trait BuildBackend {
    /// Build the package described by the recipe.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Build`] naming the failing step.
    fn build(&mut self, recipe: &BuildRecipe) -> Result<BuildOutcome>;
}
