//! In-memory backends for tests and dry experimentation.

use std::collections::BTreeMap;

use crate::activation::Action;
use crate::backend::{BuildBackend, BuildOutcome, ServiceBackend, SystemState};
use crate::error::{Error, Result};
use crate::render::{ArtifactId, BuildRecipe, UnitDescriptor};

/// A [`ServiceBackend`] that tracks units in memory and never fails.
///
/// Every applied action is recorded in an action log, which makes
/// assertions on ordering straightforward.
///
/// # Examples
///
/// ```
/// use strata::{Action, InMemoryServiceBackend, ServiceBackend, UnitDescriptor};
///
/// let mut backend = InMemoryServiceBackend::new();
/// let unit = UnitDescriptor::new("smbd.service", "/usr/sbin/smbd");
/// backend
///     .apply(
///         &unit,
///         &Action::Start {
///             unit: "smbd.service".to_string(),
///         },
///     )
///     .unwrap();
/// assert_eq!(backend.action_log(), ["Start smbd.service"]);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryServiceBackend {
    state: SystemState,
    action_log: Vec<String>,
}

impl InMemoryServiceBackend {
    /// Create a backend with no units running.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend that starts from a previous state.
    #[must_use]
    pub fn with_state(state: SystemState) -> Self {
        Self {
            state,
            action_log: Vec::new(),
        }
    }

    /// Descriptions of every applied action, in order.
    #[must_use]
    pub fn action_log(&self) -> &[String] {
        &self.action_log
    }

    /// The backend's current state.
    #[must_use]
    pub fn state(&self) -> &SystemState {
        &self.state
    }
}

impl ServiceBackend for InMemoryServiceBackend {
    fn system_state(&self) -> Result<SystemState> {
        Ok(self.state.clone())
    }

    fn apply(&mut self, unit: &UnitDescriptor, action: &Action) -> Result<()> {
        self.action_log.push(action.description());
        match action {
            Action::Stop { .. } => {
                self.state.units.remove(&unit.name);
            }
            Action::Start { .. } | Action::Restart { .. } => {
                self.state.units.insert(unit.name.clone(), unit.clone());
            }
            Action::NoOp { .. } => {}
        }
        Ok(())
    }

    fn record_state(
        &mut self,
        units: &[UnitDescriptor],
        digests: &BTreeMap<ArtifactId, String>,
    ) -> Result<()> {
        self.state = SystemState::capture(units, digests);
        Ok(())
    }
}

/// A [`BuildBackend`] that pretends to run every build step in memory.
///
/// The recipe's source locator stands in for the real fetch and verify
/// steps: an empty url fails at `fetch`, an empty checksum fails at
/// `verify`. Successful builds are remembered by package name.
///
/// # Examples
///
/// ```
/// use strata::{BuildBackend, BuildRecipe, InMemoryBuildBackend, SourceSpec};
///
/// let recipe = BuildRecipe {
///     name: "samba".to_string(),
///     version: "4.19.2".to_string(),
///     source: SourceSpec {
///         url: "https://example.org/samba-4.19.2.tar.gz".to_string(),
///         checksum: "sha256:abc123".to_string(),
///     },
///     patches: Vec::new(),
///     configure_flags: Vec::new(),
///     dependencies: Default::default(),
/// };
///
/// let mut backend = InMemoryBuildBackend::new();
/// let outcome = backend.build(&recipe).unwrap();
/// assert_eq!(outcome.package, "samba-4.19.2");
/// ```
#[derive(Debug, Default)]
pub struct InMemoryBuildBackend {
    built: Vec<String>,
}

impl InMemoryBuildBackend {
    /// Create a backend with nothing built yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of every package built so far, in build order.
    #[must_use]
    pub fn built(&self) -> &[String] {
        &self.built
    }
}

impl BuildBackend for InMemoryBuildBackend {
    fn build(&mut self, recipe: &BuildRecipe) -> Result<BuildOutcome> {
        if recipe.source.url.is_empty() {
            return Err(Error::Build {
                step: "fetch".to_string(),
                detail: format!("recipe '{}' has no source url", recipe.name),
            });
        }
        if recipe.source.checksum.is_empty() {
            return Err(Error::Build {
                step: "verify".to_string(),
                detail: format!("recipe '{}' has no source checksum", recipe.name),
            });
        }

        let package = format!("{}-{}", recipe.name, recipe.version);
        let mut log = vec![
            format!("fetch {}", recipe.source.url),
            format!("verify {}", recipe.source.checksum),
        ];
        for patch in &recipe.patches {
            log.push(format!("patch {patch}"));
        }
        log.push(format!("configure {}", recipe.configure_flags.join(" ")));
        log.push(format!("install {package}"));

        self.built.push(package.clone());
        Ok(BuildOutcome { package, log })
    }
}
