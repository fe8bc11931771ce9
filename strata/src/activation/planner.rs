//! Turning rendered units into an ordered action plan.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::activation::UnitGraph;
use crate::backend::SystemState;
use crate::error::Result;
use crate::render::{ArtifactId, UnitDescriptor};

/// One scheduled step of an activation plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum Action {
    /// Start a unit that was not running before.
    Start {
        /// The unit to start.
        unit: String,
    },
    /// Stop a unit that is no longer part of the configuration.
    Stop {
        /// The unit to stop.
        unit: String,
    },
    /// Restart a running unit whose descriptor or watched artifacts changed.
    Restart {
        /// The unit to restart.
        unit: String,
    },
    /// Leave a running, unchanged unit alone.
    NoOp {
        /// The unit left untouched.
        unit: String,
    },
}

impl Action {
    /// The unit the action targets.
    #[must_use]
    pub fn unit(&self) -> &str {
        match self {
            Self::Start { unit } | Self::Stop { unit } | Self::Restart { unit }
            | Self::NoOp { unit } => unit,
        }
    }

    /// Check whether the action changes anything.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        matches!(self, Self::NoOp { .. })
    }

    /// A human-readable description of the action.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::Start { unit } => format!("Start {unit}"),
            Self::Stop { unit } => format!("Stop {unit}"),
            Self::Restart { unit } => format!("Restart {unit}"),
            Self::NoOp { unit } => format!("Keep {unit} (unchanged)"),
        }
    }
}

/// The ordered actions bringing the system in line with one render.
///
/// Stops come first, in reverse dependency order of the previous state,
/// so dependents stop before their dependencies. Starts, restarts, and
/// no-ops follow in forward dependency order of the current render. The
/// plan carries everything its execution needs, so it can be inspected,
/// serialized, or discarded without touching any backend.
#[derive(Debug, Clone, Serialize)]
pub struct ActivationPlan {
    /// The scheduled actions, in execution order.
    pub actions: Vec<Action>,
    /// The descriptors of every unit the new configuration runs.
    pub units: Vec<UnitDescriptor>,
    /// Descriptors of units being stopped, taken from the previous state.
    pub stopped: Vec<UnitDescriptor>,
    /// The digest of every current artifact, recorded on a full apply.
    pub artifact_digests: BTreeMap<ArtifactId, String>,
}

impl ActivationPlan {
    /// Check whether the plan changes nothing.
    #[must_use]
    pub fn is_all_noop(&self) -> bool {
        self.actions.iter().all(Action::is_noop)
    }

    /// The number of scheduled actions, no-ops included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Check whether the plan schedules nothing at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Human-readable descriptions of every action, in order.
    #[must_use]
    pub fn descriptions(&self) -> Vec<String> {
        self.actions.iter().map(Action::description).collect()
    }

    /// The descriptor an action's unit refers to.
    ///
    /// Stopped units resolve to their previous descriptor; everything
    /// else resolves to the current render.
    #[must_use]
    pub fn descriptor(&self, unit: &str) -> Option<&UnitDescriptor> {
        self.units
            .iter()
            .chain(self.stopped.iter())
            .find(|u| u.name == unit)
    }
}

/// Computes the activation plan between the previous state and a render.
///
/// # Examples
///
/// ```
/// use strata::{ActivationPlanner, SystemState, UnitDescriptor};
/// use std::collections::BTreeMap;
///
/// let units = vec![UnitDescriptor::new("smbd.service", "/usr/sbin/smbd")];
/// let plan = ActivationPlanner::plan(&units, &BTreeMap::new(), &SystemState::default()).unwrap();
/// assert_eq!(plan.descriptions(), ["Start smbd.service"]);
/// ```
pub struct ActivationPlanner;

impl ActivationPlanner {
    /// Plan the actions turning `previous` into the given render.
    ///
    /// `digests` are the current artifact digests; a unit restarts when
    /// any of its restart triggers has a digest differing from the one
    /// recorded in `previous`, or when its own descriptor changed. The
    /// planner performs no I/O.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::CyclicDependency`] when either the current
    /// or the previous unit graph contains a cycle. No partial plan is
    /// produced.
    pub fn plan(
        units: &[UnitDescriptor],
        digests: &BTreeMap<ArtifactId, String>,
        previous: &SystemState,
    ) -> Result<ActivationPlan> {
        let current_order = UnitGraph::build(units).topological_order()?;
        let by_name: BTreeMap<&str, &UnitDescriptor> =
            units.iter().map(|u| (u.name.as_str(), u)).collect();

        let previous_units: Vec<UnitDescriptor> = previous.units.values().cloned().collect();
        let previous_order = UnitGraph::build(&previous_units).topological_order()?;

        let mut actions = Vec::new();
        let mut stopped = Vec::new();
        for name in previous_order.iter().rev() {
            if !by_name.contains_key(name.as_str()) {
                actions.push(Action::Stop { unit: name.clone() });
                if let Some(descriptor) = previous.units.get(name) {
                    stopped.push(descriptor.clone());
                }
            }
        }

        for name in current_order {
            let descriptor = by_name[name.as_str()];
            let action = match previous.units.get(&name) {
                None => Action::Start { unit: name },
                Some(active) => {
                    if active != descriptor || Self::triggers_changed(descriptor, digests, previous)
                    {
                        Action::Restart { unit: name }
                    } else {
                        Action::NoOp { unit: name }
                    }
                }
            };
            log::debug!("planned: {}", action.description());
            actions.push(action);
        }

        Ok(ActivationPlan {
            actions,
            units: units.to_vec(),
            stopped,
            artifact_digests: digests.clone(),
        })
    }

    fn triggers_changed(
        unit: &UnitDescriptor,
        digests: &BTreeMap<ArtifactId, String>,
        previous: &SystemState,
    ) -> bool {
        unit.restart_triggers
            .iter()
            .any(|id| digests.get(id) != previous.artifact_digests.get(id))
    }
}
