//! Applying activation plans against a service backend.

use crate::activation::{Action, ActivationPlan};
use crate::backend::ServiceBackend;
use crate::error::{Error, Result};

/// What happened while executing a plan.
///
/// Only produced when every action succeeded; a failed action surfaces
/// as an [`Error::Backend`] from [`PlanExecutor::execute`] instead.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// Whether this was a dry run (nothing was applied).
    pub dry_run: bool,
    /// Descriptions of the actions applied, or that would be applied.
    pub actions_taken: Vec<String>,
}

/// Applies an [`ActivationPlan`] to a [`ServiceBackend`].
///
/// Actions run strictly in plan order, one at a time, so no unit ever
/// receives a second action while its first is outstanding. Execution
/// aborts at the first backend failure; already applied actions stay
/// applied and are reported, but the backend state is only recorded once
/// the whole plan succeeded.
///
/// # Examples
///
/// ```
/// use strata::{
///     ActivationPlanner, InMemoryServiceBackend, PlanExecutor, SystemState, UnitDescriptor,
/// };
/// use std::collections::BTreeMap;
///
/// let units = vec![UnitDescriptor::new("smbd.service", "/usr/sbin/smbd")];
/// let plan =
///     ActivationPlanner::plan(&units, &BTreeMap::new(), &SystemState::default()).unwrap();
///
/// let mut backend = InMemoryServiceBackend::new();
/// let result = PlanExecutor::new(&mut backend).execute(&plan).unwrap();
/// assert_eq!(result.actions_taken, ["Start smbd.service"]);
/// ```
pub struct PlanExecutor<'a, B: ServiceBackend> {
    backend: &'a mut B,
    dry_run: bool,
}

impl<'a, B: ServiceBackend> PlanExecutor<'a, B> {
    /// Create an executor applying actions to the given backend.
    #[must_use]
    pub fn new(backend: &'a mut B) -> Self {
        Self {
            backend,
            dry_run: false,
        }
    }

    /// Switch to dry-run mode: report the would-be actions, apply nothing.
    #[must_use]
    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    /// Execute the plan.
    ///
    /// No-op actions are reported but never sent to the backend. After
    /// the final action succeeds, the backend records the plan's units
    /// and artifact digests as the new system state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Backend`] if an action fails or a scheduled unit
    /// has no descriptor in the plan.
    pub fn execute(&mut self, plan: &ActivationPlan) -> Result<ExecutionResult> {
        if self.dry_run {
            return Ok(ExecutionResult {
                dry_run: true,
                actions_taken: plan.descriptions(),
            });
        }

        let mut actions_taken = Vec::new();
        for action in &plan.actions {
            if let Action::NoOp { .. } = action {
                actions_taken.push(action.description());
                continue;
            }
            let descriptor = plan.descriptor(action.unit()).ok_or_else(|| Error::Backend {
                unit: action.unit().to_string(),
                detail: "plan carries no descriptor for this unit".to_string(),
            })?;
            log::debug!("applying: {}", action.description());
            self.backend.apply(descriptor, action)?;
            actions_taken.push(action.description());
        }

        self.backend.record_state(&plan.units, &plan.artifact_digests)?;
        Ok(ExecutionResult {
            dry_run: false,
            actions_taken,
        })
    }
}
