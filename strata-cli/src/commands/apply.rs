//! Apply command implementation.
//!
//! This module implements the `apply` command, which computes the
//! activation plan against the recorded state, executes it, and persists
//! the resulting state. With `--dry-run`, the plan is reported and
//! nothing changes.

use clap::Args;

use strata::{ActivationPlanner, PlanExecutor, ServiceBackend};

use crate::error::CliError;
use crate::utils::{resolve_state_file, FileServiceBackend, GlobalOptions, SourceArgs};

use super::run_pass;

/// Apply the activation plan and record the new state.
#[derive(Args)]
pub struct ApplyCommand {
    #[command(flatten)]
    pub sources: SourceArgs,

    /// Report the plan without applying it
    #[arg(long)]
    pub dry_run: bool,
}

impl ApplyCommand {
    /// Execute the apply command.
    pub fn execute(&self, global: &GlobalOptions) -> Result<(), CliError> {
        let output = run_pass(global, &self.sources)?;

        let state_file = resolve_state_file(global)?;
        let mut backend = FileServiceBackend::open(state_file)?;
        let previous = backend
            .system_state()
            .map_err(CliError::from)?;

        let plan =
            ActivationPlanner::plan(&output.units, &output.artifact_digests(), &previous)?;

        if plan.is_all_noop() && !plan.is_empty() {
            let logger = strata::init_logger(global.verbose, global.quiet);
            logger.info("system already matches the configuration");
        }

        let mut executor = PlanExecutor::new(&mut backend);
        if self.dry_run {
            executor = executor.dry_run();
        }
        let result = executor.execute(&plan)?;

        for action in &result.actions_taken {
            if result.dry_run {
                println!("would apply: {action}");
            } else {
                println!("{action}");
            }
        }
        Ok(())
    }
}
