//! Plan command implementation.
//!
//! This module implements the `plan` command, which computes the
//! activation plan between the recorded system state and the current
//! configuration without applying anything.

use clap::Args;

use strata::{ActivationPlanner, OutputFormat};

use crate::error::CliError;
use crate::utils::{load_state, resolve_state_file, GlobalOptions, SourceArgs};

use super::run_pass;

/// Show the activation plan against the recorded state.
#[derive(Args)]
pub struct PlanCommand {
    #[command(flatten)]
    pub sources: SourceArgs,

    /// Output format
    #[arg(long, default_value = "human", value_parser = OutputFormat::parse)]
    pub format: OutputFormat,
}

impl PlanCommand {
    /// Execute the plan command.
    pub fn execute(&self, global: &GlobalOptions) -> Result<(), CliError> {
        let output = run_pass(global, &self.sources)?;

        let state_file = resolve_state_file(global)?;
        let previous = load_state(&state_file)?;

        let plan =
            ActivationPlanner::plan(&output.units, &output.artifact_digests(), &previous)?;

        let formatter = self.format.create_formatter();
        print!("{}", formatter.format_plan(&plan)?);
        Ok(())
    }
}
