//! Eval command implementation.
//!
//! This module implements the `eval` command, which evaluates the
//! fragment sources against the schema and prints the resolved
//! configuration tree.

use clap::Args;

use strata::{Error, OutputFormat};

use crate::error::CliError;
use crate::utils::{GlobalOptions, SourceArgs};

use super::run_pass;

/// Evaluate fragments and print the resolved configuration.
#[derive(Args)]
pub struct EvalCommand {
    #[command(flatten)]
    pub sources: SourceArgs,

    /// Output format
    #[arg(long, default_value = "human", value_parser = OutputFormat::parse)]
    pub format: OutputFormat,
}

impl EvalCommand {
    /// Execute the eval command.
    pub fn execute(&self, global: &GlobalOptions) -> Result<(), CliError> {
        let formatter = self.format.create_formatter();

        let output = match run_pass(global, &self.sources) {
            Ok(output) => output,
            // Validation failures report every violation, not just the first.
            Err(CliError::Library(Error::InvalidConfiguration { violations })) => {
                eprint!("{}", formatter.format_violations(&violations)?);
                return Err(CliError::EvaluationFailure(format!(
                    "configuration invalid: {} violation(s)",
                    violations.len()
                )));
            }
            Err(e) => return Err(e),
        };

        print!("{}", formatter.format_tree(&output.tree)?);
        Ok(())
    }
}
