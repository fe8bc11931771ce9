//! Check command implementation.
//!
//! This module implements the `check` command, which evaluates and
//! validates the fragment sources without printing the configuration.
//! Useful as a pre-apply gate in scripts: exit code 0 means the
//! configuration would evaluate cleanly.

use clap::Args;

use strata::{Error, OutputFormat};

use crate::error::CliError;
use crate::utils::{GlobalOptions, SourceArgs};

use super::run_pass;

/// Validate fragments without printing the configuration.
#[derive(Args)]
pub struct CheckCommand {
    #[command(flatten)]
    pub sources: SourceArgs,

    /// Output format for violations
    #[arg(long, default_value = "human", value_parser = OutputFormat::parse)]
    pub format: OutputFormat,
}

impl CheckCommand {
    /// Execute the check command.
    pub fn execute(&self, global: &GlobalOptions) -> Result<(), CliError> {
        match run_pass(global, &self.sources) {
            Ok(output) => {
                let logger = strata::init_logger(global.verbose, global.quiet);
                logger.info(&format!(
                    "configuration valid: {} option(s), {} unit(s)",
                    output.tree.len(),
                    output.units.len()
                ));
                Ok(())
            }
            Err(CliError::Library(Error::InvalidConfiguration { violations })) => {
                let formatter = self.format.create_formatter();
                eprint!("{}", formatter.format_violations(&violations)?);
                Err(CliError::EvaluationFailure(format!(
                    "configuration invalid: {} violation(s)",
                    violations.len()
                )))
            }
            Err(e) => Err(e),
        }
    }
}
