//! Options command implementation.
//!
//! This module implements the `options` command, which lists every
//! option the schema declares, with its type, merge strategy, defaults,
//! and description.

use clap::Args;

use strata::OutputFormat;

use crate::error::CliError;
use crate::utils::{load_schema, GlobalOptions};

/// List the options declared by the schema.
#[derive(Args)]
pub struct OptionsCommand {
    /// Output format
    #[arg(long, default_value = "human", value_parser = OutputFormat::parse)]
    pub format: OutputFormat,

    /// Only list options under this key prefix
    #[arg(long, value_name = "PREFIX")]
    pub prefix: Option<String>,
}

impl OptionsCommand {
    /// Execute the options command.
    pub fn execute(&self, global: &GlobalOptions) -> Result<(), CliError> {
        let schema = load_schema(global)?;

        let schema = match &self.prefix {
            Some(prefix) => {
                let prefix_path = prefix
                    .parse()
                    .map_err(|e| CliError::InvalidArguments(format!("--prefix: {e}")))?;
                let mut filtered = strata::OptionSchema::new();
                for decl in schema.options_under(&prefix_path) {
                    filtered.declare(decl.clone())?;
                }
                filtered
            }
            None => schema,
        };

        let formatter = self.format.create_formatter();
        print!("{}", formatter.format_options(&schema)?);
        Ok(())
    }
}
