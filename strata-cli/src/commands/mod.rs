//! CLI command implementations.
//!
//! This module contains the implementations of all CLI commands:
//! - `eval`: Evaluate fragments and print the resolved configuration
//! - `check`: Validate fragments without printing the configuration
//! - `render`: Render artifacts from the resolved configuration
//! - `plan`: Show the activation plan against the recorded state
//! - `apply`: Apply the activation plan and record the new state
//! - `options`: List the options declared by the schema
//! - `completions`: Generate shell completion scripts

pub mod apply;
pub mod check;
pub mod completions;
pub mod eval;
pub mod options;
pub mod plan;
pub mod render;

pub use apply::ApplyCommand;
pub use check::CheckCommand;
pub use completions::CompletionsCommand;
pub use eval::EvalCommand;
pub use options::OptionsCommand;
pub use plan::PlanCommand;
pub use render::RenderCommand;

use strata::{EvaluationPass, PassOutput};

use crate::error::CliError;
use crate::utils::{load_schema, GlobalOptions, SourceArgs};

/// Run one evaluation pass over the given sources.
///
/// Shared by every command that needs a resolved configuration. Merge
/// warnings go to the logger; evaluation failures other than validation
/// pass through so the caller's error mapping applies.
pub(crate) fn run_pass(
    global: &GlobalOptions,
    sources: &SourceArgs,
) -> Result<PassOutput, CliError> {
    let schema = load_schema(global)?;
    let mut pass = EvaluationPass::new(schema);
    pass.submit_all(sources.collect()?);

    let output = pass.run()?;
    let logger = strata::init_logger(global.verbose, global.quiet);
    for warning in &output.warnings {
        logger.warn(warning);
    }
    Ok(output)
}
