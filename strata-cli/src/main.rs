//! Main entry point for the strata CLI.
//!
//! This is the command-line interface for the strata configuration
//! composition system. It provides commands for evaluating fragment
//! sources against a schema:
//! - `eval`: Evaluate fragments and print the resolved configuration
//! - `check`: Validate fragments without printing the configuration
//! - `render`: Render artifacts from the resolved configuration
//! - `plan`: Show the activation plan against the recorded state
//! - `apply`: Apply the activation plan and record the new state

mod cli;
mod commands;
mod error;
mod utils;

use clap::Parser;
use cli::Cli;
use utils::GlobalOptions;

fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let _logger = strata::init_logger(cli.verbose, cli.quiet);

    // Convert CLI args to GlobalOptions
    let global = GlobalOptions {
        verbose: cli.verbose,
        quiet: cli.quiet,
        schema: cli.schema,
        state_file: cli.state_file,
    };

    // Execute the command
    let result = match cli.command {
        cli::Command::Eval(cmd) => cmd.execute(&global),
        cli::Command::Check(cmd) => cmd.execute(&global),
        cli::Command::Render(cmd) => cmd.execute(&global),
        cli::Command::Plan(cmd) => cmd.execute(&global),
        cli::Command::Apply(cmd) => cmd.execute(&global),
        cli::Command::Options(cmd) => cmd.execute(&global),
        cli::Command::Completions(cmd) => cmd.execute(&global),
    };

    // Handle errors and set exit code
    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
