//! CLI structure and command definitions.
//!
//! This module defines the main CLI structure using clap's derive macros,
//! including global options and subcommands.

use crate::commands::{
    ApplyCommand, CheckCommand, CompletionsCommand, EvalCommand, OptionsCommand, PlanCommand,
    RenderCommand,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line tool for composing declarative system configuration.
#[derive(Parser)]
#[command(name = "strata")]
#[command(version, about = "Compose declarative configuration into build and service artifacts", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Schema file declaring the option set
    #[arg(long, value_name = "PATH", global = true, env = "STRATA_SCHEMA")]
    pub schema: Option<PathBuf>,

    /// Where the applied system state is persisted
    #[arg(long, value_name = "PATH", global = true, env = "STRATA_STATE_FILE")]
    pub state_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand)]
pub enum Command {
    /// Evaluate fragments and print the resolved configuration
    Eval(EvalCommand),

    /// Validate fragments without printing the configuration
    Check(CheckCommand),

    /// Render artifacts from the resolved configuration
    Render(RenderCommand),

    /// Show the activation plan against the recorded state
    Plan(PlanCommand),

    /// Apply the activation plan and record the new state
    Apply(ApplyCommand),

    /// List the options declared by the schema
    Options(OptionsCommand),

    /// Generate shell completion scripts
    Completions(CompletionsCommand),
}
