//! Shell completion generation command.
//!
//! This module provides the `completions` command which generates shell completion
//! scripts for bash, zsh, fish, and PowerShell.

use crate::cli::Cli;
use crate::error::CliError;
use crate::utils::GlobalOptions;
use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use std::io;

/// Binary name from Cargo.toml
const BIN_NAME: &str = "strata";

/// Generate shell completion scripts
#[derive(Parser)]
pub struct CompletionsCommand {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

impl CompletionsCommand {
    /// Execute the completions command.
    pub fn execute(&self, _global: &GlobalOptions) -> Result<(), CliError> {
        let mut cmd = Cli::command();

        eprintln!("# Generating {} completion script", self.shell);
        eprintln!("# Run the following command to enable completions:");

        match self.shell {
            Shell::Bash => {
                eprintln!(
                    "#   strata completions bash > ~/.local/share/bash-completion/completions/strata"
                );
                eprintln!("# Or source it directly in ~/.bashrc:");
                eprintln!("#   eval \"$(strata completions bash)\"");
            }
            Shell::Zsh => {
                eprintln!("#   strata completions zsh > ~/.zsh/completions/_strata");
                eprintln!("# Make sure ~/.zsh/completions is in your $fpath");
                eprintln!("# Or add to ~/.zshrc:");
                eprintln!("#   eval \"$(strata completions zsh)\"");
            }
            Shell::Fish => {
                eprintln!("#   strata completions fish > ~/.config/fish/completions/strata.fish");
                eprintln!("# Or add to config.fish:");
                eprintln!("#   strata completions fish | source");
            }
            Shell::PowerShell => {
                eprintln!("#   strata completions powershell > $PROFILE");
                eprintln!("# Or run:");
                eprintln!("#   strata completions powershell | Out-String | Invoke-Expression");
            }
            _ => {
                // Other shells supported by clap_complete need no custom instructions
            }
        }

        eprintln!();

        generate(self.shell, &mut cmd, BIN_NAME, &mut io::stdout());

        Ok(())
    }
}
