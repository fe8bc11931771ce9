//! Render command implementation.
//!
//! This module implements the `render` command, which derives the
//! artifacts of the resolved configuration. By default it lists artifact
//! identities with their digests; a single artifact can be printed, or
//! the whole set written into a directory.

use std::fs;
use std::path::PathBuf;

use clap::Args;

use crate::error::CliError;
use crate::utils::{GlobalOptions, SourceArgs};

use super::run_pass;

/// Render artifacts from the resolved configuration.
#[derive(Args)]
pub struct RenderCommand {
    #[command(flatten)]
    pub sources: SourceArgs,

    /// Print the content of one artifact (e.g. text/files, unit/smbd.service)
    #[arg(long, value_name = "ID")]
    pub artifact: Option<String>,

    /// Write every artifact into this directory
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

impl RenderCommand {
    /// Execute the render command.
    pub fn execute(&self, global: &GlobalOptions) -> Result<(), CliError> {
        let output = run_pass(global, &self.sources)?;

        if let Some(wanted) = &self.artifact {
            let artifact = output
                .artifacts
                .iter()
                .find(|a| a.id.as_str() == wanted)
                .ok_or_else(|| {
                    CliError::InvalidArguments(format!("no artifact with id '{wanted}'"))
                })?;
            print!("{}", artifact.content);
            return Ok(());
        }

        if let Some(dir) = &self.output_dir {
            let logger = strata::init_logger(global.verbose, global.quiet);
            for artifact in &output.artifacts {
                // Artifact ids use '/' as a namespace separator; keep it
                // as directory structure on disk.
                let file_path = dir.join(artifact.id.as_str());
                if let Some(parent) = file_path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&file_path, &artifact.content)?;
                logger.info(&format!("wrote {}", file_path.display()));
            }
            return Ok(());
        }

        for artifact in &output.artifacts {
            println!("{}  {}", artifact.digest(), artifact.id);
        }
        Ok(())
    }
}
