//! Utility functions for CLI operations.
//!
//! This module provides the pieces shared by every command: global
//! options, schema loading, fragment source assembly, and the
//! file-backed system state used by `plan` and `apply`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use clap::Args;
use serde::{Deserialize, Serialize};

use strata::{
    environment_fragments, load_fragment_dir, load_fragment_file, load_schema_file,
    user_fragment_dir, Action, ArtifactId, Fragment, OptionSchema, ServiceBackend, SystemState,
    UnitDescriptor, Value,
};

use crate::error::CliError;

/// The priority of `--set` fragments; above files and the environment.
pub const CLI_SET_PRIORITY: i64 = 1000;

/// Global CLI options shared across all commands.
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    /// Enable verbose output.
    pub verbose: bool,

    /// Suppress non-essential output.
    pub quiet: bool,

    /// The schema file declaring the option set.
    pub schema: Option<PathBuf>,

    /// Where the applied system state is persisted.
    pub state_file: Option<PathBuf>,
}

/// Load the option schema named by `--schema` or `STRATA_SCHEMA`.
///
/// Every command needs a schema; there is no built-in default option set.
pub fn load_schema(global: &GlobalOptions) -> Result<OptionSchema, CliError> {
    let path = global
        .schema
        .as_deref()
        .ok_or_else(|| CliError::Config("no schema file (use --schema or STRATA_SCHEMA)".to_string()))?;
    load_schema_file(path).map_err(CliError::from)
}

/// Resolve the state file path: `--state-file`, or `~/.strata/state.yaml`.
pub fn resolve_state_file(global: &GlobalOptions) -> Result<PathBuf, CliError> {
    if let Some(path) = &global.state_file {
        return Ok(path.clone());
    }
    let home_dir = home::home_dir()
        .ok_or_else(|| CliError::Config("could not determine home directory".to_string()))?;
    Ok(home_dir.join(".strata").join("state.yaml"))
}

/// Fragment sources shared by every evaluating command.
#[derive(Debug, Args)]
pub struct SourceArgs {
    /// Fragment file to evaluate (repeatable, evaluated in order)
    #[arg(short = 'f', long = "fragment", value_name = "FILE")]
    pub fragments: Vec<PathBuf>,

    /// Directory of fragment files to evaluate (repeatable)
    #[arg(long = "fragment-dir", value_name = "DIR")]
    pub fragment_dirs: Vec<PathBuf>,

    /// Set a single option (KEY=VALUE, overrides files and environment)
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,

    /// Ignore STRATA_SET_* environment variables
    #[arg(long)]
    pub no_env: bool,

    /// Ignore the per-user fragment directory (~/.strata/fragments)
    #[arg(long)]
    pub no_user_fragments: bool,
}

impl SourceArgs {
    /// Collect fragments from every enabled source.
    ///
    /// Sources are submitted lowest precedence first: the user fragment
    /// directory, then project files and directories in argument order,
    /// then the environment, then `--set`. Precedence itself is carried
    /// by priorities; submission order only breaks ties.
    pub fn collect(&self) -> Result<Vec<Fragment>, CliError> {
        let mut fragments = Vec::new();

        if !self.no_user_fragments {
            if let Some(dir) = user_fragment_dir() {
                fragments.extend(load_fragment_dir(&dir)?);
            }
        }
        for dir in &self.fragment_dirs {
            fragments.extend(load_fragment_dir(dir)?);
        }
        for file in &self.fragments {
            fragments.extend(load_fragment_file(file)?);
        }
        if !self.no_env {
            fragments.extend(environment_fragments()?);
        }
        for assignment in &self.set {
            fragments.push(parse_set(assignment)?);
        }

        Ok(fragments)
    }
}

/// Parse one `--set KEY=VALUE` assignment into a fragment.
///
/// The value is parsed as a YAML scalar, so booleans and lists work the
/// same way they do in fragment files.
pub fn parse_set(assignment: &str) -> Result<Fragment, CliError> {
    let (key, raw_value) = assignment.split_once('=').ok_or_else(|| {
        CliError::InvalidArguments(format!("--set expects KEY=VALUE, got '{assignment}'"))
    })?;
    let path = key
        .parse()
        .map_err(|e| CliError::InvalidArguments(format!("--set key '{key}': {e}")))?;
    let value: Value = serde_yaml::from_str(raw_value).map_err(|e| {
        CliError::InvalidArguments(format!("--set value for '{key}' is not valid YAML: {e}"))
    })?;
    Ok(Fragment::new("cli:--set", path, value).with_priority(CLI_SET_PRIORITY))
}

/// The persisted system state, with the time it was applied.
#[derive(Debug, Serialize, Deserialize)]
pub struct StateFile {
    /// When the state was recorded.
    pub applied_at: DateTime<Utc>,
    /// What the activation left running.
    pub state: SystemState,
}

/// Read the system state from a state file.
///
/// A missing file means nothing has ever been applied.
pub fn load_state(path: &Path) -> Result<SystemState, CliError> {
    if !path.exists() {
        return Ok(SystemState::default());
    }
    let text = fs::read_to_string(path)?;
    let file: StateFile = serde_yaml::from_str(&text)
        .map_err(|e| CliError::Config(format!("state file {}: {e}", path.display())))?;
    Ok(file.state)
}

/// A [`ServiceBackend`] that persists its state to the state file.
///
/// Unit actions are reported through the logger; the state file is only
/// rewritten once a whole plan succeeded.
pub struct FileServiceBackend {
    path: PathBuf,
    state: SystemState,
}

impl FileServiceBackend {
    /// Open the backend, reading the previous state if the file exists.
    pub fn open(path: PathBuf) -> Result<Self, CliError> {
        let state = load_state(&path)?;
        Ok(Self { path, state })
    }
}

impl ServiceBackend for FileServiceBackend {
    fn system_state(&self) -> strata::Result<SystemState> {
        Ok(self.state.clone())
    }

    fn apply(&mut self, unit: &UnitDescriptor, action: &Action) -> strata::Result<()> {
        log::debug!("{}", action.description());
        match action {
            Action::Stop { .. } => {
                self.state.units.remove(&unit.name);
            }
            Action::Start { .. } | Action::Restart { .. } => {
                self.state.units.insert(unit.name.clone(), unit.clone());
            }
            Action::NoOp { .. } => {}
        }
        Ok(())
    }

    fn record_state(
        &mut self,
        units: &[UnitDescriptor],
        digests: &BTreeMap<ArtifactId, String>,
    ) -> strata::Result<()> {
        self.state = SystemState::capture(units, digests);
        let file = StateFile {
            applied_at: Utc::now(),
            state: self.state.clone(),
        };
        let text = serde_yaml::to_string(&file)?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, text)?;
        Ok(())
    }
}
