//! Loading fragments from YAML files.
//!
//! A fragment file contributes values under a single source identity (the
//! file path) and an optional file-wide priority:
//!
//! ```yaml
//! priority: 10
//! set:
//!   build.name: samba
//!   build.patches: [fix-cve.patch]
//! conditional:
//!   - when:
//!       truthy: services.files.enable
//!     set:
//!       services.files.state_dirs: [/var/lib/samba]
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::fragment::{Fragment, Guard, DEFAULT_PRIORITY};
use crate::schema::KeyPath;
use crate::value::Value;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FragmentFile {
    #[serde(default)]
    priority: Option<i64>,
    #[serde(default)]
    set: BTreeMap<String, Value>,
    #[serde(default)]
    conditional: Vec<ConditionalBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConditionalBlock {
    when: Guard,
    #[serde(default)]
    set: BTreeMap<String, Value>,
}

fn parse_key(source_id: &str, key: &str) -> Result<KeyPath> {
    KeyPath::parse(key).map_err(|e| Error::Source {
        source_id: source_id.to_string(),
        detail: e.to_string(),
    })
}

/// Load all fragments of one YAML file.
///
/// The file path becomes the source identity of every returned fragment.
/// Unconditional values come first, then the conditional blocks in file
/// order.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read, or [`Error::Source`]
/// if it is not valid YAML or contains a malformed key path.
pub fn load_fragment_file(path: &Path) -> Result<Vec<Fragment>> {
    let source_id = path.display().to_string();
    let text = fs::read_to_string(path)?;
    let file: FragmentFile = serde_yaml::from_str(&text).map_err(|e| Error::Source {
        source_id: source_id.clone(),
        detail: e.to_string(),
    })?;

    let priority = file.priority.unwrap_or(DEFAULT_PRIORITY);
    let mut fragments = Vec::new();
    for (key, value) in file.set {
        let key_path = parse_key(&source_id, &key)?;
        fragments.push(Fragment::new(&source_id, key_path, value).with_priority(priority));
    }
    for block in file.conditional {
        for (key, value) in block.set {
            let key_path = parse_key(&source_id, &key)?;
            fragments.push(
                Fragment::new(&source_id, key_path, value)
                    .with_priority(priority)
                    .with_guard(block.when.clone()),
            );
        }
    }
    Ok(fragments)
}

/// Load every `.yaml`/`.yml` file of a directory, in file-name order.
///
/// A missing directory yields no fragments; this is how optional
/// per-user fragment directories behave when absent.
///
/// # Errors
///
/// Returns [`Error::Io`] if the directory cannot be listed, or any error
/// of [`load_fragment_file`] for the files inside.
pub fn load_fragment_dir(dir: &Path) -> Result<Vec<Fragment>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|p| {
            p.extension()
                .map_or(false, |ext| ext == "yaml" || ext == "yml")
        })
        .collect();
    paths.sort();

    let mut fragments = Vec::new();
    for path in paths {
        fragments.extend(load_fragment_file(&path)?);
    }
    Ok(fragments)
}

/// The per-user fragment directory, `~/.strata/fragments`.
///
/// Returns `None` when no home directory can be determined.
#[must_use]
pub fn user_fragment_dir() -> Option<PathBuf> {
    home::home_dir().map(|home| home.join(".strata").join("fragments"))
}
