//! Fragments from `STRATA_SET_*` environment variables.

use crate::error::{Error, Result};
use crate::fragment::Fragment;
use crate::schema::KeyPath;
use crate::value::Value;

/// The prefix marking environment variables that contribute fragments.
pub const ENV_PREFIX: &str = "STRATA_SET_";

/// The priority of environment fragments.
///
/// Higher than file fragments by convention, so an exported variable
/// overrides the same key set in a fragment file.
pub const ENV_PRIORITY: i64 = 500;

/// Collect fragments from `STRATA_SET_*` environment variables.
///
/// The variable name after the prefix is lowercased and `__` becomes a
/// path separator, so `STRATA_SET_BUILD__NAME=samba` contributes `samba`
/// to `build.name`. Values are parsed as YAML scalars, which keeps
/// booleans and lists expressible (`true`, `[a, b]`). Variables are
/// processed in name order so submission order is reproducible.
///
/// # Errors
///
/// Returns [`Error::Source`] if a variable name does not form a valid
/// key path or its value is not valid YAML.
pub fn environment_fragments() -> Result<Vec<Fragment>> {
    let mut vars: Vec<(String, String)> = std::env::vars()
        .filter(|(name, _)| name.starts_with(ENV_PREFIX))
        .collect();
    vars.sort();

    let mut fragments = Vec::new();
    for (name, raw) in vars {
        let source_id = format!("env:{name}");
        let key_text = name[ENV_PREFIX.len()..].to_lowercase().replace("__", ".");
        let path = KeyPath::parse(&key_text).map_err(|e| Error::Source {
            source_id: source_id.clone(),
            detail: e.to_string(),
        })?;
        let value: Value = serde_yaml::from_str(&raw).map_err(|e| Error::Source {
            source_id: source_id.clone(),
            detail: format!("value is not valid YAML: {e}"),
        })?;
        fragments.push(Fragment::new(&source_id, path, value).with_priority(ENV_PRIORITY));
    }
    Ok(fragments)
}
