//! Service unit descriptors and their rendered unit files.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::merge::ResolvedTree;
use crate::render::{Artifact, ArtifactId, ArtifactKind};
use crate::schema::{KeyPath, OptionSchema};

/// Everything the service backend needs to know about one unit.
///
/// Descriptors are compared structurally during activation planning: a
/// unit whose descriptor changed between passes is restarted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitDescriptor {
    /// The unit name, such as `smbd.service`.
    pub name: String,
    /// The command that starts the unit.
    pub start: String,
    /// The command that reloads the unit without restarting, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reload: Option<String>,
    /// Units that must be active whenever this one is.
    #[serde(default)]
    pub requires: Vec<String>,
    /// Units ordered before this one at start.
    #[serde(default)]
    pub after: Vec<String>,
    /// Artifacts whose digest change forces a restart of this unit.
    #[serde(default)]
    pub restart_triggers: Vec<ArtifactId>,
}

impl UnitDescriptor {
    /// Create a descriptor with no dependencies or triggers.
    #[must_use]
    pub fn new(name: &str, start: &str) -> Self {
        Self {
            name: name.to_string(),
            start: start.to_string(),
            reload: None,
            requires: Vec::new(),
            after: Vec::new(),
            restart_triggers: Vec::new(),
        }
    }

    /// Set the reload command.
    #[must_use]
    pub fn with_reload(mut self, reload: &str) -> Self {
        self.reload = Some(reload.to_string());
        self
    }

    /// Add a required unit.
    #[must_use]
    pub fn with_requires(mut self, unit: &str) -> Self {
        self.requires.push(unit.to_string());
        self
    }

    /// Add a unit ordered before this one.
    #[must_use]
    pub fn with_after(mut self, unit: &str) -> Self {
        self.after.push(unit.to_string());
        self
    }

    /// Add an artifact whose content change restarts this unit.
    #[must_use]
    pub fn with_restart_trigger(mut self, artifact: ArtifactId) -> Self {
        self.restart_triggers.push(artifact);
        self
    }
}

fn unit_file_text(unit: &UnitDescriptor) -> String {
    let mut lines = vec!["[Unit]".to_string(), format!("Description={}", unit.name)];
    if !unit.requires.is_empty() {
        lines.push(format!("Requires={}", unit.requires.join(" ")));
    }
    if !unit.after.is_empty() {
        lines.push(format!("After={}", unit.after.join(" ")));
    }
    lines.push(String::new());
    lines.push("[Service]".to_string());
    lines.push(format!("ExecStart={}", unit.start));
    if let Some(reload) = &unit.reload {
        lines.push(format!("ExecReload={reload}"));
    }
    format!("{}\n", lines.join("\n"))
}

/// Derive unit descriptors and unit-file artifacts for enabled services.
///
/// Every enabled service gets a setup unit (`<service>-setup.service`)
/// that creates its state directories, plus one unit per declared daemon.
/// Daemon units require the setup unit, start after the network and the
/// setup unit, and restart whenever the service's configuration text
/// changes.
pub(crate) fn render_service_units(
    tree: &ResolvedTree,
    schema: &OptionSchema,
) -> Result<(Vec<UnitDescriptor>, Vec<Artifact>)> {
    let mut units = Vec::new();
    let mut artifacts = Vec::new();
    let mut seen = BTreeSet::new();

    for service in super::enabled_services(tree, schema)? {
        let text_id = ArtifactId::text(&service);
        let setup_name = format!("{service}-setup.service");
        let dirs = super::list_value(tree, &KeyPath::parse(&format!(
            "services.{service}.state_dirs"
        ))?);
        let setup_start = if dirs.is_empty() {
            "true".to_string()
        } else {
            format!("mkdir -p {}", dirs.join(" "))
        };
        let setup = UnitDescriptor::new(&setup_name, &setup_start);
        artifacts.push(Artifact::new(
            ArtifactId::unit(&setup_name),
            ArtifactKind::Unit,
            unit_file_text(&setup),
        ));
        if !seen.insert(setup_name.clone()) {
            return Err(Error::Render {
                detail: format!("duplicate unit name '{setup_name}'"),
            });
        }
        units.push(setup);

        let daemon_prefix = KeyPath::parse(&format!("services.{service}.daemon"))?;
        for decl in schema.options_under(&daemon_prefix) {
            let segments = decl.path.segments();
            if segments.len() != 5 || segments[4] != "command" {
                continue;
            }
            let daemon = segments[3].clone();
            let Some(command) = super::str_value(tree, &decl.path) else {
                return Err(Error::Render {
                    detail: format!(
                        "daemon '{daemon}' of enabled service '{service}' has no command"
                    ),
                });
            };

            let reload_path =
                KeyPath::parse(&format!("services.{service}.daemon.{daemon}.reload"))?;
            let unit_name = format!("{daemon}.service");
            let mut descriptor = UnitDescriptor::new(&unit_name, command)
                .with_requires(&setup_name)
                .with_after("network.target")
                .with_after(&setup_name)
                .with_restart_trigger(text_id.clone());
            if let Some(reload) = super::str_value(tree, &reload_path) {
                descriptor = descriptor.with_reload(reload);
            }

            artifacts.push(
                Artifact::new(
                    ArtifactId::unit(&unit_name),
                    ArtifactKind::Unit,
                    unit_file_text(&descriptor),
                )
                .with_dependency(text_id.clone())
                .with_dependency(ArtifactId::unit(&setup_name)),
            );
            if !seen.insert(unit_name.clone()) {
                return Err(Error::Render {
                    detail: format!("duplicate unit name '{unit_name}'"),
                });
            }
            units.push(descriptor);
        }
    }

    Ok((units, artifacts))
}
