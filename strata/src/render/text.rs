//! Rendering each enabled service's configuration text.

use crate::error::Result;
use crate::merge::ResolvedTree;
use crate::render::{Artifact, ArtifactId, ArtifactKind};
use crate::schema::{KeyPath, OptionSchema};

/// Render the configuration text artifact of every enabled service.
///
/// The text lists the service's settings in schema declaration order as
/// `key = value` lines, followed by the `extra_config` block when it is
/// non-empty. Settings without a value, or with an explicit null, are
/// omitted. The artifact exists for every enabled service even when the
/// text is empty, so daemons always have something to watch.
pub(crate) fn render_service_texts(
    tree: &ResolvedTree,
    schema: &OptionSchema,
) -> Result<Vec<Artifact>> {
    let mut artifacts = Vec::new();
    for service in super::enabled_services(tree, schema)? {
        let settings_prefix = KeyPath::parse(&format!("services.{service}.settings"))?;
        let mut pieces = Vec::new();
        for decl in schema.options_under(&settings_prefix) {
            if let Some(value) = tree.get(&decl.path) {
                if !value.is_null() {
                    pieces.push(format!("{} = {value}", decl.path.last()));
                }
            }
        }

        let extra_path = KeyPath::parse(&format!("services.{service}.extra_config"))?;
        if let Some(extra) = super::str_value(tree, &extra_path) {
            if !extra.is_empty() {
                pieces.push(extra.to_string());
            }
        }

        let content = if pieces.is_empty() {
            String::new()
        } else {
            format!("{}\n", pieces.join("\n"))
        };
        artifacts.push(Artifact::new(
            ArtifactId::text(&service),
            ArtifactKind::Text,
            content,
        ));
    }
    Ok(artifacts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{
        register_service_options, register_service_setting, OptionType,
    };
    use crate::value::Value;

    fn path(s: &str) -> KeyPath {
        s.parse().unwrap()
    }

    fn files_schema() -> OptionSchema {
        let mut schema = OptionSchema::new();
        register_service_options(&mut schema, "files").unwrap();
        register_service_setting(&mut schema, "files", "workgroup", OptionType::Str, "").unwrap();
        register_service_setting(&mut schema, "files", "security", OptionType::Str, "").unwrap();
        register_service_setting(&mut schema, "files", "guest_ok", OptionType::Bool, "").unwrap();
        schema
    }

    #[test]
    fn test_disabled_service_renders_nothing() {
        let schema = files_schema();
        let mut tree = ResolvedTree::new();
        tree.insert(path("services.files.enable"), Value::Bool(false));

        let artifacts = render_service_texts(&tree, &schema).unwrap();
        assert!(artifacts.is_empty());
    }

    #[test]
    fn test_settings_in_declaration_order() {
        let schema = files_schema();
        let mut tree = ResolvedTree::new();
        tree.insert(path("services.files.enable"), Value::Bool(true));
        // Inserted in the opposite of declaration order on purpose.
        tree.insert(path("services.files.settings.guest_ok"), Value::Bool(false));
        tree.insert(path("services.files.settings.security"), Value::from("user"));
        tree.insert(path("services.files.settings.workgroup"), Value::from("HOME"));

        let artifacts = render_service_texts(&tree, &schema).unwrap();
        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].id, ArtifactId::text("files"));
        assert_eq!(
            artifacts[0].content,
            "workgroup = HOME\nsecurity = user\nguest_ok = false\n"
        );
    }

    #[test]
    fn test_absent_and_null_settings_are_omitted() {
        let schema = files_schema();
        let mut tree = ResolvedTree::new();
        tree.insert(path("services.files.enable"), Value::Bool(true));
        tree.insert(path("services.files.settings.workgroup"), Value::from("HOME"));
        tree.insert(path("services.files.settings.security"), Value::Null);

        let artifacts = render_service_texts(&tree, &schema).unwrap();
        assert_eq!(artifacts[0].content, "workgroup = HOME\n");
    }

    #[test]
    fn test_extra_config_appended_after_settings() {
        let schema = files_schema();
        let mut tree = ResolvedTree::new();
        tree.insert(path("services.files.enable"), Value::Bool(true));
        tree.insert(path("services.files.settings.workgroup"), Value::from("HOME"));
        tree.insert(
            path("services.files.extra_config"),
            Value::from("min protocol = SMB2\nserver string = files"),
        );

        let artifacts = render_service_texts(&tree, &schema).unwrap();
        assert_eq!(
            artifacts[0].content,
            "workgroup = HOME\nmin protocol = SMB2\nserver string = files\n"
        );
    }

    #[test]
    fn test_empty_extra_config_is_omitted() {
        let schema = files_schema();
        let mut tree = ResolvedTree::new();
        tree.insert(path("services.files.enable"), Value::Bool(true));
        tree.insert(path("services.files.extra_config"), Value::from(""));

        let artifacts = render_service_texts(&tree, &schema).unwrap();
        assert_eq!(artifacts[0].content, "");
    }

    #[test]
    fn test_enabled_service_with_no_values_still_has_artifact() {
        let schema = files_schema();
        let mut tree = ResolvedTree::new();
        tree.insert(path("services.files.enable"), Value::Bool(true));

        let artifacts = render_service_texts(&tree, &schema).unwrap();
        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].content, "");
    }

    #[test]
    fn test_byte_identical_across_passes() {
        let schema = files_schema();
        let mut tree = ResolvedTree::new();
        tree.insert(path("services.files.enable"), Value::Bool(true));
        tree.insert(path("services.files.settings.workgroup"), Value::from("HOME"));
        tree.insert(path("services.files.settings.guest_ok"), Value::Bool(true));

        let first = render_service_texts(&tree, &schema).unwrap();
        let second = render_service_texts(&tree, &schema).unwrap();
        assert_eq!(first[0].content, second[0].content);
        assert_eq!(first[0].digest(), second[0].digest());
    }
}
