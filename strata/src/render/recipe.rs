//! Deriving the build recipe from the resolved tree.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::merge::ResolvedTree;
use crate::render::{Artifact, ArtifactId, ArtifactKind};
use crate::schema::{KeyPath, OptionSchema};

/// Where the source archive comes from and how it is verified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpec {
    /// Download location of the archive.
    pub url: String,
    /// Expected checksum of the archive.
    pub checksum: String,
}

/// Everything the build backend needs to produce the package.
///
/// The recipe is a plain value derived entirely from the resolved tree;
/// rendering the same tree always yields the same recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildRecipe {
    /// Package name.
    pub name: String,
    /// Package version.
    pub version: String,
    /// Source archive location and checksum.
    pub source: SourceSpec,
    /// Patches applied in order.
    pub patches: Vec<String>,
    /// Configure flags, fragment contributions first, then the flags
    /// added by enabled optional features.
    pub configure_flags: Vec<String>,
    /// Dependency packages of enabled optional features.
    pub dependencies: BTreeSet<String>,
}

#[derive(Serialize)]
struct SecondarySpec<'a> {
    name: &'a str,
    version: &'a str,
    produced_by: &'a str,
    feature: &'a str,
}

fn require_str(tree: &ResolvedTree, path: &KeyPath) -> Result<String> {
    super::str_value(tree, path)
        .map(str::to_string)
        .ok_or_else(|| Error::Render {
            detail: format!("missing or non-string value at '{path}'"),
        })
}

fn optional_features(schema: &OptionSchema) -> Result<Vec<String>> {
    let prefix = KeyPath::parse("build.optional")?;
    let mut features = Vec::new();
    for decl in schema.options_under(&prefix) {
        let segments = decl.path.segments();
        if segments.len() == 4 && segments[3] == "enable" {
            features.push(segments[2].clone());
        }
    }
    Ok(features)
}

/// Derive the build recipe and its artifacts, if a build is configured.
///
/// Returns `None` when `build.name` carries no value. Enabled optional
/// features contribute their package as a dependency and a
/// `--with-<feature>` configure flag; features that also name an
/// artifact yield a secondary recipe artifact depending on the primary.
pub(crate) fn render_build(
    tree: &ResolvedTree,
    schema: &OptionSchema,
) -> Result<Option<(BuildRecipe, Vec<Artifact>)>> {
    let name_path = KeyPath::parse("build.name")?;
    let Some(name) = super::str_value(tree, &name_path).map(str::to_string) else {
        return Ok(None);
    };

    let version = require_str(tree, &KeyPath::parse("build.version")?)?;
    let url = require_str(tree, &KeyPath::parse("build.source.url")?)?;
    let checksum = require_str(tree, &KeyPath::parse("build.source.checksum")?)?;
    let patches = super::list_value(tree, &KeyPath::parse("build.patches")?);
    let mut configure_flags = super::list_value(tree, &KeyPath::parse("build.configure_flags")?);
    let mut dependencies = BTreeSet::new();

    let mut secondary = Vec::new();
    for feature in optional_features(schema)? {
        let enable = KeyPath::parse(&format!("build.optional.{feature}.enable"))?;
        if !super::bool_value(tree, &enable) {
            continue;
        }
        let package_path = KeyPath::parse(&format!("build.optional.{feature}.package"))?;
        let Some(package) = super::str_value(tree, &package_path) else {
            return Err(Error::Render {
                detail: format!("optional feature '{feature}' is enabled but names no package"),
            });
        };
        dependencies.insert(package.to_string());
        configure_flags.push(format!("--with-{feature}"));

        let artifact_path = KeyPath::parse(&format!("build.optional.{feature}.artifact"))?;
        if let Some(artifact_name) = super::str_value(tree, &artifact_path) {
            secondary.push((feature.clone(), artifact_name.to_string()));
        }
    }

    let recipe = BuildRecipe {
        name: name.clone(),
        version: version.clone(),
        source: SourceSpec { url, checksum },
        patches,
        configure_flags,
        dependencies,
    };

    let primary_id = ArtifactId::recipe(&name);
    let mut artifacts = vec![Artifact::new(
        primary_id.clone(),
        ArtifactKind::Recipe,
        serde_yaml::to_string(&recipe)?,
    )];
    for (feature, artifact_name) in secondary {
        let spec = SecondarySpec {
            name: &artifact_name,
            version: &version,
            produced_by: &name,
            feature: &feature,
        };
        artifacts.push(
            Artifact::new(
                ArtifactId::recipe(&artifact_name),
                ArtifactKind::Recipe,
                serde_yaml::to_string(&spec)?,
            )
            .with_dependency(primary_id.clone()),
        );
    }

    Ok(Some((recipe, artifacts)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{register_build_optional, register_build_options};
    use crate::value::Value;

    fn path(s: &str) -> KeyPath {
        s.parse().unwrap()
    }

    fn build_schema() -> OptionSchema {
        let mut schema = OptionSchema::new();
        register_build_options(&mut schema).unwrap();
        register_build_optional(&mut schema, "ldap").unwrap();
        schema
    }

    fn base_tree() -> ResolvedTree {
        let mut tree = ResolvedTree::new();
        tree.insert(path("build.name"), Value::from("samba"));
        tree.insert(path("build.version"), Value::from("4.19.2"));
        tree.insert(
            path("build.source.url"),
            Value::from("https://example.org/samba-4.19.2.tar.gz"),
        );
        tree.insert(path("build.source.checksum"), Value::from("abc123"));
        tree.insert(path("build.patches"), Value::from(vec!["fix-cve.patch"]));
        tree.insert(
            path("build.configure_flags"),
            Value::from(vec!["--enable-shared"]),
        );
        tree
    }

    #[test]
    fn test_no_build_configured() {
        let schema = build_schema();
        let result = render_build(&ResolvedTree::new(), &schema).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_basic_recipe() {
        let schema = build_schema();
        let (recipe, artifacts) = render_build(&base_tree(), &schema).unwrap().unwrap();

        assert_eq!(recipe.name, "samba");
        assert_eq!(recipe.version, "4.19.2");
        assert_eq!(recipe.source.checksum, "abc123");
        assert_eq!(recipe.patches, vec!["fix-cve.patch"]);
        assert_eq!(recipe.configure_flags, vec!["--enable-shared"]);
        assert!(recipe.dependencies.is_empty());

        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].id, ArtifactId::recipe("samba"));
        assert_eq!(artifacts[0].kind, ArtifactKind::Recipe);
        assert!(artifacts[0].content.contains("name: samba"));
    }

    #[test]
    fn test_disabled_optional_contributes_nothing() {
        let schema = build_schema();
        let mut tree = base_tree();
        tree.insert(path("build.optional.ldap.enable"), Value::Bool(false));
        tree.insert(path("build.optional.ldap.package"), Value::from("openldap"));

        let (recipe, artifacts) = render_build(&tree, &schema).unwrap().unwrap();
        assert!(recipe.dependencies.is_empty());
        assert_eq!(recipe.configure_flags, vec!["--enable-shared"]);
        assert_eq!(artifacts.len(), 1);
    }

    #[test]
    fn test_enabled_optional_adds_dependency_and_flag() {
        let schema = build_schema();
        let mut tree = base_tree();
        tree.insert(path("build.optional.ldap.enable"), Value::Bool(true));
        tree.insert(path("build.optional.ldap.package"), Value::from("openldap"));

        let (recipe, _) = render_build(&tree, &schema).unwrap().unwrap();
        assert!(recipe.dependencies.contains("openldap"));
        assert_eq!(
            recipe.configure_flags,
            vec!["--enable-shared", "--with-ldap"]
        );
    }

    #[test]
    fn test_enabled_optional_without_package_fails() {
        let schema = build_schema();
        let mut tree = base_tree();
        tree.insert(path("build.optional.ldap.enable"), Value::Bool(true));

        let err = render_build(&tree, &schema).unwrap_err();
        assert!(matches!(err, Error::Render { .. }));
        assert!(format!("{err}").contains("'ldap'"));
    }

    #[test]
    fn test_secondary_artifact_depends_on_primary() {
        let schema = build_schema();
        let mut tree = base_tree();
        tree.insert(path("build.optional.ldap.enable"), Value::Bool(true));
        tree.insert(path("build.optional.ldap.package"), Value::from("openldap"));
        tree.insert(
            path("build.optional.ldap.artifact"),
            Value::from("samba-ldap-module"),
        );

        let (_, artifacts) = render_build(&tree, &schema).unwrap().unwrap();
        assert_eq!(artifacts.len(), 2);
        let secondary = &artifacts[1];
        assert_eq!(secondary.id, ArtifactId::recipe("samba-ldap-module"));
        assert!(secondary.depends_on.contains(&ArtifactId::recipe("samba")));
        assert!(secondary.content.contains("produced_by: samba"));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let schema = build_schema();
        let mut tree = base_tree();
        tree.insert(path("build.optional.ldap.enable"), Value::Bool(true));
        tree.insert(path("build.optional.ldap.package"), Value::from("openldap"));

        let (first_recipe, first_artifacts) = render_build(&tree, &schema).unwrap().unwrap();
        let (second_recipe, second_artifacts) = render_build(&tree, &schema).unwrap().unwrap();
        assert_eq!(first_recipe, second_recipe);
        assert_eq!(first_artifacts, second_artifacts);
    }

    #[test]
    fn test_missing_version_is_render_error() {
        let schema = build_schema();
        let mut tree = ResolvedTree::new();
        tree.insert(path("build.name"), Value::from("samba"));

        let err = render_build(&tree, &schema).unwrap_err();
        assert!(format!("{err}").contains("build.version"));
    }
}
