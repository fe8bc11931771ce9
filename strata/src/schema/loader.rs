//! Loading option schemas from YAML files.
//!
//! A schema file declares options and assertions:
//!
//! ```yaml
//! options:
//!   - path: build.name
//!     type: str
//!     mandatory: true
//!     description: Name of the package to build
//!   - path: build.patches
//!     type: str-list
//!     strategy: list-append
//!     default: []
//! assertions:
//!   - message: TLS requires a certificate
//!     when:
//!       any:
//!         - not:
//!             truthy: services.files.settings.tls
//!         - truthy: services.files.settings.tls_cert
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::fragment::Guard;
use crate::schema::{OptionDecl, OptionSchema};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SchemaFile {
    #[serde(default)]
    options: Vec<OptionDecl>,
    #[serde(default)]
    assertions: Vec<AssertionEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct AssertionEntry {
    message: String,
    when: Guard,
}

/// Load a complete schema from a YAML file.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read, or [`Error::Schema`]
/// if it cannot be parsed or one of its declarations is invalid.
pub fn load_schema_file(path: &Path) -> Result<OptionSchema> {
    let mut schema = OptionSchema::new();
    extend_schema_from_file(&mut schema, path)?;
    Ok(schema)
}

/// Declare the options and assertions of a YAML file into an existing schema.
///
/// Useful when a schema combines programmatic declarations with file-based
/// ones; declarations are added in file order.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read, or [`Error::Schema`]
/// if it cannot be parsed, a declaration is invalid, or an assertion
/// references an undeclared option.
pub fn extend_schema_from_file(schema: &mut OptionSchema, path: &Path) -> Result<()> {
    let text = fs::read_to_string(path)?;
    let file: SchemaFile = serde_yaml::from_str(&text).map_err(|e| Error::Schema {
        detail: format!("{}: {e}", path.display()),
    })?;

    for decl in file.options {
        schema.declare(decl)?;
    }
    for entry in file.assertions {
        for referenced in entry.when.referenced_paths() {
            if !schema.contains(referenced) {
                return Err(Error::Schema {
                    detail: format!(
                        "{}: assertion '{}' references undeclared option '{referenced}'",
                        path.display(),
                        entry.message
                    ),
                });
            }
        }
        schema.declare_assertion(&entry.message, entry.when);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{MergeStrategy, OptionType};
    use crate::value::Value;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_schema(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_options() {
        let file = write_schema(
            "
options:
  - path: build.name
    type: str
    mandatory: true
    description: Name of the package to build
  - path: build.patches
    type: str-list
    strategy: list-append
    default: []
",
        );
        let schema = load_schema_file(file.path()).unwrap();

        assert_eq!(schema.len(), 2);
        let name = schema.get(&"build.name".parse().unwrap()).unwrap();
        assert!(name.mandatory);
        assert_eq!(name.ty, OptionType::Str);
        let patches = schema.get(&"build.patches".parse().unwrap()).unwrap();
        assert_eq!(patches.strategy, MergeStrategy::ListAppend);
        assert_eq!(patches.default, Some(Value::List(vec![])));
    }

    #[test]
    fn test_load_assertions() {
        let file = write_schema(
            "
options:
  - path: tls.enable
    type: bool
  - path: tls.cert
    type: str
assertions:
  - message: TLS requires a certificate
    when:
      any:
        - not:
            truthy: tls.enable
        - truthy: tls.cert
",
        );
        let schema = load_schema_file(file.path()).unwrap();
        assert_eq!(schema.assertions().len(), 1);
        assert_eq!(schema.assertions()[0].message, "TLS requires a certificate");
    }

    #[test]
    fn test_assertion_with_undeclared_path_fails() {
        let file = write_schema(
            "
options:
  - path: tls.enable
    type: bool
assertions:
  - message: broken
    when:
      truthy: tls.cret
",
        );
        let err = load_schema_file(file.path()).unwrap_err();
        assert!(format!("{err}").contains("undeclared option 'tls.cret'"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let file = write_schema(
            "
options: []
extra_section: true
",
        );
        let err = load_schema_file(file.path()).unwrap_err();
        assert!(format!("{err}").contains("schema error"));
    }

    #[test]
    fn test_invalid_declaration_rejected() {
        let file = write_schema(
            "
options:
  - path: build.name
    type: str
    strategy: bool-and
",
        );
        assert!(load_schema_file(file.path()).is_err());
    }

    #[test]
    fn test_extend_existing_schema() {
        let mut schema = OptionSchema::new();
        crate::schema::register_build_options(&mut schema).unwrap();
        let before = schema.len();

        let file = write_schema(
            "
options:
  - path: build.install_prefix
    type: str
    default: /usr
",
        );
        extend_schema_from_file(&mut schema, file.path()).unwrap();
        assert_eq!(schema.len(), before + 1);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_schema_file(Path::new("/nonexistent/schema.yaml")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
