//! The option schema: the closed set of declared keys and assertions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::fragment::Guard;
use crate::schema::{KeyPath, OptionDecl};

/// A cross-option requirement checked against the resolved tree.
///
/// Assertions reuse the guard expression language of conditional
/// fragments; a failing assertion surfaces as a validation violation
/// carrying `message`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assertion {
    /// The violation message reported when the condition is false.
    pub message: String,
    /// The condition that must hold on the resolved tree.
    pub condition: Guard,
}

/// The complete set of declared options and assertions for one evaluation.
///
/// Every fragment path and guard path must name a declared option; anything
/// else is rejected as an unknown key. Declaration order is preserved and
/// drives the section order of rendered text artifacts.
///
/// # Examples
///
/// ```
/// use strata::{MergeStrategy, OptionDecl, OptionSchema, OptionType};
///
/// let mut schema = OptionSchema::new();
/// schema
///     .declare(OptionDecl::new(
///         "build.name".parse().unwrap(),
///         OptionType::Str,
///         MergeStrategy::Override,
///         "Name of the package to build",
///     ))
///     .unwrap();
/// assert!(schema.contains(&"build.name".parse().unwrap()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct OptionSchema {
    options: Vec<OptionDecl>,
    index: BTreeMap<KeyPath, usize>,
    assertions: Vec<Assertion>,
}

impl OptionSchema {
    /// Create an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare one option.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] if the path is already declared, the merge
    /// strategy cannot combine values of the declared type, or the default
    /// value does not match the declared type.
    pub fn declare(&mut self, decl: OptionDecl) -> Result<()> {
        if self.index.contains_key(&decl.path) {
            return Err(Error::Schema {
                detail: format!("duplicate option '{}'", decl.path),
            });
        }
        if !decl.strategy.compatible_with(&decl.ty) {
            return Err(Error::Schema {
                detail: format!(
                    "strategy {} cannot combine values of type {} (option '{}')",
                    decl.strategy, decl.ty, decl.path
                ),
            });
        }
        if let Some(default) = &decl.default {
            if !decl.ty.matches(default) {
                return Err(Error::Schema {
                    detail: format!(
                        "default for '{}' is {}, expected {}",
                        decl.path,
                        default.type_name(),
                        decl.ty
                    ),
                });
            }
        }
        self.index.insert(decl.path.clone(), self.options.len());
        self.options.push(decl);
        Ok(())
    }

    /// Add a cross-option assertion checked during validation.
    pub fn declare_assertion(&mut self, message: &str, condition: Guard) {
        self.assertions.push(Assertion {
            message: message.to_string(),
            condition,
        });
    }

    /// Look up the declaration for a path.
    #[must_use]
    pub fn get(&self, path: &KeyPath) -> Option<&OptionDecl> {
        self.index.get(path).map(|i| &self.options[*i])
    }

    /// Check whether a path is declared.
    #[must_use]
    pub fn contains(&self, path: &KeyPath) -> bool {
        self.index.contains_key(path)
    }

    /// All declarations, in declaration order.
    #[must_use]
    pub fn options(&self) -> &[OptionDecl] {
        &self.options
    }

    /// Declarations whose paths start with `prefix`, in declaration order.
    pub fn options_under<'a>(
        &'a self,
        prefix: &'a KeyPath,
    ) -> impl Iterator<Item = &'a OptionDecl> {
        self.options
            .iter()
            .filter(move |decl| decl.path.starts_with(prefix))
    }

    /// All assertions, in declaration order.
    #[must_use]
    pub fn assertions(&self) -> &[Assertion] {
        &self.assertions
    }

    /// The number of declared options.
    #[must_use]
    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// Check whether no options are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{MergeStrategy, OptionType};
    use crate::value::Value;

    fn path(s: &str) -> KeyPath {
        s.parse().unwrap()
    }

    fn str_decl(p: &str) -> OptionDecl {
        OptionDecl::new(path(p), OptionType::Str, MergeStrategy::Override, "")
    }

    #[test]
    fn test_declare_and_get() {
        let mut schema = OptionSchema::new();
        schema.declare(str_decl("build.name")).unwrap();

        assert!(schema.contains(&path("build.name")));
        assert!(!schema.contains(&path("build.version")));
        let decl = schema.get(&path("build.name")).unwrap();
        assert_eq!(decl.ty, OptionType::Str);
        assert_eq!(schema.len(), 1);
        assert!(!schema.is_empty());
    }

    #[test]
    fn test_declare_rejects_duplicate() {
        let mut schema = OptionSchema::new();
        schema.declare(str_decl("build.name")).unwrap();
        let err = schema.declare(str_decl("build.name")).unwrap_err();
        assert!(format!("{err}").contains("duplicate option 'build.name'"));
    }

    #[test]
    fn test_declare_rejects_incompatible_strategy() {
        let mut schema = OptionSchema::new();
        let decl = OptionDecl::new(
            path("build.name"),
            OptionType::Str,
            MergeStrategy::ListAppend,
            "",
        );
        let err = schema.declare(decl).unwrap_err();
        assert!(format!("{err}").contains("list-append"));
    }

    #[test]
    fn test_declare_rejects_mismatched_default() {
        let mut schema = OptionSchema::new();
        let decl = OptionDecl::new(
            path("services.files.enable"),
            OptionType::Bool,
            MergeStrategy::BoolOr,
            "",
        )
        .with_default(Value::from("yes"));
        let err = schema.declare(decl).unwrap_err();
        assert!(format!("{err}").contains("expected bool"));
    }

    #[test]
    fn test_declaration_order_preserved() {
        let mut schema = OptionSchema::new();
        schema.declare(str_decl("zeta")).unwrap();
        schema.declare(str_decl("alpha")).unwrap();
        schema.declare(str_decl("mu")).unwrap();

        let order: Vec<String> = schema
            .options()
            .iter()
            .map(|d| d.path.to_string())
            .collect();
        assert_eq!(order, vec!["zeta", "alpha", "mu"]);
    }

    #[test]
    fn test_options_under_prefix() {
        let mut schema = OptionSchema::new();
        schema.declare(str_decl("services.files.settings.workgroup")).unwrap();
        schema.declare(str_decl("build.name")).unwrap();
        schema.declare(str_decl("services.files.settings.security")).unwrap();

        let prefix = path("services.files.settings");
        let under: Vec<String> = schema
            .options_under(&prefix)
            .map(|d| d.path.to_string())
            .collect();
        assert_eq!(
            under,
            vec![
                "services.files.settings.workgroup",
                "services.files.settings.security"
            ]
        );
    }

    #[test]
    fn test_assertions() {
        let mut schema = OptionSchema::new();
        schema.declare(str_decl("tls.cert")).unwrap();
        schema.declare_assertion(
            "TLS requires a certificate",
            Guard::Truthy(path("tls.cert")),
        );
        assert_eq!(schema.assertions().len(), 1);
        assert_eq!(schema.assertions()[0].message, "TLS requires a certificate");
    }
}
