//! Output formatter implementations.

use serde::Serialize;

use crate::activation::ActivationPlan;
use crate::error::Result;
use crate::merge::ResolvedTree;
use crate::schema::OptionSchema;
use crate::validate::Violation;

use super::OutputFormatter;

/// Human-readable output formatter.
pub struct HumanFormatter;

impl OutputFormatter for HumanFormatter {
    fn format_tree(&self, tree: &ResolvedTree) -> Result<String> {
        let mut out = String::new();
        for (path, value) in tree.iter() {
            out.push_str(&format!("{path} = {value}\n"));
        }
        Ok(out)
    }

    fn format_violations(&self, violations: &[Violation]) -> Result<String> {
        let mut out = String::new();
        for violation in violations {
            out.push_str(&format!("{violation}\n"));
        }
        Ok(out)
    }

    fn format_plan(&self, plan: &ActivationPlan) -> Result<String> {
        if plan.is_empty() {
            return Ok("Nothing to do\n".to_string());
        }
        let mut out = String::new();
        for description in plan.descriptions() {
            out.push_str(&description);
            out.push('\n');
        }
        Ok(out)
    }

    fn format_options(&self, schema: &OptionSchema) -> Result<String> {
        let mut out = String::new();
        for decl in schema.options() {
            out.push_str(&format!("{} ({}, {})", decl.path, decl.ty, decl.strategy));
            if decl.mandatory {
                out.push_str(" [mandatory]");
            }
            if let Some(default) = &decl.default {
                out.push_str(&format!(" [default: {default}]"));
            }
            out.push('\n');
            if !decl.description.is_empty() {
                out.push_str(&format!("    {}\n", decl.description));
            }
            if let Some(example) = &decl.example {
                out.push_str(&format!("    example: {example}\n"));
            }
        }
        Ok(out)
    }
}

/// Wrapper giving the serialized option listing a stable top-level key.
#[derive(Serialize)]
struct OptionListing<'a> {
    options: &'a [crate::schema::OptionDecl],
}

/// JSON output formatter.
pub struct JsonFormatter;

impl JsonFormatter {
    fn serialize<T: Serialize>(value: &T) -> Result<String> {
        serde_json::to_string_pretty(value).map_err(|e| crate::Error::Render {
            detail: format!("JSON serialization failed: {e}"),
        })
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_tree(&self, tree: &ResolvedTree) -> Result<String> {
        Self::serialize(tree)
    }

    fn format_violations(&self, violations: &[Violation]) -> Result<String> {
        Self::serialize(&violations)
    }

    fn format_plan(&self, plan: &ActivationPlan) -> Result<String> {
        Self::serialize(&plan.actions)
    }

    fn format_options(&self, schema: &OptionSchema) -> Result<String> {
        Self::serialize(&OptionListing {
            options: schema.options(),
        })
    }
}

/// YAML output formatter.
pub struct YamlFormatter;

impl OutputFormatter for YamlFormatter {
    fn format_tree(&self, tree: &ResolvedTree) -> Result<String> {
        Ok(serde_yaml::to_string(tree)?)
    }

    fn format_violations(&self, violations: &[Violation]) -> Result<String> {
        Ok(serde_yaml::to_string(violations)?)
    }

    fn format_plan(&self, plan: &ActivationPlan) -> Result<String> {
        Ok(serde_yaml::to_string(&plan.actions)?)
    }

    fn format_options(&self, schema: &OptionSchema) -> Result<String> {
        Ok(serde_yaml::to_string(&OptionListing {
            options: schema.options(),
        })?)
    }
}
