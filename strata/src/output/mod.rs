//! Output formatting for evaluation results.
//!
//! This module provides the output formats in which resolved trees,
//! violation lists, activation plans, and option listings are presented:
//! human-readable text, JSON, and YAML. Every formatter produces
//! deterministic output, since everything it formats iterates in a
//! defined order.

mod formatters;

use crate::activation::ActivationPlan;
use crate::error::Result;
use crate::merge::ResolvedTree;
use crate::schema::OptionSchema;
use crate::validate::Violation;

pub use formatters::{HumanFormatter, JsonFormatter, YamlFormatter};

/// Trait for formatting evaluation results into different output formats.
pub trait OutputFormatter {
    /// Format a resolved configuration tree.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn format_tree(&self, tree: &ResolvedTree) -> Result<String>;

    /// Format a list of validation violations.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn format_violations(&self, violations: &[Violation]) -> Result<String>;

    /// Format an activation plan.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn format_plan(&self, plan: &ActivationPlan) -> Result<String>;

    /// Format the declared options of a schema.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn format_options(&self, schema: &OptionSchema) -> Result<String>;
}

/// Available output formats for evaluation results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable format.
    Human,
    /// JSON format.
    Json,
    /// YAML format.
    Yaml,
}

impl OutputFormat {
    /// Parses an output format from a string.
    ///
    /// Recognizes: "human", "json", "yaml" (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not recognized.
    pub fn parse(s: &str) -> std::result::Result<Self, String> {
        match s.to_lowercase().as_str() {
            "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            "yaml" => Ok(Self::Yaml),
            _ => Err(format!("invalid output format: {s}")),
        }
    }

    /// Create a formatter for this output format.
    #[must_use]
    pub fn create_formatter(&self) -> Box<dyn OutputFormatter> {
        match self {
            Self::Human => Box::new(HumanFormatter),
            Self::Json => Box::new(JsonFormatter),
            Self::Yaml => Box::new(YamlFormatter),
        }
    }
}
