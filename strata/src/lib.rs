#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # strata
//!
//! A library for composing system configurations from declarative fragments.
//!
//! Configuration is described as flat key paths declared in an
//! [`OptionSchema`], contributed by [`Fragment`]s from files, the
//! environment, and the command line, merged per-key by declared
//! strategy, validated exhaustively, and rendered into deterministic
//! artifacts that an activation plan brings onto the system.
//!
//! ## Core Types
//!
//! - [`OptionSchema`] and [`OptionDecl`]: the closed set of declared keys
//! - [`Fragment`] and [`FragmentStore`]: configuration contributions
//! - [`EvaluationPass`]: the merge, validate, and render pipeline
//! - [`ActivationPlanner`] and [`PlanExecutor`]: unit plan and execution
//! - [`Error`] and [`Result`]: error handling types
//!
//! ## Examples
//!
//! ```
//! use strata::{
//!     EvaluationPass, Fragment, MergeStrategy, OptionDecl, OptionSchema, OptionType, Value,
//! };
//!
//! let mut schema = OptionSchema::new();
//! schema
//!     .declare(OptionDecl::new(
//!         "service.smb.workgroup".parse().unwrap(),
//!         OptionType::Str,
//!         MergeStrategy::Override,
//!         "NetBIOS workgroup name",
//!     ))
//!     .unwrap();
//!
//! let mut pass = EvaluationPass::new(schema);
//! pass.submit(Fragment::new(
//!     "site.yaml",
//!     "service.smb.workgroup".parse().unwrap(),
//!     Value::Str("HOME".to_string()),
//! ));
//!
//! let output = pass.run().unwrap();
//! assert_eq!(
//!     output.tree.get(&"service.smb.workgroup".parse().unwrap()),
//!     Some(&Value::Str("HOME".to_string())),
//! );
//! ```

pub mod activation;
pub mod backend;
pub mod conditional;
pub mod error;
pub mod fragment;
pub mod logging;
pub mod merge;
pub mod output;
pub mod pipeline;
pub mod render;
pub mod schema;
pub mod validate;
pub mod value;

// Re-export key types at crate root for convenience
pub use activation::{
    Action, ActivationPlan, ActivationPlanner, ExecutionResult, PlanExecutor, UnitGraph,
};
pub use backend::{
    BuildBackend, BuildOutcome, InMemoryBuildBackend, InMemoryServiceBackend, ServiceBackend,
    SystemState,
};
pub use conditional::{ConditionalEvaluator, EvaluationOutcome};
pub use error::{Error, Result};
pub use fragment::{
    environment_fragments, load_fragment_dir, load_fragment_file, user_fragment_dir, Fragment,
    FragmentStore, Guard, DEFAULT_PRIORITY, ENV_PREFIX, ENV_PRIORITY,
};
pub use logging::{init_logger, LogLevel, Logger};
pub use merge::{MergeEngine, MergeOutcome, ResolvedTree};
pub use output::{OutputFormat, OutputFormatter};
pub use pipeline::{EvaluationPass, PassOutput};
pub use render::{
    Artifact, ArtifactId, ArtifactKind, BuildRecipe, RenderOutput, Renderer, SourceSpec,
    UnitDescriptor,
};
pub use schema::{
    extend_schema_from_file, load_schema_file, register_build_optional, register_build_options,
    register_service_daemon, register_service_options, register_service_setting, Assertion,
    InvalidKeyPathError, KeyPath, MergeStrategy, OptionDecl, OptionSchema, OptionType,
};
pub use validate::{Validator, Violation};
pub use value::Value;
