//! Option schema: the declared universe of configuration keys.
//!
//! A schema is built up front, either programmatically (see the
//! `register_*` helpers) or from YAML files, and then treated as read-only
//! by the rest of the pipeline. Fragments and guards may only reference
//! declared paths.

mod loader;
mod option;
mod path;
mod presets;
mod registry;

pub use loader::{extend_schema_from_file, load_schema_file};
pub use option::{MergeStrategy, OptionDecl, OptionType};
pub use path::{InvalidKeyPathError, KeyPath};
pub use presets::{
    register_build_optional, register_build_options, register_service_daemon,
    register_service_options, register_service_setting,
};
pub use registry::{Assertion, OptionSchema};
