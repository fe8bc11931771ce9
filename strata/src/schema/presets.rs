//! Canonical option layouts for package builds and managed services.
//!
//! Embedding applications call these helpers instead of spelling out the
//! well-known key paths by hand. Each helper declares a coherent group of
//! options, with merge strategies and defaults matching how the renderers
//! consume them.

use crate::error::Result;
use crate::fragment::Guard;
use crate::schema::{KeyPath, MergeStrategy, OptionDecl, OptionSchema, OptionType};
use crate::value::Value;

/// Declare the core build options.
///
/// Adds `build.name`, `build.version`, `build.source.url`,
/// `build.source.checksum`, `build.patches`, and `build.configure_flags`.
/// The first four are mandatory; the two lists accumulate across fragments.
///
/// # Errors
///
/// Returns [`crate::Error::Schema`] if any of the paths is already declared.
pub fn register_build_options(schema: &mut OptionSchema) -> Result<()> {
    schema.declare(
        OptionDecl::new(
            KeyPath::parse("build.name")?,
            OptionType::Str,
            MergeStrategy::Override,
            "Name of the package to build",
        )
        .with_mandatory()
        .with_example("samba"),
    )?;
    schema.declare(
        OptionDecl::new(
            KeyPath::parse("build.version")?,
            OptionType::Str,
            MergeStrategy::Override,
            "Version of the package to build",
        )
        .with_mandatory()
        .with_example("4.19.2"),
    )?;
    schema.declare(
        OptionDecl::new(
            KeyPath::parse("build.source.url")?,
            OptionType::Str,
            MergeStrategy::Override,
            "Download location of the source archive",
        )
        .with_mandatory(),
    )?;
    schema.declare(
        OptionDecl::new(
            KeyPath::parse("build.source.checksum")?,
            OptionType::Str,
            MergeStrategy::Override,
            "Expected checksum of the source archive",
        )
        .with_mandatory(),
    )?;
    schema.declare(
        OptionDecl::new(
            KeyPath::parse("build.patches")?,
            OptionType::StrList,
            MergeStrategy::ListAppend,
            "Patch files applied to the source, in submission order",
        )
        .with_default(Value::List(vec![])),
    )?;
    schema.declare(
        OptionDecl::new(
            KeyPath::parse("build.configure_flags")?,
            OptionType::StrList,
            MergeStrategy::ListAppend,
            "Flags passed to the configure step, in submission order",
        )
        .with_default(Value::List(vec![])),
    )?;
    Ok(())
}

/// Declare an optional build feature.
///
/// Adds `build.optional.<feature>.enable` (defaults to false, any fragment
/// can switch it on), `.package` (the dependency pulled in when enabled),
/// and `.artifact` (an optional secondary artifact produced when enabled).
/// Also asserts that an enabled feature names a package.
///
/// # Errors
///
/// Returns [`crate::Error::Schema`] if the feature is already declared or
/// its name is not a valid path segment.
pub fn register_build_optional(schema: &mut OptionSchema, feature: &str) -> Result<()> {
    let enable = KeyPath::parse(&format!("build.optional.{feature}.enable"))?;
    let package = KeyPath::parse(&format!("build.optional.{feature}.package"))?;
    let artifact = KeyPath::parse(&format!("build.optional.{feature}.artifact"))?;
    schema.declare(
        OptionDecl::new(
            enable.clone(),
            OptionType::Bool,
            MergeStrategy::BoolOr,
            "Whether the optional feature is built",
        )
        .with_default(Value::Bool(false)),
    )?;
    schema.declare(OptionDecl::new(
        package.clone(),
        OptionType::Nullable(Box::new(OptionType::PackageRef)),
        MergeStrategy::Override,
        "Dependency package pulled in when the feature is enabled",
    ))?;
    schema.declare(OptionDecl::new(
        artifact,
        OptionType::Nullable(Box::new(OptionType::Str)),
        MergeStrategy::Override,
        "Name of a secondary artifact produced when the feature is enabled",
    ))?;
    schema.declare_assertion(
        &format!("optional feature '{feature}' is enabled but names no package"),
        Guard::Any(vec![
            Guard::Not(Box::new(Guard::Truthy(enable))),
            Guard::Truthy(package),
        ]),
    );
    Ok(())
}

/// Declare the skeleton options of a managed service.
///
/// Adds `services.<name>.enable` (defaults to false), `.extra_config`
/// (newline-concatenated raw configuration text), and `.state_dirs`
/// (directories created by the setup unit before any daemon starts).
/// Per-setting keys under `services.<name>.settings.` are declared
/// separately with [`register_service_setting`].
///
/// # Errors
///
/// Returns [`crate::Error::Schema`] if the service is already declared or
/// its name is not a valid path segment.
pub fn register_service_options(schema: &mut OptionSchema, service: &str) -> Result<()> {
    schema.declare(
        OptionDecl::new(
            KeyPath::parse(&format!("services.{service}.enable"))?,
            OptionType::Bool,
            MergeStrategy::BoolOr,
            "Whether the service runs on this machine",
        )
        .with_default(Value::Bool(false)),
    )?;
    schema.declare(
        OptionDecl::new(
            KeyPath::parse(&format!("services.{service}.extra_config"))?,
            OptionType::Str,
            MergeStrategy::Concat,
            "Raw configuration text appended after the rendered settings",
        )
        .with_default(Value::from("")),
    )?;
    schema.declare(
        OptionDecl::new(
            KeyPath::parse(&format!("services.{service}.state_dirs"))?,
            OptionType::StrList,
            MergeStrategy::ListAppend,
            "State directories created before the service starts",
        )
        .with_default(Value::List(vec![])),
    )?;
    Ok(())
}

/// Declare one rendered setting of a managed service.
///
/// Settings appear in the service's configuration text in declaration
/// order, so call this in the order the sections should be rendered.
///
/// # Errors
///
/// Returns [`crate::Error::Schema`] if the setting is already declared or
/// the key is not a valid path segment.
pub fn register_service_setting(
    schema: &mut OptionSchema,
    service: &str,
    key: &str,
    ty: OptionType,
    description: &str,
) -> Result<()> {
    schema.declare(OptionDecl::new(
        KeyPath::parse(&format!("services.{service}.settings.{key}"))?,
        ty,
        MergeStrategy::Override,
        description,
    ))
}

/// Declare a daemon process of a managed service.
///
/// Adds `services.<service>.daemon.<daemon>.command` and `.reload`, and
/// asserts that the daemon has a command whenever the service is enabled.
///
/// # Errors
///
/// Returns [`crate::Error::Schema`] if the daemon is already declared or
/// its name is not a valid path segment.
pub fn register_service_daemon(
    schema: &mut OptionSchema,
    service: &str,
    daemon: &str,
) -> Result<()> {
    let command = KeyPath::parse(&format!("services.{service}.daemon.{daemon}.command"))?;
    schema.declare(OptionDecl::new(
        command.clone(),
        OptionType::Str,
        MergeStrategy::Override,
        "Command line that starts the daemon",
    ))?;
    schema.declare(OptionDecl::new(
        KeyPath::parse(&format!("services.{service}.daemon.{daemon}.reload"))?,
        OptionType::Nullable(Box::new(OptionType::Str)),
        MergeStrategy::Override,
        "Command line that reloads the daemon without a restart",
    ))?;
    schema.declare_assertion(
        &format!("daemon '{daemon}' of service '{service}' has no command"),
        Guard::Any(vec![
            Guard::Not(Box::new(Guard::Truthy(KeyPath::parse(&format!(
                "services.{service}.enable"
            ))?))),
            Guard::Truthy(command),
        ]),
    );
    Ok(())
}
