//! Shared fixtures for integration tests.
//!
//! Provides a representative schema (a file-sharing service with two
//! daemons plus a package build) and helpers for constructing fragments,
//! so individual tests read as scenarios rather than setup.

use strata::{
    register_build_options, register_service_daemon, register_service_options,
    register_service_setting, Fragment, KeyPath, OptionSchema, OptionType, Value,
};

/// Parse a key path, panicking on malformed test input.
pub fn path(s: &str) -> KeyPath {
    s.parse().unwrap()
}

/// A schema with the build options plus a "files" service running two
/// daemons, mirroring a small file-server deployment.
pub fn files_schema() -> OptionSchema {
    let mut schema = OptionSchema::new();
    register_build_options(&mut schema).unwrap();
    register_service_options(&mut schema, "files").unwrap();
    register_service_daemon(&mut schema, "files", "smbd").unwrap();
    register_service_daemon(&mut schema, "files", "nmbd").unwrap();
    register_service_setting(
        &mut schema,
        "files",
        "workgroup",
        OptionType::Str,
        "Workgroup name",
    )
    .unwrap();
    register_service_setting(
        &mut schema,
        "files",
        "guest_ok",
        OptionType::Bool,
        "Whether guests may connect",
    )
    .unwrap();
    schema
}

/// An unconditional fragment from a named source.
pub fn frag(source: &str, key: &str, value: Value) -> Fragment {
    Fragment::new(source, path(key), value)
}

/// The fragments that satisfy every mandatory build option.
pub fn build_fragments() -> Vec<Fragment> {
    vec![
        frag("site.yaml", "build.name", Value::from("samba")),
        frag("site.yaml", "build.version", Value::from("4.19.2")),
        frag(
            "site.yaml",
            "build.source.url",
            Value::from("https://example.org/samba-4.19.2.tar.gz"),
        ),
        frag("site.yaml", "build.source.checksum", Value::from("sha256:abc123")),
    ]
}

/// The fragments that enable the files service with both daemon commands.
pub fn service_fragments() -> Vec<Fragment> {
    vec![
        frag("site.yaml", "services.files.enable", Value::Bool(true)),
        frag(
            "site.yaml",
            "services.files.daemon.smbd.command",
            Value::from("/usr/sbin/smbd --foreground"),
        ),
        frag(
            "site.yaml",
            "services.files.daemon.nmbd.command",
            Value::from("/usr/sbin/nmbd --foreground"),
        ),
    ]
}
