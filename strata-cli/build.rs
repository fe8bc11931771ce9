//! Build script for strata-cli.
//!
//! This script generates man pages at build time using clap_mangen.
//! The generated man page is placed in OUT_DIR for inclusion in release builds.
//!
//! Note: We build a minimal command structure here rather than importing from
//! the main crate, since build scripts cannot depend on the crate being built.

use clap::{Arg, Command};
use clap_mangen::Man;
use std::fs;
use std::path::PathBuf;

/// Build the CLI command structure for man page generation.
///
/// IMPORTANT: Keep this structure synchronized with src/cli.rs
/// When adding/removing/modifying commands, update both files.
fn build_cli() -> Command {
    Command::new("strata")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Compose declarative configuration into build and service artifacts")
        .long_about(
            "Command-line tool composing schema-checked configuration fragments into \
             deterministic build and service artifacts",
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .help("Enable verbose output")
                .global(true)
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .help("Suppress non-essential output")
                .global(true)
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("schema")
                .long("schema")
                .help("Schema file declaring the option set")
                .value_name("PATH")
                .global(true)
                .env("STRATA_SCHEMA"),
        )
        .arg(
            Arg::new("state-file")
                .long("state-file")
                .help("Where the applied system state is persisted")
                .value_name("PATH")
                .global(true)
                .env("STRATA_STATE_FILE"),
        )
        .subcommands(vec![
            Command::new("eval")
                .about("Evaluate fragments and print the resolved configuration")
                .long_about("Merge fragment sources against the schema and print the resolved tree"),
            Command::new("check")
                .about("Validate fragments without printing the configuration")
                .long_about("Evaluate and validate the configuration, reporting every violation"),
            Command::new("render")
                .about("Render artifacts from the resolved configuration")
                .long_about("Derive build recipes, configuration texts, and unit files"),
            Command::new("plan")
                .about("Show the activation plan against the recorded state")
                .long_about("Compute the actions that would bring the system in line with the configuration"),
            Command::new("apply")
                .about("Apply the activation plan and record the new state")
                .long_about("Execute the activation plan and persist the resulting system state"),
            Command::new("options")
                .about("List the options declared by the schema")
                .long_about("Display every declared option with its type, strategy, and defaults"),
            Command::new("completions")
                .about("Generate shell completion scripts")
                .long_about("Generate shell completion scripts for bash, zsh, fish, or PowerShell"),
        ])
}

fn main() {
    // Generate man pages at build time
    let out_dir = PathBuf::from(std::env::var("OUT_DIR").unwrap());
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir).unwrap();

    // Generate main strata.1 man page
    let app = build_cli();
    let man = Man::new(app);
    let mut buffer = Vec::new();
    man.render(&mut buffer).unwrap();

    fs::write(man_dir.join("strata.1"), buffer).unwrap();

    println!("cargo:rerun-if-changed=src/cli.rs");
    println!("cargo:rerun-if-changed=src/commands/");
}
