//! Integration tests for the strata CLI.
//!
//! These tests verify that the CLI binary behaves correctly, including
//! argument parsing, help text, exit codes, and the end-to-end flow from
//! schema and fragment files through eval, check, plan, and apply.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const SCHEMA_YAML: &str = "\
options:
  - path: build.name
    type: str
    mandatory: true
    description: Name of the package to build
  - path: build.version
    type: str
    mandatory: true
  - path: build.source.url
    type: str
    mandatory: true
  - path: build.source.checksum
    type: str
    mandatory: true
  - path: build.patches
    type: str-list
    strategy: list-append
    default: []
  - path: services.files.enable
    type: bool
    strategy: bool-or
    default: false
  - path: services.files.extra_config
    type: str
    strategy: concat
    default: ''
  - path: services.files.state_dirs
    type: str-list
    strategy: list-append
    default: []
  - path: services.files.settings.workgroup
    type: str
  - path: services.files.daemon.smbd.command
    type: str
  - path: services.files.daemon.smbd.reload
    type:
      nullable: str
";

const SITE_YAML: &str = "\
set:
  build.name: samba
  build.version: 4.19.2
  build.source.url: https://example.org/samba-4.19.2.tar.gz
  build.source.checksum: sha256:abc123
  services.files.enable: true
  services.files.daemon.smbd.command: /usr/sbin/smbd --foreground
";

/// Fixture: a schema file, a fragment file, and a state file path inside
/// one temporary directory.
struct Workspace {
    dir: TempDir,
    schema: PathBuf,
    site: PathBuf,
    state: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let schema = write(dir.path(), "schema.yaml", SCHEMA_YAML);
        let site = write(dir.path(), "site.yaml", SITE_YAML);
        let state = dir.path().join("state.yaml");
        Self {
            dir,
            schema,
            site,
            state,
        }
    }

    /// A strata command wired to this workspace, with the environment
    /// and per-user fragment sources disabled for hermetic runs.
    fn cmd(&self, subcommand: &str) -> Command {
        let mut cmd = strata_cmd();
        cmd.args([
            "--schema",
            self.schema.to_str().unwrap(),
            "--state-file",
            self.state.to_str().unwrap(),
            subcommand,
        ]);
        if subcommand != "options" && subcommand != "completions" {
            cmd.args([
                "--fragment",
                self.site.to_str().unwrap(),
                "--no-env",
                "--no-user-fragments",
            ]);
        }
        cmd
    }
}

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("failed to write fixture");
    path
}

fn strata_cmd() -> Command {
    let mut cmd = Command::cargo_bin("strata").expect("Failed to find strata binary");
    cmd.env_remove("STRATA_SCHEMA");
    cmd.env_remove("STRATA_STATE_FILE");
    cmd
}

// =============================================================================
// Argument Parsing
// =============================================================================

/// Test that the binary runs without arguments and displays help/error.
#[test]
fn test_cli_no_arguments() {
    strata_cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}

/// Test that the --version flag displays version information.
#[test]
fn test_cli_version_flag() {
    strata_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("strata"))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

/// Test that the --help flag displays help text with all subcommands.
#[test]
fn test_cli_help_lists_subcommands() {
    strata_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("eval"))
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("render"))
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("apply"));
}

/// Test that an unknown subcommand fails.
#[test]
fn test_cli_unknown_subcommand() {
    strata_cmd().arg("frobnicate").assert().failure();
}

/// Test that a missing schema is a configuration error (exit code 7).
#[test]
fn test_eval_without_schema_exits_config_error() {
    strata_cmd()
        .args(["eval", "--no-env", "--no-user-fragments"])
        .assert()
        .failure()
        .code(7)
        .stderr(predicate::str::contains("schema"));
}

/// Test that a malformed --set assignment is an argument error (exit code 4).
#[test]
fn test_malformed_set_exits_invalid_arguments() {
    let ws = Workspace::new();
    ws.cmd("eval")
        .args(["--set", "build.name"])
        .assert()
        .failure()
        .code(4);
}

// =============================================================================
// Eval and Check
// =============================================================================

#[test]
fn test_eval_prints_resolved_tree() {
    let ws = Workspace::new();
    ws.cmd("eval")
        .assert()
        .success()
        .stdout(predicate::str::contains("build.name = samba"))
        .stdout(predicate::str::contains("services.files.enable = true"));
}

#[test]
fn test_eval_json_output_parses() {
    let ws = Workspace::new();
    let output = ws.cmd("eval").args(["--format", "json"]).output().unwrap();
    assert!(output.status.success());

    let tree: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(tree["build.name"], serde_json::json!("samba"));
}

#[test]
fn test_set_overrides_file_value() {
    let ws = Workspace::new();
    ws.cmd("eval")
        .args(["--set", "build.name=overridden"])
        .assert()
        .success()
        .stdout(predicate::str::contains("build.name = overridden"));
}

#[test]
fn test_check_succeeds_on_valid_configuration() {
    let ws = Workspace::new();
    ws.cmd("check").assert().success();
}

#[test]
fn test_check_reports_violations_and_exits_one() {
    let ws = Workspace::new();
    let incomplete = write(ws.dir.path(), "incomplete.yaml", "set:\n  build.name: samba\n");

    strata_cmd()
        .args([
            "--schema",
            ws.schema.to_str().unwrap(),
            "check",
            "--fragment",
            incomplete.to_str().unwrap(),
            "--no-env",
            "--no-user-fragments",
        ])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("build.version"))
        .stderr(predicate::str::contains("build.source.url"));
}

#[test]
fn test_unknown_key_in_fragment_is_config_error() {
    let ws = Workspace::new();
    let typo = write(ws.dir.path(), "typo.yaml", "set:\n  build.nmae: samba\n");

    strata_cmd()
        .args([
            "--schema",
            ws.schema.to_str().unwrap(),
            "check",
            "--fragment",
            typo.to_str().unwrap(),
            "--no-env",
            "--no-user-fragments",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("build.nmae"));
}

// =============================================================================
// Render
// =============================================================================

#[test]
fn test_render_lists_artifacts_with_digests() {
    let ws = Workspace::new();
    ws.cmd("render")
        .assert()
        .success()
        .stdout(predicate::str::contains("recipe/samba"))
        .stdout(predicate::str::contains("text/files"))
        .stdout(predicate::str::contains("unit/smbd.service"));
}

#[test]
fn test_render_single_artifact_prints_content() {
    let ws = Workspace::new();
    ws.cmd("render")
        .args(["--artifact", "unit/smbd.service"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ExecStart=/usr/sbin/smbd --foreground"));
}

#[test]
fn test_render_output_dir_writes_files() {
    let ws = Workspace::new();
    let out_dir = ws.dir.path().join("rendered");

    ws.cmd("render")
        .args(["--output-dir", out_dir.to_str().unwrap()])
        .assert()
        .success();

    assert!(out_dir.join("unit").join("smbd.service").exists());
    assert!(out_dir.join("text").join("files").exists());
}

// =============================================================================
// Plan and Apply
// =============================================================================

#[test]
fn test_plan_against_empty_state_starts_everything() {
    let ws = Workspace::new();
    ws.cmd("plan")
        .assert()
        .success()
        .stdout(predicate::str::contains("Start files-setup.service"))
        .stdout(predicate::str::contains("Start smbd.service"));
}

#[test]
fn test_apply_dry_run_leaves_no_state_file() {
    let ws = Workspace::new();
    ws.cmd("apply")
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("would apply: Start smbd.service"));

    assert!(!ws.state.exists(), "dry run must not persist state");
}

#[test]
fn test_apply_then_plan_is_all_noop() {
    let ws = Workspace::new();
    ws.cmd("apply")
        .assert()
        .success()
        .stdout(predicate::str::contains("Start smbd.service"));
    assert!(ws.state.exists(), "apply must persist state");

    ws.cmd("plan")
        .assert()
        .success()
        .stdout(predicate::str::contains("Keep smbd.service (unchanged)"))
        .stdout(predicate::str::contains("Keep files-setup.service (unchanged)"));
}

#[test]
fn test_changed_setting_restarts_daemon_on_next_plan() {
    let ws = Workspace::new();
    ws.cmd("apply").assert().success();

    ws.cmd("plan")
        .args(["--set", "services.files.settings.workgroup=OFFICE"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Restart smbd.service"));
}

// =============================================================================
// Options
// =============================================================================

#[test]
fn test_options_lists_declared_options() {
    let ws = Workspace::new();
    ws.cmd("options")
        .assert()
        .success()
        .stdout(predicate::str::contains("build.name"))
        .stdout(predicate::str::contains("[mandatory]"))
        .stdout(predicate::str::contains("Name of the package to build"));
}

#[test]
fn test_options_prefix_filters() {
    let ws = Workspace::new();
    ws.cmd("options")
        .args(["--prefix", "services.files"])
        .assert()
        .success()
        .stdout(predicate::str::contains("services.files.enable"))
        .stdout(predicate::str::contains("build.name").not());
}

// =============================================================================
// Completions
// =============================================================================

#[test]
fn test_completions_generates_bash_script() {
    strata_cmd()
        .arg("completions")
        .arg("bash")
        .assert()
        .success()
        .stdout(predicate::str::contains("strata"));
}

#[test]
fn test_completions_rejects_unknown_shell() {
    strata_cmd()
        .arg("completions")
        .arg("tcsh")
        .assert()
        .failure();
}
