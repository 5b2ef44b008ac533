// crates/pdp-authz-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Helpers Tests
// Description: Unit tests for flag defaults and startup wiring helpers.
// Purpose: Ensure the plugin starts with the expected socket and sinks.
// Dependencies: pdp-authz-cli main helpers, tempfile
// ============================================================================

//! ## Overview
//! Validates flag defaults, socket naming, decision log selection, and the
//! version short-circuit.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use super::Cli;
use super::build_mediator;
use super::decision_log;
use super::run;
use super::socket_path;

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn defaults_match_host_conventions() {
    let cli = Cli::try_parse_from(["pdp-authz"]).unwrap();
    assert_eq!(cli.plugin_name, "pdp-docker-authz");
    assert_eq!(cli.config_file, PathBuf::from("~/.pdp/config.json"));
    assert_eq!(cli.plugin_dir, PathBuf::from("/run/docker/plugins"));
    assert!(!cli.debug);
    assert!(!cli.show_version);
    assert!(cli.decision_log.is_none());
}

#[test]
fn flags_override_defaults() {
    let cli = Cli::try_parse_from([
        "pdp-authz",
        "--plugin-name",
        "custom",
        "--config-file",
        "/etc/pdp/config.json",
        "--debug",
        "--plugin-dir",
        "/tmp/plugins",
        "--decision-log",
        "/var/log/pdp.log",
    ])
    .unwrap();
    assert_eq!(cli.plugin_name, "custom");
    assert_eq!(cli.config_file, PathBuf::from("/etc/pdp/config.json"));
    assert!(cli.debug);
    assert_eq!(cli.plugin_dir, PathBuf::from("/tmp/plugins"));
    assert_eq!(cli.decision_log, Some(PathBuf::from("/var/log/pdp.log")));
}

#[test]
fn socket_path_appends_sock_extension() {
    let path = socket_path(Path::new("/run/docker/plugins"), "pdp-docker-authz");
    assert_eq!(path, PathBuf::from("/run/docker/plugins/pdp-docker-authz.sock"));

    let dotted = socket_path(Path::new("/plugins"), "pdp.v2");
    assert_eq!(dotted, PathBuf::from("/plugins/pdp.v2.sock"));
}

#[test]
fn decision_log_file_is_created() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("decisions.log");
    let log = decision_log(Some(path.as_path())).unwrap();
    log.write_line("Returning PDP decision: true").unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "Returning PDP decision: true\n");
}

#[test]
fn decision_log_open_failure_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("decisions.log");
    let err = decision_log(Some(path.as_path())).err().unwrap();
    assert!(err.to_string().starts_with("failed to open decision log"));
}

#[test]
fn mediator_uses_configured_settings() {
    let cli = Cli::try_parse_from(["pdp-authz", "--config-file", "/etc/pdp.json", "--debug"])
        .unwrap();
    let mediator = build_mediator(&cli).unwrap();
    assert_eq!(mediator.settings().config_path, PathBuf::from("/etc/pdp.json"));
    assert!(mediator.settings().debug);
}

#[test]
fn version_flag_exits_successfully() {
    let cli = Cli::try_parse_from(["pdp-authz", "--version"]).unwrap();
    assert_eq!(run(cli).unwrap(), ExitCode::SUCCESS);
}
