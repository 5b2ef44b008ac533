// crates/pdp-authz-cli/src/main.rs
// ============================================================================
// Module: PDP Authz CLI Entry Point
// Description: Process startup for the authorization plugin.
// Purpose: Parse flags, wire collaborators, and serve the plugin socket.
// Dependencies: clap, pdp-authz-client, pdp-authz-core, pdp-authz-plugin, tokio
// ============================================================================

//! ## Overview
//! Startup generates the instance identifier, selects the decision log sink,
//! builds the HTTP decision client, and serves the plugin socket until
//! interrupted. The blocking HTTP client is created and released on the main
//! thread, outside the async runtime, because it owns an internal runtime of
//! its own.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::ArgAction;
use clap::Parser;
use pdp_authz_client::HttpDecisionClient;
use pdp_authz_client::HttpDecisionClientConfig;
use pdp_authz_config::DEFAULT_CONFIG_PATH;
use pdp_authz_core::APP_NAME;
use pdp_authz_core::DecisionLog;
use pdp_authz_core::InstanceId;
use pdp_authz_core::Labels;
use pdp_authz_plugin::AuditRecorder;
use pdp_authz_plugin::EnforcementMediator;
use pdp_authz_plugin::FileDecisionLog;
use pdp_authz_plugin::MediatorSettings;
use pdp_authz_plugin::StderrDecisionLog;
use pdp_authz_plugin::serve_unix;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Directory the host scans for plugin sockets.
const DEFAULT_PLUGIN_DIR: &str = "/run/docker/plugins";
/// Plugin socket file extension.
const SOCKET_EXTENSION: &str = "sock";

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "pdp-authz", disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue)]
    show_version: bool,
    /// Plugin name; also names the socket file.
    #[arg(long = "plugin-name", value_name = "NAME", default_value = APP_NAME)]
    plugin_name: String,
    /// Path to the configuration file, reread on every request.
    #[arg(long = "config-file", value_name = "PATH", default_value = DEFAULT_CONFIG_PATH)]
    config_file: PathBuf,
    /// Allow requests whose evaluation failed and log PDP responses.
    #[arg(long, action = ArgAction::SetTrue)]
    debug: bool,
    /// Directory in which the plugin socket is created.
    #[arg(long = "plugin-dir", value_name = "DIR", default_value = DEFAULT_PLUGIN_DIR)]
    plugin_dir: PathBuf,
    /// Append decision records to this file instead of stderr.
    #[arg(long = "decision-log", value_name = "PATH")]
    decision_log: Option<PathBuf>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for startup and serve failures.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Starts the plugin and blocks until it shuts down.
fn run(cli: Cli) -> CliResult<ExitCode> {
    if cli.show_version {
        write_stdout_line(&format!("Version: {}", env!("CARGO_PKG_VERSION")))
            .map_err(|err| CliError::new(format!("failed to write stdout: {err}")))?;
        return Ok(ExitCode::SUCCESS);
    }

    let mediator = Arc::new(build_mediator(&cli)?);
    let socket = socket_path(&cli.plugin_dir, &cli.plugin_name);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| CliError::new(format!("failed to start runtime: {err}")))?;
    let _ = write_stderr_line("Starting server.");
    let outcome = runtime.block_on(serve_unix(&socket, Arc::clone(&mediator)));
    drop(runtime);
    drop(mediator);

    outcome.map_err(|err| CliError::new(format!("plugin server failed: {err}")))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Wiring
// ============================================================================

/// Builds the mediator and its collaborators from CLI flags.
fn build_mediator(cli: &Cli) -> CliResult<EnforcementMediator> {
    let labels = Labels::new(InstanceId::generate(), env!("CARGO_PKG_VERSION"));
    let log = decision_log(cli.decision_log.as_deref())?;
    let client = HttpDecisionClient::new(HttpDecisionClientConfig::default())
        .map_err(|err| CliError::new(format!("failed to build pdp client: {err}")))?;
    Ok(EnforcementMediator::new(
        MediatorSettings {
            config_path: cli.config_file.clone(),
            debug: cli.debug,
        },
        Arc::new(client),
        AuditRecorder::new(labels, log),
    ))
}

/// Selects the decision log sink.
fn decision_log(path: Option<&Path>) -> CliResult<Arc<dyn DecisionLog>> {
    let Some(path) = path else {
        return Ok(Arc::new(StderrDecisionLog));
    };
    let log = FileDecisionLog::open_append(path).map_err(|err| {
        CliError::new(format!("failed to open decision log {}: {err}", path.display()))
    })?;
    Ok(Arc::new(log))
}

/// Returns the socket path for a plugin name.
fn socket_path(plugin_dir: &Path, plugin_name: &str) -> PathBuf {
    plugin_dir.join(format!("{plugin_name}.{SOCKET_EXTENSION}"))
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Emits an error message and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
