// crates/pdp-authz-plugin/src/mediator.rs
// ============================================================================
// Module: Enforcement Mediator
// Description: Per-request decision state machine with fail-open/closed policy.
// Purpose: Resolve every intercepted request into an enforceable verdict.
// Dependencies: pdp-authz-config, pdp-authz-core, thiserror
// ============================================================================

//! ## Overview
//! Each evaluation loads the configuration fresh, builds the decision input,
//! consults the PDP once, and records the outcome. Failures after the
//! configuration is loaded resolve to `allow_on_failure` and are always
//! recorded. A configuration failure denies without a decision record, since
//! there are no config bytes to bind the record to; a status line is still
//! written to the decision log.
//!
//! Verdict precedence when answering the host:
//! 1. an allowed result always allows;
//! 2. a denial without error is an administrative rejection;
//! 3. a denial caused by an error allows in debug mode (logged as an
//!    override) and otherwise fails with the raw error text.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use pdp_authz_config::ConfigError;
use pdp_authz_config::PluginConfig;
use pdp_authz_core::AuditError;
use pdp_authz_core::DecisionClient;
use pdp_authz_core::DecisionError;
use pdp_authz_core::DecisionInput;
use pdp_authz_core::DecisionRecord;
use pdp_authz_core::InputError;
use pdp_authz_core::InterceptedRequest;
use pdp_authz_core::Verdict;
use pdp_authz_core::build_input;
use thiserror::Error;

use crate::audit::AuditRecorder;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Errors that can end an evaluation early or force the fallback verdict.
#[derive(Debug, Error)]
pub enum EvaluationError {
    /// Configuration could not be loaded; denies without a record.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Decision input could not be built.
    #[error(transparent)]
    Input(#[from] InputError),
    /// The PDP call failed or returned an unusable response.
    #[error(transparent)]
    Decision(#[from] DecisionError),
}

/// Static mediator settings chosen at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediatorSettings {
    /// Path of the configuration file reread on every evaluation.
    pub config_path: PathBuf,
    /// Debug mode converts error-driven denials into logged allows.
    pub debug: bool,
}

/// Outcome of one evaluation before it is rendered as a verdict.
#[derive(Debug)]
pub struct Evaluation {
    /// Resolved allow/deny result, including fallback results.
    pub allowed: bool,
    /// Error encountered during evaluation, if any.
    pub error: Option<EvaluationError>,
    /// Decision record; `None` only when configuration failed to load.
    pub record: Option<DecisionRecord>,
}

// ============================================================================
// SECTION: Mediator
// ============================================================================

/// Orchestrates configuration, input building, PDP calls, and auditing.
pub struct EnforcementMediator {
    /// Startup settings.
    settings: MediatorSettings,
    /// Remote policy decision service.
    client: Arc<dyn DecisionClient>,
    /// Decision recorder.
    recorder: AuditRecorder,
}

impl EnforcementMediator {
    /// Creates a mediator from its collaborators.
    #[must_use]
    pub fn new(
        settings: MediatorSettings,
        client: Arc<dyn DecisionClient>,
        recorder: AuditRecorder,
    ) -> Self {
        Self {
            settings,
            client,
            recorder,
        }
    }

    /// Returns the mediator settings.
    #[must_use]
    pub const fn settings(&self) -> &MediatorSettings {
        &self.settings
    }

    /// Decides whether an intercepted request may proceed.
    #[must_use]
    pub fn decide(&self, request: &InterceptedRequest) -> Verdict {
        let evaluation = self.evaluate(request);
        if evaluation.allowed {
            return Verdict::Allow;
        }
        match evaluation.error {
            None => Verdict::administrative_rejection(),
            Some(err) if self.settings.debug => {
                self.log(&format!("Returning PDP decision: true (debug override; error: {err})"));
                Verdict::Allow
            }
            Some(err) => Verdict::Fail {
                error: err.to_string(),
            },
        }
    }

    /// Post-operation hook; responses are never blocked.
    #[must_use]
    pub const fn after_response(&self, _request: &InterceptedRequest) -> Verdict {
        Verdict::Allow
    }

    /// Runs one evaluation and returns its unrendered outcome.
    pub fn evaluate(&self, request: &InterceptedRequest) -> Evaluation {
        let snapshot = match PluginConfig::load(&self.settings.config_path) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                self.log(&format!("Returning PDP decision: false (configuration unavailable: {err})"));
                return Evaluation {
                    allowed: false,
                    error: Some(err.into()),
                    record: None,
                };
            }
        };
        let fallback = snapshot.config.allow_on_failure;

        let (input, allowed, error) = match build_input(request) {
            Ok(input) => {
                let (allowed, error) = self.consult(&snapshot.config.pdp_addr, &input, fallback);
                (Some(input), allowed, error)
            }
            Err(err) => (None, fallback, Some(EvaluationError::from(err))),
        };

        let record = self.recorder.record(
            input.as_ref(),
            &snapshot.raw,
            allowed,
            error.as_ref().map(|err| err as &dyn std::error::Error),
        );
        if let Err(err) = self.recorder.emit(&record) {
            report_log_failure(&err);
        }
        Evaluation {
            allowed,
            error,
            record: Some(record),
        }
    }

    /// Calls the PDP once, resolving failures to the fallback verdict.
    fn consult(
        &self,
        endpoint: &str,
        input: &DecisionInput,
        fallback: bool,
    ) -> (bool, Option<EvaluationError>) {
        match self.client.evaluate(endpoint, input) {
            Ok(decision) => {
                if self.settings.debug {
                    self.log(&format!("PDP response: {}", decision.response));
                }
                (decision.allowed, None)
            }
            Err(err) => (fallback, Some(err.into())),
        }
    }

    /// Writes a status line, reporting and discarding sink failures.
    fn log(&self, line: &str) {
        if let Err(err) = self.recorder.note(line) {
            report_log_failure(&err);
        }
    }
}

/// Reports a decision log failure on stderr and moves on.
fn report_log_failure(err: &AuditError) {
    let _ = writeln!(std::io::stderr(), "decision log unavailable: {err}");
}
