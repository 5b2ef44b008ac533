// crates/pdp-authz-plugin/tests/common/mod.rs
// ============================================================================
// Module: Plugin Test Helpers
// Description: Capture sinks, stub PDP clients, and config fixtures.
// Purpose: Share mediator wiring across plugin integration tests.
// Dependencies: pdp-authz-core, pdp-authz-plugin, serde_json, tempfile
// ============================================================================

//! ## Overview
//! Helpers used by several plugin test binaries. Not every binary uses every
//! helper.

#![allow(dead_code, reason = "Helpers are shared across test binaries.")]
#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;

use pdp_authz_core::AuditError;
use pdp_authz_core::DecisionClient;
use pdp_authz_core::DecisionError;
use pdp_authz_core::DecisionInput;
use pdp_authz_core::DecisionLog;
use pdp_authz_core::DecisionRecord;
use pdp_authz_core::InstanceId;
use pdp_authz_core::InterceptedRequest;
use pdp_authz_core::Labels;
use pdp_authz_core::PdpDecision;
use pdp_authz_plugin::AuditRecorder;
use pdp_authz_plugin::EnforcementMediator;
use pdp_authz_plugin::MediatorSettings;
use serde_json::json;

// ============================================================================
// SECTION: Decision Log Fixtures
// ============================================================================

/// Decision log capturing lines in memory.
#[derive(Clone, Default)]
pub struct MemoryLog {
    /// Captured lines.
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemoryLog {
    /// Returns a copy of the captured lines.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    /// Parses every captured JSON record line.
    pub fn records(&self) -> Vec<DecisionRecord> {
        self.lines()
            .iter()
            .filter(|line| line.starts_with('{'))
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }
}

impl DecisionLog for MemoryLog {
    fn write_line(&self, line: &str) -> Result<(), AuditError> {
        self.lines.lock().unwrap().push(line.to_string());
        Ok(())
    }
}

/// Decision log that rejects every write.
pub struct FailingLog;

impl DecisionLog for FailingLog {
    fn write_line(&self, _line: &str) -> Result<(), AuditError> {
        Err(AuditError::Write("sink closed".to_string()))
    }
}

// ============================================================================
// SECTION: Decision Client Fixtures
// ============================================================================

/// Scripted outcome for [`StubClient`].
#[derive(Clone)]
pub enum StubOutcome {
    /// PDP answers with the given verdict.
    Verdict(bool),
    /// PDP call fails with a request error.
    Fail(String),
}

/// Decision client returning a scripted outcome and recording calls.
pub struct StubClient {
    /// Outcome returned for every call.
    outcome: StubOutcome,
    /// Endpoints and inputs seen so far.
    calls: Mutex<Vec<(String, DecisionInput)>>,
}

impl StubClient {
    /// Creates a stub with a fixed outcome.
    pub fn new(outcome: StubOutcome) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Returns the recorded calls.
    pub fn calls(&self) -> Vec<(String, DecisionInput)> {
        self.calls.lock().unwrap().clone()
    }
}

impl DecisionClient for StubClient {
    fn evaluate(&self, endpoint: &str, input: &DecisionInput) -> Result<PdpDecision, DecisionError> {
        self.calls.lock().unwrap().push((endpoint.to_string(), input.clone()));
        match &self.outcome {
            StubOutcome::Verdict(allowed) => Ok(PdpDecision {
                allowed: *allowed,
                response: json!({"result": {"allow": allowed}}),
            }),
            StubOutcome::Fail(message) => Err(DecisionError::Request(message.clone())),
        }
    }
}

// ============================================================================
// SECTION: Config and Request Fixtures
// ============================================================================

/// PDP endpoint used in config fixtures.
pub const PDP_ADDR: &str = "http://pdp.test/v1/data/docker/authz";

/// Writes a config file with the given fallback and returns its path.
pub fn write_config(dir: &Path, pdp_addr: &str, allow_on_failure: bool) -> PathBuf {
    let path = dir.join("config.json");
    let body = json!({"pdp_addr": pdp_addr, "allow_on_failure": allow_on_failure});
    std::fs::write(&path, serde_json::to_vec_pretty(&body).unwrap()).unwrap();
    path
}

/// Returns a representative container-create request.
pub fn sample_request() -> InterceptedRequest {
    let mut headers = BTreeMap::new();
    headers.insert("Content-Type".to_string(), "application/json".to_string());
    InterceptedRequest {
        method: "POST".to_string(),
        uri: "/v1.41/containers/create?name=web".to_string(),
        headers,
        body: br#"{"Image":"nginx"}"#.to_vec(),
        user: "alice".to_string(),
        auth_method: "TLS".to_string(),
    }
}

/// Builds a mediator over the given client, config path, and log.
pub fn mediator(
    config_path: &Path,
    debug: bool,
    client: Arc<dyn DecisionClient>,
    log: Arc<dyn DecisionLog>,
) -> EnforcementMediator {
    let labels = Labels::new(InstanceId::new("instance-under-test"), "0.0.0-test");
    EnforcementMediator::new(
        MediatorSettings {
            config_path: config_path.to_path_buf(),
            debug,
        },
        client,
        AuditRecorder::new(labels, log),
    )
}
