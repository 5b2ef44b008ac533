// crates/pdp-authz-core/src/core/record.rs
// ============================================================================
// Module: PDP Authz Decision Records
// Description: Audit record structure for a single evaluation.
// Purpose: Capture input, result, and provenance of every decision.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! A [`DecisionRecord`] is assembled once per evaluation, written to the
//! decision log, and never read back. It binds the verdict to the exact
//! configuration bytes in effect (`config_hash`) and to the running process
//! (`labels.id`).

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::core::hashing::config_hash;
use crate::core::identifiers::DecisionId;
use crate::core::identifiers::InstanceId;
use crate::core::input::DecisionInput;

// ============================================================================
// SECTION: Labels
// ============================================================================

/// Application label attached to every record.
pub const APP_NAME: &str = "pdp-docker-authz";

/// Static labels identifying the emitting process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Labels {
    /// Application name.
    pub app: String,
    /// Running-instance identifier.
    pub id: InstanceId,
    /// Build version of the plugin.
    pub plugin_version: String,
}

impl Labels {
    /// Creates labels for the given instance and plugin version.
    #[must_use]
    pub fn new(id: InstanceId, plugin_version: impl Into<String>) -> Self {
        Self {
            app: APP_NAME.to_string(),
            id,
            plugin_version: plugin_version.into(),
        }
    }
}

// ============================================================================
// SECTION: Decision Record
// ============================================================================

/// Audit record for one evaluation.
///
/// # Invariants
/// - `result` is the boolean actually returned to the mediator, including
///   fallback results. A debug-mode override that lets an errored request
///   through is applied after the record is made, so such records keep
///   `result: false` alongside the error.
/// - `error` is present only when evaluation failed after configuration load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    /// Process labels.
    pub labels: Labels,
    /// Fresh identifier for this decision.
    pub decision_id: DecisionId,
    /// Hex SHA-256 of the configuration bytes used.
    pub config_hash: String,
    /// Decision input, `null` when it could not be built.
    pub input: Option<DecisionInput>,
    /// Resolved allow/deny result.
    pub result: bool,
    /// Evaluation error text, when any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// RFC 3339 timestamp with nanosecond precision (UTC).
    pub timestamp: String,
}

impl DecisionRecord {
    /// Assembles a record with a fresh decision id and the current time.
    #[must_use]
    pub fn assemble(
        labels: &Labels,
        input: Option<&DecisionInput>,
        config_bytes: &[u8],
        result: bool,
        error: Option<String>,
    ) -> Self {
        Self {
            labels: labels.clone(),
            decision_id: DecisionId::generate(),
            config_hash: config_hash(config_bytes),
            input: input.cloned(),
            result,
            error,
            timestamp: now_rfc3339(),
        }
    }
}

/// Formats the current UTC time as RFC 3339 with sub-second digits.
fn now_rfc3339() -> String {
    OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default()
}
