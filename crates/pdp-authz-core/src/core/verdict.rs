// crates/pdp-authz-core/src/core/verdict.rs
// ============================================================================
// Module: PDP Authz Verdicts
// Description: Verdict extraction from PDP responses and host-facing verdicts.
// Purpose: Turn arbitrary PDP response shapes into a single allow/deny.
// Dependencies: serde_json, thiserror
// ============================================================================

//! ## Overview
//! Policy decision services answer with a JSON object whose values may be
//! objects carrying a boolean `allow`. [`extract_verdict`] scans those values
//! in ascending key order; the last match wins, so
//! `{"policy1": {"allow": true}, "policy2": {"allow": false}}` denies on every
//! run. A response with no matching entry denies without error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Message returned when the policy denies a request without error.
pub const ADMINISTRATIVE_REJECTION: &str = "request rejected by administrative policy";

/// Field carrying a per-policy verdict inside a response entry.
const ALLOW_FIELD: &str = "allow";

// ============================================================================
// SECTION: Verdict
// ============================================================================

/// Final verdict returned to the host transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Request may proceed.
    Allow,
    /// Request denied by policy.
    Reject {
        /// Human-readable rejection message.
        message: String,
    },
    /// Request denied because evaluation failed.
    Fail {
        /// Raw error text.
        error: String,
    },
}

impl Verdict {
    /// Returns true when the verdict allows the request.
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Creates the administrative-policy rejection verdict.
    #[must_use]
    pub fn administrative_rejection() -> Self {
        Self::Reject {
            message: ADMINISTRATIVE_REJECTION.to_string(),
        }
    }
}

// ============================================================================
// SECTION: Extraction
// ============================================================================

/// Errors raised when a PDP response has an unusable shape.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerdictError {
    /// The response was valid JSON but not an object.
    #[error("pdp response must be a json object")]
    NotAnObject,
}

/// Extracts the allow/deny verdict from a parsed PDP response.
///
/// # Errors
///
/// Returns [`VerdictError::NotAnObject`] when the response is not a JSON object.
pub fn extract_verdict(response: &Value) -> Result<bool, VerdictError> {
    let Value::Object(entries) = response else {
        return Err(VerdictError::NotAnObject);
    };
    let mut keys: Vec<&String> = entries.keys().collect();
    keys.sort();

    let mut allowed = false;
    for key in keys {
        let Some(Value::Object(nested)) = entries.get(key) else {
            continue;
        };
        if let Some(Value::Bool(allow)) = nested.get(ALLOW_FIELD) {
            allowed = *allow;
        }
    }
    Ok(allowed)
}
