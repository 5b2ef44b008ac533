// crates/pdp-authz-core/src/interfaces/mod.rs
// ============================================================================
// Module: PDP Authz Interfaces
// Description: Backend-agnostic interfaces for PDP calls and decision logging.
// Purpose: Define the contract surfaces used by the enforcement mediator.
// Dependencies: crate::core, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Interfaces define how the mediator reaches the policy decision service and
//! the decision log without embedding transport details. Implementations must
//! be safe to share across concurrent evaluations.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use thiserror::Error;

use crate::core::input::DecisionInput;

// ============================================================================
// SECTION: Decision Client
// ============================================================================

/// Verdict returned by a policy decision service.
#[derive(Debug, Clone, PartialEq)]
pub struct PdpDecision {
    /// Extracted allow/deny result.
    pub allowed: bool,
    /// Parsed response body, retained for diagnostics.
    pub response: Value,
}

/// Errors raised while consulting the policy decision service.
#[derive(Debug, Error)]
pub enum DecisionError {
    /// The request could not be sent or timed out.
    #[error("{0}")]
    Request(String),
    /// The response could not be read or had an unusable shape.
    #[error("invalid pdp response: {0}")]
    Response(String),
}

/// Remote policy decision service.
pub trait DecisionClient: Send + Sync {
    /// Evaluates a decision input against the endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`DecisionError`] when no verdict could be obtained.
    fn evaluate(&self, endpoint: &str, input: &DecisionInput)
    -> Result<PdpDecision, DecisionError>;
}

// ============================================================================
// SECTION: Decision Log
// ============================================================================

/// Errors raised while writing to the decision log.
#[derive(Debug, Error)]
pub enum AuditError {
    /// A record or input could not be serialized.
    #[error("decision log serialization failed: {0}")]
    Serialization(String),
    /// The sink rejected the write.
    #[error("decision log write failed: {0}")]
    Write(String),
}

/// Line-oriented decision log sink.
pub trait DecisionLog: Send + Sync {
    /// Writes one line (without trailing newline) to the sink.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Write`] when the line cannot be written.
    fn write_line(&self, line: &str) -> Result<(), AuditError>;
}
