// crates/pdp-authz-core/src/lib.rs
// ============================================================================
// Module: PDP Authz Core Library
// Description: Public API surface for the PDP Authz core.
// Purpose: Expose decision-input, verdict, and audit record types plus interfaces.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! PDP Authz core turns intercepted plugin requests into canonical decision
//! inputs, extracts verdicts from policy decision service responses, and
//! assembles audit records. It performs no network or disk I/O; transports,
//! PDP clients, and log sinks integrate through the traits in [`interfaces`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::AuditError;
pub use interfaces::DecisionClient;
pub use interfaces::DecisionError;
pub use interfaces::DecisionLog;
pub use interfaces::PdpDecision;
