// crates/pdp-authz-plugin/src/lib.rs
// ============================================================================
// Module: PDP Authz Plugin
// Description: Enforcement mediator, decision logging, and plugin transport.
// Purpose: Wire the core pipeline to the host's authorization-plugin protocol.
// Dependencies: axum, pdp-authz-config, pdp-authz-core, serde, tokio
// ============================================================================

//! ## Overview
//! The plugin crate owns the per-request state machine
//! ([`EnforcementMediator`]), the audit recorder and its log sinks, the
//! authorization-plugin wire types, and the Unix-socket server that exposes
//! them to the host.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod mediator;
pub mod protocol;
pub mod server;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::AuditRecorder;
pub use audit::FileDecisionLog;
pub use audit::StderrDecisionLog;
pub use audit::WriterDecisionLog;
pub use mediator::EnforcementMediator;
pub use mediator::Evaluation;
pub use mediator::EvaluationError;
pub use mediator::MediatorSettings;
pub use protocol::ActivateResponse;
pub use protocol::AuthzRequest;
pub use protocol::AuthzResponse;
pub use server::ServerError;
pub use server::router;
pub use server::serve_unix;
