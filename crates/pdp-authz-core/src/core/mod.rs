// crates/pdp-authz-core/src/core/mod.rs
// ============================================================================
// Module: PDP Authz Core Types
// Description: Request, decision-input, verdict, and audit record structures.
// Purpose: Provide stable, serializable types for the decision mediation pipeline.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Core types define the intercepted request, the canonical decision input
//! sent to the policy decision service, the verdict returned to the host, and
//! the decision record written to the audit log.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod hashing;
pub mod identifiers;
pub mod input;
pub mod record;
pub mod request;
pub mod verdict;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use hashing::config_hash;
pub use identifiers::DecisionId;
pub use identifiers::InstanceId;
pub use input::DecisionInput;
pub use input::InputError;
pub use input::NormalizedRequest;
pub use input::build_input;
pub use record::APP_NAME;
pub use record::DecisionRecord;
pub use record::Labels;
pub use request::InterceptedRequest;
pub use verdict::ADMINISTRATIVE_REJECTION;
pub use verdict::Verdict;
pub use verdict::VerdictError;
pub use verdict::extract_verdict;
