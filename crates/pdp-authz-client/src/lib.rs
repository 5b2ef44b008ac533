// crates/pdp-authz-client/src/lib.rs
// ============================================================================
// Module: PDP Authz Client
// Description: HTTP client for remote policy decision services.
// Purpose: Provide the network-backed DecisionClient used by the plugin.
// Dependencies: pdp-authz-core, reqwest, serde_json
// ============================================================================

//! ## Overview
//! This crate ships [`HttpDecisionClient`], a blocking HTTP implementation of
//! [`pdp_authz_core::DecisionClient`]. Each evaluation is a single POST with a
//! bounded timeout; there are no retries.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod http;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use http::DEFAULT_TIMEOUT_MS;
pub use http::HttpDecisionClient;
pub use http::HttpDecisionClientConfig;
