// crates/pdp-authz-config/src/lib.rs
// ============================================================================
// Module: PDP Authz Config Library
// Description: Plugin configuration model and loader.
// Purpose: Single source of truth for the plugin config file semantics.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! `pdp-authz-config` defines the JSON configuration file read by the
//! enforcement mediator. The file is reread on every evaluation so edits take
//! effect on the next request; loading returns the exact bytes read so audit
//! records can hash them.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
