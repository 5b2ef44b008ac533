// crates/pdp-authz-core/src/core/identifiers.rs
// ============================================================================
// Module: PDP Authz Identifiers
// Description: Random instance and decision identifiers.
// Purpose: Correlate decision records per process and per evaluation.
// Dependencies: rand, serde
// ============================================================================

//! ## Overview
//! Both identifiers share the same rendering: 16 random bytes with the
//! version-4 and variant bits applied, formatted as `8-4-4-4-12` lowercase
//! hex. An [`InstanceId`] is generated once at startup and threaded into
//! every record; a [`DecisionId`] is generated per record.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use rand::RngCore;
use rand::rngs::OsRng;
use serde::Deserialize;
use serde::Serialize;

use crate::core::hashing::hex_encode;

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

/// Process-scoped identifier included in every decision record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(String);

impl InstanceId {
    /// Generates a fresh random instance identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(random_token())
    }

    /// Creates an instance identifier from an existing string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Per-evaluation decision identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DecisionId(String);

impl DecisionId {
    /// Generates a fresh random decision identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(random_token())
    }

    /// Renders a decision identifier from caller-supplied bytes.
    ///
    /// The version and variant bits are forced regardless of input.
    #[must_use]
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(format_token(bytes))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DecisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Draws 16 bytes from the OS RNG and renders them as a token.
fn random_token() -> String {
    let mut bytes = [0u8; 16];
    OsRng.fill_bytes(&mut bytes);
    format_token(bytes)
}

/// Applies version/variant bits and renders `8-4-4-4-12` hex.
fn format_token(mut bytes: [u8; 16]) -> String {
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;
    format!(
        "{}-{}-{}-{}-{}",
        hex_encode(&bytes[0..4]),
        hex_encode(&bytes[4..6]),
        hex_encode(&bytes[6..8]),
        hex_encode(&bytes[8..10]),
        hex_encode(&bytes[10..16])
    )
}
