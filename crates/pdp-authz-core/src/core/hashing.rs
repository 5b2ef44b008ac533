// crates/pdp-authz-core/src/core/hashing.rs
// ============================================================================
// Module: PDP Authz Hashing
// Description: SHA-256 digests and hex encoding for audit provenance.
// Purpose: Bind decision records to the exact configuration bytes in effect.
// Dependencies: sha2
// ============================================================================

//! ## Overview
//! Configuration files are hashed over their raw bytes, never over a
//! re-serialized form, so a record's `config_hash` can be checked against the
//! file on disk with standard tooling (`sha256sum`).

// ============================================================================
// SECTION: Imports
// ============================================================================

use sha2::Digest;
use sha2::Sha256;

// ============================================================================
// SECTION: Hashing Helpers
// ============================================================================

/// Returns the lowercase hex SHA-256 digest of the configuration bytes.
#[must_use]
pub fn config_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex_encode(&hasher.finalize())
}

// ============================================================================
// SECTION: Hex Encoding
// ============================================================================

/// Encodes bytes as a lowercase hex string.
pub(crate) fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(HEX[(byte >> 4) as usize] as char);
        out.push(HEX[(byte & 0x0f) as usize] as char);
    }
    out
}
