// crates/pdp-authz-core/src/core/request.rs
// ============================================================================
// Module: PDP Authz Intercepted Request
// Description: Host-neutral view of an intercepted API request.
// Purpose: Decouple the mediation pipeline from the plugin wire format.
// Dependencies: std
// ============================================================================

//! ## Overview
//! An [`InterceptedRequest`] is what the host transport hands to the
//! mediator. Path and query are not stored separately; they are derived from
//! `uri` when the decision input is built.

use std::collections::BTreeMap;

/// Intercepted API request awaiting an authorization decision.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterceptedRequest {
    /// HTTP method of the upstream request.
    pub method: String,
    /// Raw request URI (origin-form, including query).
    pub uri: String,
    /// Request headers as forwarded by the host.
    pub headers: BTreeMap<String, String>,
    /// Raw request body bytes.
    pub body: Vec<u8>,
    /// Authenticated user identity, empty when unauthenticated.
    pub user: String,
    /// Authentication method used by the host.
    pub auth_method: String,
}

impl InterceptedRequest {
    /// Returns the first header value whose name matches case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}
