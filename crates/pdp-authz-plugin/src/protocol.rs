// crates/pdp-authz-plugin/src/protocol.rs
// ============================================================================
// Module: Authorization Plugin Protocol
// Description: Wire types for the host's authorization-plugin API.
// Purpose: Translate plugin JSON to core requests and verdicts to plugin JSON.
// Dependencies: base64, pdp-authz-core, serde
// ============================================================================

//! ## Overview
//! The host POSTs JSON documents to the plugin socket. Request bodies arrive
//! base64-encoded; absent or `null` fields decode to empty values. Only the
//! request half of the document is used; response fields sent with
//! `AuthZPlugin.AuthZRes` are ignored.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use pdp_authz_core::InterceptedRequest;
use pdp_authz_core::Verdict;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Content type used for plugin responses.
pub const PLUGIN_CONTENT_TYPE: &str = "application/vnd.docker.plugins.v1+json";
/// Activation route.
pub const ACTIVATE_PATH: &str = "/Plugin.Activate";
/// Pre-operation authorization route.
pub const AUTHZ_REQUEST_PATH: &str = "/AuthZPlugin.AuthZReq";
/// Post-operation authorization route.
pub const AUTHZ_RESPONSE_PATH: &str = "/AuthZPlugin.AuthZRes";
/// Capability advertised at activation.
const AUTHZ_CAPABILITY: &str = "authz";

// ============================================================================
// SECTION: Requests
// ============================================================================

/// Authorization request as sent by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AuthzRequest {
    /// Authenticated user.
    #[serde(rename = "User", default, deserialize_with = "null_as_default")]
    pub user: String,
    /// Authentication method.
    #[serde(rename = "UserAuthNMethod", default, deserialize_with = "null_as_default")]
    pub user_authn_method: String,
    /// Request method.
    #[serde(rename = "RequestMethod", default, deserialize_with = "null_as_default")]
    pub request_method: String,
    /// Request URI.
    #[serde(rename = "RequestURI", default, deserialize_with = "null_as_default")]
    pub request_uri: String,
    /// Decoded request body.
    #[serde(rename = "RequestBody", default, deserialize_with = "base64_body")]
    pub request_body: Vec<u8>,
    /// Request headers.
    #[serde(rename = "RequestHeaders", default, deserialize_with = "null_as_default")]
    pub request_headers: BTreeMap<String, String>,
}

impl From<AuthzRequest> for InterceptedRequest {
    fn from(request: AuthzRequest) -> Self {
        Self {
            method: request.request_method,
            uri: request.request_uri,
            headers: request.request_headers,
            body: request.request_body,
            user: request.user,
            auth_method: request.user_authn_method,
        }
    }
}

// ============================================================================
// SECTION: Responses
// ============================================================================

/// Authorization response returned to the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthzResponse {
    /// Whether the request may proceed.
    #[serde(rename = "Allow")]
    pub allow: bool,
    /// Rejection message.
    #[serde(rename = "Msg", default, skip_serializing_if = "String::is_empty")]
    pub msg: String,
    /// Error text.
    #[serde(rename = "Err", default, skip_serializing_if = "String::is_empty")]
    pub err: String,
}

impl From<Verdict> for AuthzResponse {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Allow => Self {
                allow: true,
                ..Self::default()
            },
            Verdict::Reject {
                message,
            } => Self {
                msg: message,
                ..Self::default()
            },
            Verdict::Fail {
                error,
            } => Self {
                err: error,
                ..Self::default()
            },
        }
    }
}

/// Activation handshake response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivateResponse {
    /// Plugin capabilities.
    #[serde(rename = "Implements")]
    pub implements: Vec<String>,
}

impl ActivateResponse {
    /// Returns the activation response for an authorization plugin.
    #[must_use]
    pub fn authz() -> Self {
        Self {
            implements: vec![AUTHZ_CAPABILITY.to_string()],
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Deserializes `null` as the type's default value.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Decodes a base64 body; `null` decodes to an empty body.
fn base64_body<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(encoded) = Option::<String>::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    STANDARD.decode(encoded.as_bytes()).map_err(serde::de::Error::custom)
}
