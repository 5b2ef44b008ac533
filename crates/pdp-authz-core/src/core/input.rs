// crates/pdp-authz-core/src/core/input.rs
// ============================================================================
// Module: PDP Authz Input Builder
// Description: Canonical decision-input construction from intercepted requests.
// Purpose: Normalize requests into the document sent to the policy decision service.
// Dependencies: serde, serde_json, url, urlencoding
// ============================================================================

//! ## Overview
//! [`build_input`] is a pure transformation: the same request always yields
//! a byte-identical serialized [`DecisionInput`]. All maps are ordered so
//! serialization never depends on hash iteration.
//!
//! Field names are the ones policies are written against (`Headers`, `Path`,
//! `PathPlain`, `PathArr`, `Query`, `Method`, `Body`, `User`, `AuthMethod`),
//! nested under a top-level `input` key.
//!
//! The request target is split the way the host's own URL parser splits it:
//! an optional scheme and authority, the path, the query after the first
//! `?`, and a fragment after the first `#`. The target is malformed only
//! when it carries a control character, a truncated or non-hex `%` escape
//! in the path or fragment, or a colon in a relative first segment. Spaces,
//! empty targets, and escapes that decode to invalid UTF-8 are accepted; the
//! latter decode lossily.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use url::form_urlencoded;

use crate::core::request::InterceptedRequest;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Content type that enables JSON body parsing.
const JSON_CONTENT_TYPE: &str = "application/json";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Canonical decision input, wrapped under a single `input` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionInput {
    /// Normalized request facts addressed by policies as `input.*`.
    pub input: NormalizedRequest,
}

/// Normalized view of an intercepted request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRequest {
    /// Request headers.
    #[serde(rename = "Headers")]
    pub headers: BTreeMap<String, String>,
    /// Raw request URI as received.
    #[serde(rename = "Path")]
    pub path: String,
    /// Percent-decoded path without the query.
    #[serde(rename = "PathPlain")]
    pub path_plain: String,
    /// Decoded path split on `/`; absolute paths keep an empty first segment.
    #[serde(rename = "PathArr")]
    pub path_segments: Vec<String>,
    /// Query parameters, each key mapping to its values in request order.
    #[serde(rename = "Query")]
    pub query: BTreeMap<String, Vec<String>>,
    /// HTTP method.
    #[serde(rename = "Method")]
    pub method: String,
    /// Parsed JSON body; `null` unless the request carried a JSON body.
    #[serde(rename = "Body")]
    pub body: Option<Value>,
    /// Authenticated user identity.
    #[serde(rename = "User")]
    pub user: String,
    /// Authentication method.
    #[serde(rename = "AuthMethod")]
    pub auth_method: String,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while building a decision input.
#[derive(Debug, Error)]
pub enum InputError {
    /// The request URI could not be parsed.
    #[error("invalid request uri: {0}")]
    Uri(String),
    /// A JSON-typed body failed to parse.
    #[error("invalid json request body: {0}")]
    Body(String),
}

// ============================================================================
// SECTION: Builder
// ============================================================================

/// Builds the canonical decision input for an intercepted request.
///
/// # Errors
///
/// Returns [`InputError::Uri`] when the request URI is malformed and
/// [`InputError::Body`] when a body declared as `application/json` is not
/// valid JSON.
pub fn build_input(request: &InterceptedRequest) -> Result<DecisionInput, InputError> {
    let body = parse_body(request)?;
    let target = split_target(&request.uri)?;
    let path_plain = decode_path(target.path);
    let path_segments = path_plain.split('/').map(str::to_string).collect();
    let query = target.query.map(parse_query).unwrap_or_default();

    Ok(DecisionInput {
        input: NormalizedRequest {
            headers: request.headers.clone(),
            path: request.uri.clone(),
            path_plain,
            path_segments,
            query,
            method: request.method.clone(),
            body,
            user: request.user.clone(),
            auth_method: request.auth_method.clone(),
        },
    })
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Parses the body as JSON only for exact `application/json` requests.
fn parse_body(request: &InterceptedRequest) -> Result<Option<Value>, InputError> {
    if request.header("Content-Type") != Some(JSON_CONTENT_TYPE) || request.body.is_empty() {
        return Ok(None);
    }
    serde_json::from_slice(&request.body)
        .map(Some)
        .map_err(|err| InputError::Body(err.to_string()))
}

/// Parses a form-encoded query string, keeping repeated values in order.
///
/// Empty pairs, pairs containing `;`, and pairs with malformed escapes are
/// skipped. An empty key is kept.
fn parse_query(query: &str) -> BTreeMap<String, Vec<String>> {
    let mut params: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for pair in query.split('&') {
        if pair.is_empty() || pair.contains(';') || first_invalid_escape(pair).is_some() {
            continue;
        }
        if let Some((key, value)) = form_urlencoded::parse(pair.as_bytes()).next() {
            params.entry(key.into_owned()).or_default().push(value.into_owned());
        }
    }
    params
}

// ============================================================================
// SECTION: Request Target
// ============================================================================

/// Components of a request target.
struct RequestTarget<'a> {
    /// Escaped path, possibly empty.
    path: &'a str,
    /// Raw query after the first `?`.
    query: Option<&'a str>,
}

/// Splits a request target into path and query, validating escapes.
fn split_target(raw: &str) -> Result<RequestTarget<'_>, InputError> {
    if raw.bytes().any(|byte| byte < 0x20 || byte == 0x7f) {
        return Err(InputError::Uri("invalid control character in URL".to_string()));
    }
    let (rest, fragment) = raw.split_once('#').unwrap_or((raw, ""));
    check_escapes(fragment)?;
    let (rest, query) = match rest.split_once('?') {
        Some((rest, query)) => (rest, Some(query)),
        None => (rest, None),
    };

    let mut path = rest;
    let mut has_scheme = false;
    if let Some((scheme, after)) = rest.split_once(':')
        && is_scheme(scheme)
    {
        if !after.starts_with('/') {
            return Ok(RequestTarget {
                path: "",
                query,
            });
        }
        has_scheme = true;
        path = after;
    } else if rest.split('/').next().is_some_and(|first| first.contains(':')) {
        return Err(InputError::Uri("first path segment in URL cannot contain colon".to_string()));
    }
    if (has_scheme || !path.starts_with("///"))
        && let Some(authority) = path.strip_prefix("//")
    {
        path = authority.find('/').map_or("", |index| &authority[index..]);
    }

    check_escapes(path)?;
    Ok(RequestTarget {
        path,
        query,
    })
}

/// Returns true when `candidate` is a URL scheme.
fn is_scheme(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    chars.next().is_some_and(|first| first.is_ascii_alphabetic())
        && chars.all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '+' | '-' | '.'))
}

/// Returns the byte offset of the first `%` not followed by two hex digits.
fn first_invalid_escape(component: &str) -> Option<usize> {
    let bytes = component.as_bytes();
    let mut index = 0;
    while index < bytes.len() {
        if bytes[index] != b'%' {
            index += 1;
            continue;
        }
        let valid = bytes.get(index + 1).is_some_and(u8::is_ascii_hexdigit)
            && bytes.get(index + 2).is_some_and(u8::is_ascii_hexdigit);
        if !valid {
            return Some(index);
        }
        index += 3;
    }
    None
}

/// Rejects a component containing a malformed `%` escape.
fn check_escapes(component: &str) -> Result<(), InputError> {
    let Some(start) = first_invalid_escape(component) else {
        return Ok(());
    };
    let end = (start + 3).min(component.len());
    let escape = String::from_utf8_lossy(&component.as_bytes()[start..end]);
    Err(InputError::Uri(format!("invalid URL escape \"{escape}\"")))
}

/// Percent-decodes a validated path; invalid UTF-8 decodes lossily.
fn decode_path(path: &str) -> String {
    String::from_utf8_lossy(&urlencoding::decode_binary(path.as_bytes())).into_owned()
}
