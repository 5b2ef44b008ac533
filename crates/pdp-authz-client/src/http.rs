// crates/pdp-authz-client/src/http.rs
// ============================================================================
// Module: HTTP Decision Client
// Description: DecisionClient backed by a blocking HTTP POST.
// Purpose: Send decision inputs to the PDP and parse its verdict.
// Dependencies: pdp-authz-core, reqwest, serde_json
// ============================================================================

//! ## Overview
//! The HTTP client POSTs the serialized decision input as
//! `application/json`, reads the whole response body, and extracts the
//! verdict with [`pdp_authz_core::extract_verdict`]. The HTTP status is not
//! interpreted: policy services may answer non-2xx with a usable body.
//!
//! Response bodies are unbounded unless `max_response_bytes` is set, in which
//! case oversized bodies are rejected rather than truncated.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::error::Error as StdError;
use std::io::Read;
use std::time::Duration;

use pdp_authz_core::DecisionClient;
use pdp_authz_core::DecisionError;
use pdp_authz_core::DecisionInput;
use pdp_authz_core::PdpDecision;
use pdp_authz_core::extract_verdict;
use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::blocking::Response;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use serde_json::Value;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Default PDP request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 3_000;
/// Maximum redirects followed for a decision request.
const MAX_REDIRECTS: usize = 10;

/// Configuration for the HTTP decision client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpDecisionClientConfig {
    /// Request timeout in milliseconds, covering connect and body read.
    pub timeout_ms: u64,
    /// Optional response size limit in bytes; `None` reads the full body.
    pub max_response_bytes: Option<usize>,
    /// User agent string for outbound requests.
    pub user_agent: String,
}

impl Default for HttpDecisionClientConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_response_bytes: None,
            user_agent: format!("pdp-docker-authz/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

// ============================================================================
// SECTION: Client Implementation
// ============================================================================

/// Decision client for HTTP policy decision services.
pub struct HttpDecisionClient {
    /// Client configuration, including limits.
    config: HttpDecisionClientConfig,
    /// HTTP client used for outbound requests.
    client: Client,
}

impl HttpDecisionClient {
    /// Creates a new HTTP decision client with the given configuration.
    ///
    /// Must be called outside an async runtime context.
    ///
    /// # Errors
    ///
    /// Returns [`DecisionError::Request`] when the HTTP client cannot be created.
    pub fn new(config: HttpDecisionClientConfig) -> Result<Self, DecisionError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .redirect(Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|err| DecisionError::Request(error_chain(&err)))?;
        Ok(Self {
            config,
            client,
        })
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &HttpDecisionClientConfig {
        &self.config
    }
}

impl DecisionClient for HttpDecisionClient {
    fn evaluate(
        &self,
        endpoint: &str,
        input: &DecisionInput,
    ) -> Result<PdpDecision, DecisionError> {
        let url = Url::parse(endpoint)
            .map_err(|err| DecisionError::Request(format!("invalid pdp address {endpoint}: {err}")))?;
        let body =
            serde_json::to_vec(input).map_err(|err| DecisionError::Request(err.to_string()))?;

        let mut response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .map_err(|err| DecisionError::Request(error_chain(&err)))?;
        let bytes = read_response(&mut response, self.config.max_response_bytes)?;

        let parsed: Value = serde_json::from_slice(&bytes)
            .map_err(|err| DecisionError::Response(err.to_string()))?;
        let allowed =
            extract_verdict(&parsed).map_err(|err| DecisionError::Response(err.to_string()))?;
        Ok(PdpDecision {
            allowed,
            response: parsed,
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads the response body, enforcing the optional byte limit.
fn read_response(response: &mut Response, max_bytes: Option<usize>) -> Result<Vec<u8>, DecisionError> {
    let mut buf = Vec::new();
    let Some(max_bytes) = max_bytes else {
        response.read_to_end(&mut buf).map_err(|err| read_error(&err))?;
        return Ok(buf);
    };

    let max_bytes_u64 = u64::try_from(max_bytes)
        .map_err(|_| DecisionError::Response("response size limit exceeds u64".to_string()))?;
    if let Some(expected) = response.content_length()
        && expected > max_bytes_u64
    {
        return Err(DecisionError::Response("pdp response exceeds size limit".to_string()));
    }
    let mut handle = response.take(max_bytes_u64.saturating_add(1));
    handle.read_to_end(&mut buf).map_err(|err| read_error(&err))?;
    if buf.len() > max_bytes {
        return Err(DecisionError::Response("pdp response exceeds size limit".to_string()));
    }
    Ok(buf)
}

/// Maps a body read failure.
fn read_error(err: &std::io::Error) -> DecisionError {
    DecisionError::Response(format!("failed to read response: {}", error_chain(err)))
}

/// Renders an error with its source chain, outermost first.
fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
