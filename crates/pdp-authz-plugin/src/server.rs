// crates/pdp-authz-plugin/src/server.rs
// ============================================================================
// Module: Plugin Server
// Description: Authorization-plugin HTTP endpoints over a Unix socket.
// Purpose: Expose the enforcement mediator to the container host.
// Dependencies: axum, pdp-authz-core, serde_json, tokio
// ============================================================================

//! ## Overview
//! The host discovers the plugin by its socket under the plugin directory and
//! speaks HTTP/1.1 to it. Every route answers `200` with a plugin JSON
//! document; failures are expressed in the document's `Err` field rather than
//! in the HTTP status. Decisions run on the blocking pool because the PDP
//! call is synchronous.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::post;
use pdp_authz_core::InterceptedRequest;
use pdp_authz_core::Verdict;
use serde::Serialize;
use thiserror::Error;
use tokio::net::UnixListener;

use crate::mediator::EnforcementMediator;
use crate::protocol::ACTIVATE_PATH;
use crate::protocol::AUTHZ_REQUEST_PATH;
use crate::protocol::AUTHZ_RESPONSE_PATH;
use crate::protocol::ActivateResponse;
use crate::protocol::AuthzRequest;
use crate::protocol::AuthzResponse;
use crate::protocol::PLUGIN_CONTENT_TYPE;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Socket file permissions; the host runs as root or the socket group.
const SOCKET_MODE: u32 = 0o660;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Plugin server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Socket setup failed.
    #[error("socket error: {0}")]
    Io(#[from] io::Error),
    /// The server loop terminated with an error.
    #[error("server failed: {0}")]
    Serve(String),
}

// ============================================================================
// SECTION: Server
// ============================================================================

/// Builds the plugin router around a mediator.
pub fn router(mediator: Arc<EnforcementMediator>) -> Router {
    Router::new()
        .route(ACTIVATE_PATH, post(handle_activate))
        .route(AUTHZ_REQUEST_PATH, post(handle_authz_request))
        .route(AUTHZ_RESPONSE_PATH, post(handle_authz_response))
        .with_state(mediator)
}

/// Serves the plugin on a Unix socket until interrupted.
///
/// A stale socket file at `socket_path` is replaced. The socket is removed
/// again on shutdown.
///
/// # Errors
///
/// Returns [`ServerError`] when the socket cannot be bound or serving fails.
pub async fn serve_unix(
    socket_path: &Path,
    mediator: Arc<EnforcementMediator>,
) -> Result<(), ServerError> {
    if let Some(parent) = socket_path.parent() {
        fs::create_dir_all(parent)?;
    }
    match fs::remove_file(socket_path) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err.into()),
    }
    let listener = UnixListener::bind(socket_path)?;
    fs::set_permissions(socket_path, fs::Permissions::from_mode(SOCKET_MODE))?;

    let outcome = axum::serve(listener, router(mediator))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| ServerError::Serve(err.to_string()));
    let _ = fs::remove_file(socket_path);
    outcome
}

/// Resolves when the process receives an interrupt.
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

/// Handles the activation handshake.
async fn handle_activate() -> Response {
    plugin_json(&ActivateResponse::authz())
}

/// Handles pre-operation authorization.
async fn handle_authz_request(
    State(mediator): State<Arc<EnforcementMediator>>,
    bytes: Bytes,
) -> Response {
    let request = match serde_json::from_slice::<AuthzRequest>(&bytes) {
        Ok(request) => InterceptedRequest::from(request),
        Err(err) => {
            let verdict = Verdict::Fail {
                error: format!("invalid authorization request: {err}"),
            };
            return plugin_json(&AuthzResponse::from(verdict));
        }
    };
    let verdict = tokio::task::spawn_blocking(move || mediator.decide(&request))
        .await
        .unwrap_or_else(|err| Verdict::Fail {
            error: format!("decision task failed: {err}"),
        });
    plugin_json(&AuthzResponse::from(verdict))
}

/// Handles post-operation authorization; the payload is not inspected.
async fn handle_authz_response(
    State(mediator): State<Arc<EnforcementMediator>>,
) -> Response {
    let verdict = mediator.after_response(&InterceptedRequest::default());
    plugin_json(&AuthzResponse::from(verdict))
}

/// Renders a plugin JSON document.
fn plugin_json<T: Serialize>(payload: &T) -> Response {
    let body = serde_json::to_string(payload).unwrap_or_else(|err| {
        format!("{{\"Allow\":false,\"Err\":\"response serialization failed: {err}\"}}")
    });
    ([(CONTENT_TYPE, PLUGIN_CONTENT_TYPE)], body).into_response()
}
