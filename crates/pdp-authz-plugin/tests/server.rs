// crates/pdp-authz-plugin/tests/server.rs
// ============================================================================
// Module: Plugin Server Tests
// Description: Unix-socket transport tests for the plugin endpoints.
// Purpose: Validate routing, content types, and verdict documents end to end.
// Dependencies: http-body-util, hyper, hyper-util, pdp-authz-plugin, tokio
// ============================================================================

//! ## Overview
//! Starts the plugin server on a temporary socket and drives it with an
//! HTTP/1.1 client, covering activation, authorization requests, malformed
//! payloads, and post-operation responses.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use common::MemoryLog;
use common::PDP_ADDR;
use common::StubClient;
use common::StubOutcome;
use common::mediator;
use common::write_config;
use http_body_util::BodyExt;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper_util::rt::TokioIo;
use pdp_authz_plugin::serve_unix;
use serde_json::Value;
use serde_json::json;
use tokio::net::UnixStream;
use tokio::task::JoinHandle;

// ============================================================================
// SECTION: Test Helpers
// ============================================================================

/// Running plugin server bound to a temporary socket.
struct TestServer {
    /// Socket path.
    socket: PathBuf,
    /// Server task.
    task: JoinHandle<()>,
    /// Scripted PDP client.
    client: Arc<StubClient>,
    /// Keeps the socket and config directory alive.
    _dir: tempfile::TempDir,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Starts a server whose PDP answers with `outcome`.
async fn start(outcome: StubOutcome, allow_on_failure: bool) -> TestServer {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), PDP_ADDR, allow_on_failure);
    let client = StubClient::new(outcome);
    let mediator =
        Arc::new(mediator(&config, false, client.clone(), Arc::new(MemoryLog::default())));
    let socket = dir.path().join("plugins").join("pdp-docker-authz.sock");

    let serve_path = socket.clone();
    let task = tokio::spawn(async move {
        serve_unix(&serve_path, mediator).await.unwrap();
    });
    for _ in 0..100 {
        if UnixStream::connect(&socket).await.is_ok() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    TestServer {
        socket,
        task,
        client,
        _dir: dir,
    }
}

/// Posts `body` to `route` and returns the content type and JSON document.
async fn post(socket: &Path, route: &str, body: &str) -> (String, Value) {
    let stream = UnixStream::connect(socket).await.unwrap();
    let (mut sender, connection) =
        hyper::client::conn::http1::handshake(TokioIo::new(stream)).await.unwrap();
    tokio::spawn(connection);

    let request = hyper::Request::builder()
        .method("POST")
        .uri(route)
        .header("Host", "plugin")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap();
    let response = sender.send_request(request).await.unwrap();
    assert_eq!(response.status(), 200);
    let content_type = response
        .headers()
        .get("content-type")
        .map(|value| value.to_str().unwrap().to_string())
        .unwrap_or_default();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (content_type, serde_json::from_slice(&bytes).unwrap())
}

/// Returns a host authorization request document.
fn authz_request() -> String {
    json!({
        "User": "alice",
        "UserAuthNMethod": "TLS",
        "RequestMethod": "GET",
        "RequestURI": "/v1.41/containers/json?all=1",
        "RequestBody": null,
        "RequestHeaders": {"Accept": "application/json"}
    })
    .to_string()
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn activation_advertises_authz() {
    let server = start(StubOutcome::Verdict(true), false).await;
    let (content_type, body) = post(&server.socket, "/Plugin.Activate", "").await;
    assert_eq!(content_type, "application/vnd.docker.plugins.v1+json");
    assert_eq!(body, json!({"Implements": ["authz"]}));
}

#[tokio::test(flavor = "multi_thread")]
async fn socket_is_group_accessible() {
    let server = start(StubOutcome::Verdict(true), false).await;
    let mode = std::fs::metadata(&server.socket).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o660);
}

#[tokio::test(flavor = "multi_thread")]
async fn authz_request_allowed_by_pdp() {
    let server = start(StubOutcome::Verdict(true), false).await;
    let (_, body) = post(&server.socket, "/AuthZPlugin.AuthZReq", &authz_request()).await;
    assert_eq!(body, json!({"Allow": true}));

    let calls = server.client.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].1.input.query["all"], vec!["1".to_string()]);
}

#[tokio::test(flavor = "multi_thread")]
async fn authz_request_denied_by_pdp() {
    let server = start(StubOutcome::Verdict(false), false).await;
    let (_, body) = post(&server.socket, "/AuthZPlugin.AuthZReq", &authz_request()).await;
    assert_eq!(
        body,
        json!({"Allow": false, "Msg": "request rejected by administrative policy"})
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn authz_request_pdp_failure_reports_error() {
    let server = start(StubOutcome::Fail("connection refused".to_string()), false).await;
    let (_, body) = post(&server.socket, "/AuthZPlugin.AuthZReq", &authz_request()).await;
    assert_eq!(body, json!({"Allow": false, "Err": "connection refused"}));
}

#[tokio::test(flavor = "multi_thread")]
async fn malformed_authz_request_fails_without_pdp_call() {
    let server = start(StubOutcome::Verdict(true), true).await;
    let (_, body) = post(&server.socket, "/AuthZPlugin.AuthZReq", "not json").await;
    assert_eq!(body["Allow"], false);
    assert!(body["Err"].as_str().unwrap().starts_with("invalid authorization request"));
    assert!(server.client.calls().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn authz_response_always_allows() {
    let server = start(StubOutcome::Verdict(false), false).await;
    let (_, body) = post(&server.socket, "/AuthZPlugin.AuthZRes", &authz_request()).await;
    assert_eq!(body, json!({"Allow": true}));
    assert!(server.client.calls().is_empty());
}
