//! Trust-gate middleware and HTTP surface tests
//!
//! Drives the real router with `tower::ServiceExt::oneshot`, covering the
//! origin-resolution scenarios: trusted bypass, engine-path authentication,
//! malformed forwarded addresses, and public endpoints.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use base64::prelude::{Engine as _, BASE64_STANDARD};
use hearth_auth::access::{bake, AccessEngine};
use hearth_auth::config::{RoleConfig, RuleConfig};
use hearth_auth::identity::FileStore;
use hearth_auth::server::{router, ServerState, TrustedNetworks};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

// =============================================================================
// Test Helpers
// =============================================================================

fn alice_roles() -> Vec<RoleConfig> {
    vec![RoleConfig {
        name: "a".into(),
        users: vec!["alice".into()],
        rules: vec![RuleConfig {
            system: "*".into(),
            resources: vec!["res".into()],
            verbs: vec!["*".into()],
        }],
    }]
}

/// Router backed by a file store knowing only alice.
fn app() -> axum::Router {
    let engine = AccessEngine::with_parts(
        bake(&alice_roles()),
        Arc::new(FileStore::parse("alice:s3cret")),
    );
    router(ServerState {
        engine: Arc::new(engine),
        trusted: Arc::new(TrustedNetworks::default()),
    })
}

fn basic_auth(user: &str, secret: &str) -> String {
    format!("Basic {}", BASE64_STANDARD.encode(format!("{user}:{secret}")))
}

async fn get(app: axum::Router, uri: &str, headers: &[(&str, &str)]) -> (StatusCode, Value) {
    let mut request = Request::builder().uri(uri);
    for (name, value) in headers {
        request = request.header(*name, *value);
    }
    let response = app
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

// =============================================================================
// Public endpoints
// =============================================================================

#[tokio::test]
async fn ping_bypasses_the_gate_entirely() {
    let (status, _) = get(app(), "/pub/ping", &[]).await;
    assert_eq!(status, StatusCode::OK);
}

// =============================================================================
// Trusted origins
// =============================================================================

#[tokio::test]
async fn private_origin_bypasses_the_engine() {
    // No credentials at all: only the allowlist can let this through.
    let (status, body) = get(
        app(),
        "/api/v1/whoami",
        &[("X-Forwarded-For", "10.0.0.1")],
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["trusted"], Value::Bool(true));
    assert_eq!(body["username"], Value::Null);
}

#[tokio::test]
async fn trusted_caller_is_allowed_everything() {
    let (status, body) = get(
        app(),
        "/api/v1/check?system=device&resource=anything&verb=command",
        &[("X-Forwarded-For", "192.168.1.50")],
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["allowed"], Value::Bool(true));
}

// =============================================================================
// External origins go through the engine
// =============================================================================

#[tokio::test]
async fn external_origin_without_credentials_is_denied() {
    let (status, _) = get(
        app(),
        "/api/v1/whoami",
        &[("X-Forwarded-For", "245.0.0.0")],
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn external_origin_with_credentials_is_resolved() {
    let auth = basic_auth("alice", "s3cret");
    let (status, body) = get(
        app(),
        "/api/v1/whoami",
        &[
            ("X-Forwarded-For", "245.0.0.0"),
            ("Authorization", auth.as_str()),
        ],
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["trusted"], Value::Bool(false));
    assert_eq!(body["username"], Value::String("alice".into()));
    assert_eq!(body["systems"], serde_json::json!(["*"]));
}

#[tokio::test]
async fn external_caller_gets_role_scoped_decisions() {
    let auth = basic_auth("alice", "s3cret");
    let headers = [
        ("X-Forwarded-For", "245.0.0.0"),
        ("Authorization", auth.as_str()),
    ];

    let (status, body) = get(
        app(),
        "/api/v1/check?system=device&resource=res&verb=command",
        &headers,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["allowed"], Value::Bool(true));

    let (status, body) = get(
        app(),
        "/api/v1/check?system=device&resource=other&verb=get",
        &headers,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["allowed"], Value::Bool(false));
}

#[tokio::test]
async fn wrong_credentials_are_denied() {
    let auth = basic_auth("alice", "wrong");
    let (status, _) = get(
        app(),
        "/api/v1/whoami",
        &[
            ("X-Forwarded-For", "245.0.0.0"),
            ("Authorization", auth.as_str()),
        ],
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Malformed origins fail closed
// =============================================================================

#[tokio::test]
async fn malformed_forwarded_address_routes_to_engine_and_denies() {
    let (status, _) = get(
        app(),
        "/api/v1/whoami",
        &[("X-Forwarded-For", "512.0.0.0")],
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_forwarded_address_does_not_fall_back_to_direct_origin() {
    // The direct origin is trusted, but the forwarded hint is garbage;
    // resolution fails and the engine path still applies.
    let (status, _) = get(
        app(),
        "/api/v1/whoami",
        &[
            ("X-Forwarded-For", "512.0.0.0"),
            ("X-Real-IP", "10.0.0.1"),
        ],
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_forwarded_address_with_credentials_uses_engine() {
    let auth = basic_auth("alice", "s3cret");
    let (status, body) = get(
        app(),
        "/api/v1/whoami",
        &[
            ("X-Forwarded-For", "512.0.0.0"),
            ("Authorization", auth.as_str()),
        ],
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], Value::String("alice".into()));
}

// =============================================================================
// Parameter validation
// =============================================================================

#[tokio::test]
async fn unknown_system_or_verb_is_bad_request() {
    let auth = basic_auth("alice", "s3cret");
    let headers = [
        ("X-Forwarded-For", "245.0.0.0"),
        ("Authorization", auth.as_str()),
    ];

    let (status, _) = get(
        app(),
        "/api/v1/check?system=wrong&resource=res&verb=get",
        &headers,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(
        app(),
        "/api/v1/check?system=device&resource=res&verb=delete",
        &headers,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
