use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::json;
use uuid::Uuid;

use gatehouse_gateway::router::build_router;

use crate::helpers::{
    MockIdentityState, dead_backend, gateway_state, hit_counter, hits, mock_identity,
    mock_storage, spawn_backend,
};

struct Fixture {
    server: TestServer,
    identity: MockIdentityState,
}

async fn fixture_with_storage(storage_url: &str) -> Fixture {
    let identity = MockIdentityState {
        user_id: Uuid::new_v4(),
        validate_hits: hit_counter(),
        backend_hits: hit_counter(),
    };
    let identity_url = spawn_backend(mock_identity(identity.clone())).await;
    let state = gateway_state(&identity_url, storage_url);
    Fixture {
        server: TestServer::new(build_router(state)).unwrap(),
        identity,
    }
}

async fn fixture() -> Fixture {
    let storage_url = dead_backend().await;
    fixture_with_storage(&storage_url).await
}

// ── Allow-list ───────────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn should_forward_public_paths_without_a_validate_round_trip() {
    let f = fixture().await;

    let response = f
        .server
        .post("/auth/login")
        .json(&json!({ "email": "a@example.com", "password": "pw" }))
        .await;

    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["access_token"], "issued-access");
    assert_eq!(hits(&f.identity.validate_hits), 0);
    assert_eq!(hits(&f.identity.backend_hits), 1);
}

// ── Protected forwarding ─────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn should_inject_resolved_identity_into_the_forwarded_request() {
    let f = fixture().await;

    let response = f
        .server
        .get("/users/me")
        .add_header("authorization", "Bearer good-token")
        .await;

    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["user_id"], f.identity.user_id.to_string());
    assert_eq!(hits(&f.identity.validate_hits), 1);
    assert_eq!(hits(&f.identity.backend_hits), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn should_strip_content_length_from_the_forwarded_request() {
    let f = fixture().await;

    let response = f
        .server
        .get("/users/me")
        .add_header("authorization", "Bearer good-token")
        .add_header("content-length", "0")
        .await;

    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    // reqwest re-derives the length for the empty body; the inbound value
    // must not leak through.
    assert_eq!(body["has_content_length"], false);
}

#[tokio::test(flavor = "multi_thread")]
async fn should_forward_query_strings_unchanged() {
    let f = fixture().await;

    let response = f
        .server
        .get("/users/me")
        .add_query_param("page", "2")
        .add_header("authorization", "Bearer good-token")
        .await;

    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["query"], "page=2");
}

#[tokio::test(flavor = "multi_thread")]
async fn should_pass_downstream_errors_through_verbatim() {
    let f = fixture().await;

    let response = f
        .server
        .get("/users/boom")
        .add_header("authorization", "Bearer good-token")
        .await;

    response.assert_status(StatusCode::IM_A_TEAPOT);
    assert_eq!(response.text(), "teapot");
}

// ── Fail closed ──────────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn should_echo_identity_rejection_and_never_reach_the_backend() {
    let f = fixture().await;

    let response = f
        .server
        .get("/users/me")
        .add_header("authorization", "Bearer forged-token")
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["kind"], "UPSTREAM_ERROR");
    assert_eq!(body["service"], "identity");
    assert_eq!(body["detail"], "token invalid");
    assert_eq!(hits(&f.identity.backend_hits), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn should_reject_protected_request_without_authorization_header() {
    let f = fixture().await;

    let response = f.server.get("/users/me").await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["kind"], "UPSTREAM_ERROR");
    assert_eq!(hits(&f.identity.backend_hits), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn should_fail_closed_when_identity_is_unreachable() {
    let identity_url = dead_backend().await;
    let storage_url = dead_backend().await;
    let server = TestServer::new(build_router(gateway_state(&identity_url, &storage_url))).unwrap();

    let response = server
        .get("/users/me")
        .add_header("authorization", "Bearer good-token")
        .await;

    response.assert_status(StatusCode::BAD_GATEWAY);
    let body: serde_json::Value = response.json();
    assert_eq!(body["kind"], "UPSTREAM_UNAVAILABLE");
    assert_eq!(body["service"], "identity");
}

// ── Storage route ────────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn should_proxy_storage_with_the_prefix_stripped() {
    let storage_url = spawn_backend(mock_storage()).await;
    let f = fixture_with_storage(&storage_url).await;

    let response = f
        .server
        .get("/storage/objects/42")
        .add_header("authorization", "Bearer good-token")
        .await;

    response.assert_status(StatusCode::OK);
    assert_eq!(response.text(), "blob-42");
    assert_eq!(hits(&f.identity.validate_hits), 1);
}
