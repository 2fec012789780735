//! Perimeter contract: protected handlers trust only the gateway-injected
//! `x-user-id` header and reject requests that lack it.

use axum::{Json, Router, http::StatusCode, routing::get};
use axum_test::TestServer;
use uuid::Uuid;

use gatehouse_auth_types::identity::IdentityHeader;
use gatehouse_testing::auth::MockIdentity;

async fn whoami(identity: IdentityHeader) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "user_id": identity.user_id }))
}

fn app() -> TestServer {
    TestServer::new(Router::new().route("/whoami", get(whoami))).unwrap()
}

#[tokio::test]
async fn should_accept_gateway_injected_identity() {
    let server = app();
    let user_id = Uuid::new_v4();

    let mut request = server.get("/whoami");
    for (name, value) in MockIdentity::new(user_id).headers().iter() {
        request = request.add_header(name.clone(), value.clone());
    }
    let response = request.await;

    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["user_id"], user_id.to_string());
}

#[tokio::test]
async fn should_reject_request_without_identity_header() {
    let server = app();
    let response = server.get("/whoami").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_reject_request_with_garbage_identity_header() {
    let server = app();
    let response = server.get("/whoami").add_header("x-user-id", "zzz").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}
