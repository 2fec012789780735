use axum::{Router, routing::any, routing::get};
use tower_http::trace::TraceLayer;

use gatehouse_core::health::{healthz, readyz};
use gatehouse_core::middleware::request_id_layer;

use crate::proxy::{proxy_identity, proxy_storage};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Identity service
        .route("/auth/{*path}", any(proxy_identity))
        .route("/users/{*path}", any(proxy_identity))
        // Storage service
        .route("/storage/{*path}", any(proxy_storage))
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
