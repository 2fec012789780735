use std::time::Duration;

use tracing::info;

use gatehouse_gateway::config::GatewayConfig;
use gatehouse_gateway::router::build_router;
use gatehouse_gateway::state::AppState;

#[tokio::main]
async fn main() {
    gatehouse_core::tracing::init_tracing();

    let config = GatewayConfig::from_env();

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.upstream_timeout_secs))
        .build()
        .expect("failed to build HTTP client");

    let state = AppState {
        client,
        identity_url: config.identity_url,
        storage_url: config.storage_url,
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.gateway_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("gateway listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
