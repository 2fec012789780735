use std::time::Duration;

use sea_orm::Database;
use tracing::info;

use gatehouse_identity::config::IdentityConfig;
use gatehouse_identity::infra::notify::HttpNotifier;
use gatehouse_identity::router::build_router;
use gatehouse_identity::state::AppState;

#[tokio::main]
async fn main() {
    gatehouse_core::tracing::init_tracing();

    let config = IdentityConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .expect("failed to build HTTP client");

    let state = AppState {
        db,
        notifier: HttpNotifier {
            client,
            base_url: config.notifier_url,
        },
        tokens: config.tokens,
        otp: config.otp,
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.identity_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("identity service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
