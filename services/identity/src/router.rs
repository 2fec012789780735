use axum::{
    Router,
    routing::{get, patch, post},
};
use tower_http::trace::TraceLayer;

use gatehouse_core::health::{healthz, readyz};
use gatehouse_core::middleware::request_id_layer;

use crate::handlers::{
    auth::{
        login, logout, refresh, register, reset_password, reset_password_otp, send_otp, verify_otp,
    },
    users::{get_me, get_user, update_me},
    validate::validate,
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Account
        .route("/auth/register", post(register))
        .route("/auth/send_otp", post(send_otp))
        .route("/auth/verify_otp", post(verify_otp))
        // Sessions
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/logout", post(logout))
        // Password
        .route("/auth/reset_password", post(reset_password))
        .route("/auth/reset_password/otp", post(reset_password_otp))
        // Token resolution (called by the gateway, not end users)
        .route("/validate", get(validate))
        // Profiles
        .route("/users/me", get(get_me))
        .route("/users/me", patch(update_me))
        .route("/users/{username}", get(get_user))
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
