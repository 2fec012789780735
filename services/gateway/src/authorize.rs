//! Synchronous identity check performed before any protected forward.

use axum::http::{HeaderMap, StatusCode, header};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::GatewayError;
use crate::state::AppState;

pub const IDENTITY_SERVICE: &str = "identity";

/// Paths reachable without a token. Everything else pays one validate
/// round-trip before it is forwarded.
pub const PUBLIC_PATHS: &[&str] = &[
    "/auth/register",
    "/auth/login",
    "/auth/send_otp",
    "/auth/verify_otp",
    "/auth/reset_password/otp",
    "/auth/refresh",
];

#[derive(Deserialize)]
struct ValidateResponse {
    user_id: Uuid,
}

/// Resolve the caller's identity for a protected path.
///
/// Returns `None` for allow-listed paths. For everything else the inbound
/// `Authorization` header is replayed against the identity service's
/// `/validate`; the gateway fails closed — transport failures, non-2xx
/// answers, and malformed bodies all abort the request, nothing is ever
/// forwarded on an ambiguous outcome.
pub async fn authorize(
    state: &AppState,
    path: &str,
    headers: &HeaderMap,
) -> Result<Option<Uuid>, GatewayError> {
    if PUBLIC_PATHS.contains(&path) {
        return Ok(None);
    }

    let mut request = state.client.get(format!("{}/validate", state.identity_url));
    if let Some(authorization) = headers.get(header::AUTHORIZATION) {
        request = request.header(header::AUTHORIZATION, authorization.as_bytes());
    }

    let response = request.send().await.map_err(|e| {
        tracing::warn!(error = %e, "identity validate call failed");
        GatewayError::Unavailable {
            service: IDENTITY_SERVICE,
        }
    })?;

    let status = response.status();
    if !status.is_success() {
        let detail = error_detail(response).await;
        return Err(GatewayError::Upstream {
            service: IDENTITY_SERVICE,
            status: StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY),
            detail,
        });
    }

    let body: ValidateResponse =
        response
            .json()
            .await
            .map_err(|_| GatewayError::Unavailable {
                service: IDENTITY_SERVICE,
            })?;
    Ok(Some(body.user_id))
}

/// Extract the `detail` field from an upstream error body, falling back to
/// the raw text.
pub(crate) async fn error_detail(response: reqwest::Response) -> String {
    let text = response.text().await.unwrap_or_default();
    serde_json::from_str::<serde_json::Value>(&text)
        .ok()
        .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_owned))
        .unwrap_or(text)
}
