use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Gateway error variants. The gateway fails closed: any of these aborts the
/// request before it reaches a downstream service.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// An upstream answered with an error status; status and detail are
    /// echoed to the caller verbatim.
    #[error("{service}: {detail}")]
    Upstream {
        service: &'static str,
        status: StatusCode,
        detail: String,
    },
    /// The upstream could not be reached at all (connect error, timeout,
    /// malformed reply).
    #[error("{service}: request forward error")]
    Unavailable { service: &'static str },
}

impl GatewayError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Upstream { .. } => "UPSTREAM_ERROR",
            Self::Unavailable { .. } => "UPSTREAM_UNAVAILABLE",
        }
    }

    fn service(&self) -> &'static str {
        match self {
            Self::Upstream { service, .. } | Self::Unavailable { service } => service,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Upstream { status, .. } => *status,
            Self::Unavailable { .. } => StatusCode::BAD_GATEWAY,
        };
        let detail = match &self {
            Self::Upstream { detail, .. } => detail.clone(),
            Self::Unavailable { .. } => "request forward error".to_owned(),
        };
        let body = serde_json::json!({
            "kind": self.kind(),
            "service": self.service(),
            "detail": detail,
        });
        (status, axum::Json(body)).into_response()
    }
}
