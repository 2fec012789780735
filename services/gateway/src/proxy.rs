//! Verbatim request forwarding with identity injection.

use axum::body::{Body, to_bytes};
use axum::extract::{Request, State};
use axum::http::{HeaderName, HeaderValue, header};
use axum::response::Response;

use crate::authorize::authorize;
use crate::error::GatewayError;
use crate::state::AppState;

const X_USER_ID: &str = "x-user-id";

/// Forwarded bodies are buffered; anything larger belongs on the storage
/// service's direct upload path.
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

// ── ANY /auth/{*path}, ANY /users/{*path} ─────────────────────────────────────

pub async fn proxy_identity(
    State(state): State<AppState>,
    req: Request,
) -> Result<Response, GatewayError> {
    let base_url = state.identity_url.clone();
    forward(&state, "identity", &base_url, None, req).await
}

// ── ANY /storage/{*path} ──────────────────────────────────────────────────────

pub async fn proxy_storage(
    State(state): State<AppState>,
    req: Request,
) -> Result<Response, GatewayError> {
    let base_url = state.storage_url.clone();
    forward(&state, "storage", &base_url, Some("/storage"), req).await
}

/// Forward a request to `base_url` after the identity check.
///
/// Method, path (optionally with `strip_prefix` removed), query, headers and
/// body travel unchanged, except that `Content-Length` and `Host` are dropped
/// (re-derived by the client) and the resolved `x-user-id` is injected. The
/// downstream response is returned verbatim, error statuses included.
async fn forward(
    state: &AppState,
    service: &'static str,
    base_url: &str,
    strip_prefix: Option<&str>,
    req: Request,
) -> Result<Response, GatewayError> {
    let (parts, body) = req.into_parts();
    let path = parts.uri.path().to_owned();

    let user_id = authorize(state, &path, &parts.headers).await?;

    let upstream_path = match strip_prefix {
        Some(prefix) => path.strip_prefix(prefix).unwrap_or(&path),
        None => &path,
    };
    let url = match parts.uri.query() {
        Some(query) => format!("{base_url}{upstream_path}?{query}"),
        None => format!("{base_url}{upstream_path}"),
    };

    let body = to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|_| GatewayError::Unavailable { service })?;

    let mut headers = parts.headers.clone();
    // Content-Length will not match after the body round-trip, and Host
    // belongs to the upstream connection; the client re-derives both.
    headers.remove(header::CONTENT_LENGTH);
    headers.remove(header::HOST);
    if let Some(user_id) = user_id {
        headers.insert(
            HeaderName::from_static(X_USER_ID),
            HeaderValue::from_str(&user_id.to_string()).unwrap(),
        );
    }

    let mut request = state.client.request(parts.method, &url).headers(headers);
    // Bodyless methods stay bodyless; attaching an empty body would re-add
    // a Content-Length the upstream never asked for.
    if !body.is_empty() {
        request = request.body(body);
    }

    let response = request
        .send()
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, service, "request forward failed");
            GatewayError::Unavailable { service }
        })?;

    let status = response.status();
    let mut builder = Response::builder().status(status);
    for (name, value) in response.headers() {
        if is_hop_by_hop(name) {
            continue;
        }
        builder = builder.header(name, value);
    }
    let bytes = response
        .bytes()
        .await
        .map_err(|_| GatewayError::Unavailable { service })?;

    Ok(builder.body(Body::from(bytes)).expect("response build"))
}

fn is_hop_by_hop(name: &HeaderName) -> bool {
    matches!(
        name.as_str(),
        "connection" | "keep-alive" | "transfer-encoding" | "content-length" | "upgrade"
    )
}
