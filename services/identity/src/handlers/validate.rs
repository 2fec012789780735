use axum::{Json, extract::State};
use axum_extra::TypedHeader;
use axum_extra::headers::{Authorization, authorization::Bearer};
use serde::Serialize;
use uuid::Uuid;

use crate::error::IdentityServiceError;
use crate::state::AppState;
use crate::usecase::session::ResolveAccessUseCase;

#[derive(Serialize)]
pub struct UserIdResponse {
    pub user_id: Uuid,
}

// ── GET /validate ─────────────────────────────────────────────────────────────

/// Resolve the bearer access token to a user id.
///
/// The gateway calls this once per protected request and injects the
/// resulting id as the `x-user-id` header before forwarding.
pub async fn validate(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
) -> Result<Json<UserIdResponse>, IdentityServiceError> {
    let TypedHeader(authorization) = bearer.ok_or(IdentityServiceError::Unauthorized)?;

    let usecase = ResolveAccessUseCase {
        sessions: state.session_repo(),
        jwt_secret: state.tokens.jwt_secret.clone(),
    };
    let user_id = usecase.execute(authorization.token()).await?;

    Ok(Json(UserIdResponse { user_id }))
}
