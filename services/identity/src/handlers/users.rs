use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use gatehouse_auth_types::identity::IdentityHeader;
use gatehouse_domain::user::Lookup;

use crate::domain::types::User;
use crate::error::IdentityServiceError;
use crate::state::AppState;
use crate::usecase::account::{GetUserUseCase, UpdateProfileInput, UpdateProfileUseCase};

#[derive(Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub username: String,
    pub full_name: String,
    pub bio: Option<String>,
    pub is_verified: bool,
    #[serde(serialize_with = "gatehouse_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "gatehouse_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl UserResponse {
    pub fn from_user(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email,
            username: user.username,
            full_name: user.full_name,
            bio: user.bio,
            is_verified: user.is_verified,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

// ── GET /users/me ─────────────────────────────────────────────────────────────

pub async fn get_me(
    identity: IdentityHeader,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, IdentityServiceError> {
    let usecase = GetUserUseCase {
        users: state.user_repo(),
    };
    let user = usecase.execute(Lookup::ById(identity.user_id)).await?;
    Ok(Json(UserResponse::from_user(user)))
}

// ── PATCH /users/me ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateMeRequest {
    pub full_name: Option<String>,
    pub bio: Option<String>,
}

pub async fn update_me(
    identity: IdentityHeader,
    State(state): State<AppState>,
    Json(body): Json<UpdateMeRequest>,
) -> Result<StatusCode, IdentityServiceError> {
    let usecase = UpdateProfileUseCase {
        users: state.user_repo(),
    };
    usecase
        .execute(
            identity.user_id,
            UpdateProfileInput {
                full_name: body.full_name,
                bio: body.bio,
            },
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── GET /users/{username} ─────────────────────────────────────────────────────

pub async fn get_user(
    _identity: IdentityHeader,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<UserResponse>, IdentityServiceError> {
    let usecase = GetUserUseCase {
        users: state.user_repo(),
    };
    let user = usecase.execute(Lookup::ByUsername(username)).await?;
    Ok(Json(UserResponse::from_user(user)))
}
