use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};

use gatehouse_auth_types::identity::IdentityHeader;
use gatehouse_domain::user::Lookup;

use crate::error::IdentityServiceError;
use crate::handlers::users::UserResponse;
use crate::state::AppState;
use crate::usecase::account::{
    ChangePasswordInput, ChangePasswordUseCase, RegisterInput, RegisterUseCase,
    ResetPasswordByOtpInput, ResetPasswordByOtpUseCase,
};
use crate::usecase::otp::{
    SendOtpInput, SendOtpUseCase, VerifyOtpInput, VerifyOtpUseCase,
};
use crate::usecase::session::{
    LoginInput, LoginUseCase, RevokeSessionUseCase, RotateSessionUseCase,
};

#[derive(Serialize)]
pub struct TokenPairResponse {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: &str) -> Self {
        Self {
            message: message.to_owned(),
        }
    }
}

fn lookup_from(
    email: Option<String>,
    username: Option<String>,
) -> Result<Lookup, IdentityServiceError> {
    Lookup::from_fields(email, username).ok_or(IdentityServiceError::MissingData)
}

// ── POST /auth/register ───────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub full_name: String,
    pub bio: Option<String>,
    pub password: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<impl IntoResponse, IdentityServiceError> {
    let usecase = RegisterUseCase {
        users: state.user_repo(),
        otps: state.otp_repo(),
        notifier: state.notifier.clone(),
        otp_settings: state.otp.clone(),
    };

    let user = usecase
        .execute(RegisterInput {
            email: body.email,
            username: body.username,
            full_name: body.full_name,
            bio: body.bio,
            password: body.password,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from_user(user))))
}

// ── POST /auth/login ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<TokenPairResponse>, IdentityServiceError> {
    let usecase = LoginUseCase {
        users: state.user_repo(),
        credentials: state.credential_repo(),
        sessions: state.session_repo(),
        tokens: state.tokens.clone(),
    };

    let tokens = usecase
        .execute(LoginInput {
            lookup: lookup_from(body.email, body.username)?,
            password: body.password,
        })
        .await?;

    Ok(Json(TokenPairResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
    }))
}

// ── POST /auth/refresh ────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> Result<Json<TokenPairResponse>, IdentityServiceError> {
    let usecase = RotateSessionUseCase {
        sessions: state.session_repo(),
        users: state.user_repo(),
        tokens: state.tokens.clone(),
    };

    let tokens = usecase.execute(&body.refresh_token).await?;

    Ok(Json(TokenPairResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
    }))
}

// ── POST /auth/logout ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LogoutRequest {
    pub refresh_token: String,
}

pub async fn logout(
    State(state): State<AppState>,
    Json(body): Json<LogoutRequest>,
) -> Result<Json<MessageResponse>, IdentityServiceError> {
    let usecase = RevokeSessionUseCase {
        sessions: state.session_repo(),
        tokens: state.tokens.clone(),
    };

    usecase.execute(&body.refresh_token).await?;

    Ok(Json(MessageResponse::new("Successfully logged out")))
}

// ── POST /auth/send_otp ───────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SendOtpRequest {
    pub email: Option<String>,
    pub username: Option<String>,
}

pub async fn send_otp(
    State(state): State<AppState>,
    Json(body): Json<SendOtpRequest>,
) -> Result<Json<MessageResponse>, IdentityServiceError> {
    let usecase = SendOtpUseCase {
        users: state.user_repo(),
        otps: state.otp_repo(),
        notifier: state.notifier.clone(),
        settings: state.otp.clone(),
    };

    usecase
        .execute(SendOtpInput {
            lookup: lookup_from(body.email, body.username)?,
        })
        .await?;

    Ok(Json(MessageResponse::new("OTP sent")))
}

// ── POST /auth/verify_otp ─────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyOtpRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    pub otp: String,
}

pub async fn verify_otp(
    State(state): State<AppState>,
    Json(body): Json<VerifyOtpRequest>,
) -> Result<Json<MessageResponse>, IdentityServiceError> {
    let usecase = VerifyOtpUseCase {
        users: state.user_repo(),
        otps: state.otp_repo(),
    };

    usecase
        .execute(VerifyOtpInput {
            lookup: lookup_from(body.email, body.username)?,
            otp: body.otp,
        })
        .await?;

    Ok(Json(MessageResponse::new("OTP verified")))
}

// ── POST /auth/reset_password ─────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

pub async fn reset_password(
    identity: IdentityHeader,
    State(state): State<AppState>,
    Json(body): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, IdentityServiceError> {
    let usecase = ChangePasswordUseCase {
        credentials: state.credential_repo(),
        sessions: state.session_repo(),
    };

    usecase
        .execute(ChangePasswordInput {
            user_id: identity.user_id,
            old_password: body.old_password,
            new_password: body.new_password,
        })
        .await?;

    Ok(Json(MessageResponse::new("Password updated successfully")))
}

// ── POST /auth/reset_password/otp ─────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ResetPasswordOtpRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    pub otp: String,
    pub new_password: String,
}

pub async fn reset_password_otp(
    State(state): State<AppState>,
    Json(body): Json<ResetPasswordOtpRequest>,
) -> Result<Json<MessageResponse>, IdentityServiceError> {
    let usecase = ResetPasswordByOtpUseCase {
        users: state.user_repo(),
        otps: state.otp_repo(),
        credentials: state.credential_repo(),
        sessions: state.session_repo(),
    };

    usecase
        .execute(ResetPasswordByOtpInput {
            lookup: lookup_from(body.email, body.username)?,
            otp: body.otp,
            new_password: body.new_password,
        })
        .await?;

    Ok(Json(MessageResponse::new("Password updated successfully")))
}
