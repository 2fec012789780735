use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use gatehouse_domain::user::PasswordPolicyError;

/// Identity service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum IdentityServiceError {
    #[error("user not found")]
    UserNotFound,
    #[error("user credentials not found")]
    CredentialNotFound,
    #[error("user already exists")]
    UserAlreadyExists,
    #[error("invalid username")]
    InvalidUsername,
    #[error("{0}")]
    WeakPassword(PasswordPolicyError),
    #[error("missing username or email")]
    MissingData,
    #[error("email is not verified")]
    EmailNotVerified,
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("user has an outstanding otp")]
    OtpOutstanding,
    #[error("no valid otp found")]
    OtpNotFound,
    #[error("otp is invalid")]
    OtpInvalid,
    #[error("token expired")]
    TokenExpired,
    #[error("token invalid")]
    TokenInvalid,
    #[error("refresh session not found")]
    SessionNotFound,
    #[error("session revoked")]
    SessionRevoked,
    #[error("missing or invalid authorization")]
    Unauthorized,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl IdentityServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::CredentialNotFound => "CREDENTIAL_NOT_FOUND",
            Self::UserAlreadyExists => "USER_ALREADY_EXISTS",
            Self::InvalidUsername => "INVALID_USERNAME",
            Self::WeakPassword(_) => "WEAK_PASSWORD",
            Self::MissingData => "MISSING_DATA",
            Self::EmailNotVerified => "EMAIL_NOT_VERIFIED",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::OtpOutstanding => "OTP_OUTSTANDING",
            Self::OtpNotFound => "OTP_NOT_FOUND",
            Self::OtpInvalid => "OTP_INVALID",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::TokenInvalid => "TOKEN_INVALID",
            Self::SessionNotFound => "SESSION_NOT_FOUND",
            Self::SessionRevoked => "SESSION_REVOKED",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for IdentityServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::UserNotFound | Self::CredentialNotFound | Self::OtpNotFound => {
                StatusCode::NOT_FOUND
            }
            Self::UserAlreadyExists | Self::OtpOutstanding => StatusCode::CONFLICT,
            Self::InvalidUsername | Self::WeakPassword(_) | Self::MissingData => {
                StatusCode::BAD_REQUEST
            }
            Self::EmailNotVerified => StatusCode::FORBIDDEN,
            Self::InvalidCredentials
            | Self::OtpInvalid
            | Self::TokenExpired
            | Self::TokenInvalid
            | Self::SessionNotFound
            | Self::SessionRevoked
            | Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // Log 500s only — tower-http TraceLayer already records method/uri/status for all
        // requests. 4xx are expected client errors; logging them here would be noise.
        // Internal errors need the anyhow chain logged so the root cause is traceable.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %e, kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "detail": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
