use sea_orm::DatabaseConnection;

use crate::config::{OtpSettings, TokenSettings};
use crate::infra::db::{
    DbCredentialRepository, DbOtpChallengeRepository, DbRefreshSessionRepository, DbUserRepository,
};
use crate::infra::notify::HttpNotifier;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub notifier: HttpNotifier,
    pub tokens: TokenSettings,
    pub otp: OtpSettings,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn credential_repo(&self) -> DbCredentialRepository {
        DbCredentialRepository {
            db: self.db.clone(),
        }
    }

    pub fn session_repo(&self) -> DbRefreshSessionRepository {
        DbRefreshSessionRepository {
            db: self.db.clone(),
        }
    }

    pub fn otp_repo(&self) -> DbOtpChallengeRepository {
        DbOtpChallengeRepository {
            db: self.db.clone(),
        }
    }
}
