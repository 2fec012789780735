use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, TransactionError, TransactionTrait, sea_query::Expr,
};
use uuid::Uuid;

use gatehouse_domain::user::Lookup;
use gatehouse_identity_schema::{credentials, otp_challenges, refresh_sessions, users};

use crate::domain::repository::{
    CredentialRepository, OtpChallengeRepository, RefreshSessionRepository, UserRepository,
};
use crate::domain::types::{Credential, OtpChallenge, RefreshSession, User};
use crate::error::IdentityServiceError;

fn is_unique_violation(e: &sea_orm::DbErr) -> bool {
    matches!(
        e.sql_err(),
        Some(sea_orm::SqlErr::UniqueConstraintViolation(_))
    )
}

// ── User repository ───────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find(&self, lookup: &Lookup) -> Result<Option<User>, IdentityServiceError> {
        let query = match lookup {
            Lookup::ByUsername(username) => {
                users::Entity::find().filter(users::Column::Username.eq(username))
            }
            Lookup::ByEmail(email) => {
                users::Entity::find().filter(users::Column::Email.eq(email))
            }
            Lookup::ById(id) => users::Entity::find().filter(users::Column::Id.eq(*id)),
        };
        let model = query.one(&self.db).await.context("find user")?;
        Ok(model.map(user_from_model))
    }

    async fn create_with_credential(
        &self,
        user: &User,
        password_hash: &str,
    ) -> Result<(), IdentityServiceError> {
        let result = self
            .db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                let user = user.clone();
                let password_hash = password_hash.to_owned();
                Box::pin(async move {
                    insert_user(txn, &user).await?;
                    insert_credential(txn, user.id, &password_hash, user.created_at).await?;
                    Ok(())
                })
            })
            .await;

        match result {
            Ok(()) => Ok(()),
            Err(TransactionError::Transaction(e)) if is_unique_violation(&e) => {
                Err(IdentityServiceError::UserAlreadyExists)
            }
            Err(e) => Err(IdentityServiceError::Internal(
                anyhow::Error::new(e).context("create user with credential"),
            )),
        }
    }

    async fn mark_verified(&self, id: Uuid) -> Result<(), IdentityServiceError> {
        users::ActiveModel {
            id: Set(id),
            is_verified: Set(true),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .map_err(|e| match e {
            sea_orm::DbErr::RecordNotUpdated => IdentityServiceError::UserNotFound,
            e => IdentityServiceError::Internal(anyhow::Error::new(e).context("mark verified")),
        })?;
        Ok(())
    }

    async fn update_profile(
        &self,
        id: Uuid,
        full_name: Option<&str>,
        bio: Option<&str>,
    ) -> Result<(), IdentityServiceError> {
        let mut model = users::ActiveModel {
            id: Set(id),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };
        if let Some(full_name) = full_name {
            model.full_name = Set(full_name.to_owned());
        }
        if let Some(bio) = bio {
            model.bio = Set(Some(bio.to_owned()));
        }
        model.update(&self.db).await.map_err(|e| match e {
            sea_orm::DbErr::RecordNotUpdated => IdentityServiceError::UserNotFound,
            e => IdentityServiceError::Internal(anyhow::Error::new(e).context("update profile")),
        })?;
        Ok(())
    }
}

async fn insert_user(txn: &DatabaseTransaction, user: &User) -> Result<(), sea_orm::DbErr> {
    users::ActiveModel {
        id: Set(user.id),
        email: Set(user.email.clone()),
        username: Set(user.username.clone()),
        full_name: Set(user.full_name.clone()),
        bio: Set(user.bio.clone()),
        is_active: Set(user.is_active),
        is_verified: Set(user.is_verified),
        created_at: Set(user.created_at),
        updated_at: Set(user.updated_at),
    }
    .insert(txn)
    .await?;
    Ok(())
}

async fn insert_credential(
    txn: &DatabaseTransaction,
    user_id: Uuid,
    password_hash: &str,
    at: chrono::DateTime<Utc>,
) -> Result<(), sea_orm::DbErr> {
    credentials::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        password_hash: Set(password_hash.to_owned()),
        updated_at: Set(at),
    }
    .insert(txn)
    .await?;
    Ok(())
}

fn user_from_model(model: users::Model) -> User {
    User {
        id: model.id,
        email: model.email,
        username: model.username,
        full_name: model.full_name,
        bio: model.bio,
        is_active: model.is_active,
        is_verified: model.is_verified,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Credential repository ─────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbCredentialRepository {
    pub db: DatabaseConnection,
}

impl CredentialRepository for DbCredentialRepository {
    async fn find_by_user_id(
        &self,
        user_id: Uuid,
    ) -> Result<Option<Credential>, IdentityServiceError> {
        let model = credentials::Entity::find()
            .filter(credentials::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .context("find credential")?;
        Ok(model.map(|m| Credential {
            id: m.id,
            user_id: m.user_id,
            password_hash: m.password_hash,
            updated_at: m.updated_at,
        }))
    }

    async fn update_hash(
        &self,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<(), IdentityServiceError> {
        let result = credentials::Entity::update_many()
            .col_expr(
                credentials::Column::PasswordHash,
                Expr::value(password_hash.to_owned()),
            )
            .col_expr(credentials::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(credentials::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .context("update credential hash")?;
        if result.rows_affected == 0 {
            return Err(IdentityServiceError::CredentialNotFound);
        }
        Ok(())
    }
}

// ── RefreshSession repository ─────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbRefreshSessionRepository {
    pub db: DatabaseConnection,
}

impl RefreshSessionRepository for DbRefreshSessionRepository {
    async fn create(&self, session: &RefreshSession) -> Result<(), IdentityServiceError> {
        refresh_sessions::ActiveModel {
            id: Set(session.id),
            user_id: Set(session.user_id),
            token_hash: Set(session.token_hash.clone()),
            issued_at: Set(session.issued_at),
            expires_at: Set(session.expires_at),
            revoked_at: Set(None),
        }
        .insert(&self.db)
        .await
        .context("create refresh session")?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<RefreshSession>, IdentityServiceError> {
        let model = refresh_sessions::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find refresh session by id")?;
        Ok(model.map(session_from_model))
    }

    async fn find_by_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshSession>, IdentityServiceError> {
        let model = refresh_sessions::Entity::find()
            .filter(refresh_sessions::Column::TokenHash.eq(token_hash))
            .one(&self.db)
            .await
            .context("find refresh session by hash")?;
        Ok(model.map(session_from_model))
    }

    async fn revoke_if_usable(&self, id: Uuid) -> Result<bool, IdentityServiceError> {
        // Conditional update is the single-use arbiter: only one concurrent
        // caller can move revoked_at from NULL.
        let now = Utc::now();
        let result = refresh_sessions::Entity::update_many()
            .col_expr(refresh_sessions::Column::RevokedAt, Expr::value(Some(now)))
            .filter(refresh_sessions::Column::Id.eq(id))
            .filter(refresh_sessions::Column::RevokedAt.is_null())
            .filter(refresh_sessions::Column::ExpiresAt.gt(now))
            .exec(&self.db)
            .await
            .context("revoke refresh session")?;
        Ok(result.rows_affected > 0)
    }

    async fn revoke_all(&self, user_id: Uuid) -> Result<u64, IdentityServiceError> {
        let now = Utc::now();
        let result = refresh_sessions::Entity::update_many()
            .col_expr(refresh_sessions::Column::RevokedAt, Expr::value(Some(now)))
            .filter(refresh_sessions::Column::UserId.eq(user_id))
            .filter(refresh_sessions::Column::RevokedAt.is_null())
            .exec(&self.db)
            .await
            .context("revoke all refresh sessions")?;
        Ok(result.rows_affected)
    }
}

fn session_from_model(model: refresh_sessions::Model) -> RefreshSession {
    RefreshSession {
        id: model.id,
        user_id: model.user_id,
        token_hash: model.token_hash,
        issued_at: model.issued_at,
        expires_at: model.expires_at,
        revoked_at: model.revoked_at,
    }
}

// ── OtpChallenge repository ───────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbOtpChallengeRepository {
    pub db: DatabaseConnection,
}

impl OtpChallengeRepository for DbOtpChallengeRepository {
    async fn find_pending(
        &self,
        user_id: Uuid,
    ) -> Result<Option<OtpChallenge>, IdentityServiceError> {
        let now = Utc::now();
        let model = otp_challenges::Entity::find()
            .filter(otp_challenges::Column::UserId.eq(user_id))
            .filter(otp_challenges::Column::UsedAt.is_null())
            .filter(otp_challenges::Column::ExpiresAt.gt(now))
            .one(&self.db)
            .await
            .context("find pending otp challenge")?;
        Ok(model.map(challenge_from_model))
    }

    async fn create(&self, challenge: &OtpChallenge) -> Result<(), IdentityServiceError> {
        otp_challenges::ActiveModel {
            id: Set(challenge.id),
            user_id: Set(challenge.user_id),
            code_hash: Set(challenge.code_hash.clone()),
            expires_at: Set(challenge.expires_at),
            used_at: Set(None),
            created_at: Set(challenge.created_at),
        }
        .insert(&self.db)
        .await
        .context("create otp challenge")?;
        Ok(())
    }

    async fn mark_used(&self, id: Uuid) -> Result<(), IdentityServiceError> {
        otp_challenges::ActiveModel {
            id: Set(id),
            used_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("mark otp challenge used")?;
        Ok(())
    }
}

fn challenge_from_model(model: otp_challenges::Model) -> OtpChallenge {
    OtpChallenge {
        id: model.id,
        user_id: model.user_id,
        code_hash: model.code_hash,
        expires_at: model.expires_at,
        used_at: model.used_at,
        created_at: model.created_at,
    }
}
