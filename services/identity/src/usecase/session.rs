use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde::Serialize;
use uuid::Uuid;

use gatehouse_auth_types::token::{AccessClaims, RefreshClaims, TokenError, decode_access_token};
use gatehouse_domain::user::Lookup;

use crate::config::TokenSettings;
use crate::domain::repository::{CredentialRepository, RefreshSessionRepository, UserRepository};
use crate::domain::types::{RefreshSession, User};
use crate::error::IdentityServiceError;
use crate::security::keyed_hash::keyed_hash;
use crate::security::password::verify_secret;

/// Freshly minted credential pair.
#[derive(Debug)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
}

fn sign<C: Serialize>(claims: &C, secret: &str) -> Result<String, IdentityServiceError> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| IdentityServiceError::Internal(e.into()))
}

/// Mint a refresh session plus the (access, refresh) pair bound to it.
///
/// The raw refresh secret is a signed JWT carrying a random anchor; only its
/// keyed hash is persisted. The access token references the session row and
/// its expiry is clamped to the session expiry, so an access token can never
/// outlive the session it was minted against.
pub async fn issue_session<S: RefreshSessionRepository>(
    sessions: &S,
    user: &User,
    settings: &TokenSettings,
) -> Result<SessionTokens, IdentityServiceError> {
    let now = Utc::now();
    let expires_at = now + Duration::days(settings.refresh_ttl_days);

    let refresh_claims = RefreshClaims {
        sub: user.username.clone(),
        email: user.email.clone(),
        user_id: user.id.to_string(),
        anchor: Uuid::new_v4().to_string(),
        exp: expires_at.timestamp() as u64,
    };
    let refresh_token = sign(&refresh_claims, &settings.jwt_secret)?;

    let session = RefreshSession {
        id: Uuid::new_v4(),
        user_id: user.id,
        token_hash: keyed_hash(&settings.token_hash_key, &refresh_token),
        issued_at: now,
        expires_at,
        revoked_at: None,
    };
    sessions.create(&session).await?;

    let access_expires_at = (now + Duration::hours(settings.access_ttl_hours)).min(expires_at);
    let access_claims = AccessClaims {
        sub: user.username.clone(),
        email: user.email.clone(),
        user_id: user.id.to_string(),
        refresh_session_id: session.id.to_string(),
        exp: access_expires_at.timestamp() as u64,
    };
    let access_token = sign(&access_claims, &settings.jwt_secret)?;

    Ok(SessionTokens {
        access_token,
        refresh_token,
    })
}

// ── Login ────────────────────────────────────────────────────────────────────

pub struct LoginInput {
    pub lookup: Lookup,
    pub password: String,
}

pub struct LoginUseCase<U, C, S>
where
    U: UserRepository,
    C: CredentialRepository,
    S: RefreshSessionRepository,
{
    pub users: U,
    pub credentials: C,
    pub sessions: S,
    pub tokens: TokenSettings,
}

impl<U, C, S> LoginUseCase<U, C, S>
where
    U: UserRepository,
    C: CredentialRepository,
    S: RefreshSessionRepository,
{
    pub async fn execute(&self, input: LoginInput) -> Result<SessionTokens, IdentityServiceError> {
        let user = self
            .users
            .find(&input.lookup)
            .await?
            .ok_or(IdentityServiceError::UserNotFound)?;

        if !user.is_verified {
            return Err(IdentityServiceError::EmailNotVerified);
        }

        let credential = self
            .credentials
            .find_by_user_id(user.id)
            .await?
            .ok_or(IdentityServiceError::CredentialNotFound)?;

        if !verify_secret(&input.password, &credential.password_hash)? {
            return Err(IdentityServiceError::InvalidCredentials);
        }

        issue_session(&self.sessions, &user, &self.tokens).await
    }
}

// ── Rotate (refresh) ─────────────────────────────────────────────────────────

pub struct RotateSessionUseCase<S, U>
where
    S: RefreshSessionRepository,
    U: UserRepository,
{
    pub sessions: S,
    pub users: U,
    pub tokens: TokenSettings,
}

impl<S, U> RotateSessionUseCase<S, U>
where
    S: RefreshSessionRepository,
    U: UserRepository,
{
    /// Exchange a refresh token for a brand-new pair, retiring the old one.
    ///
    /// Each refresh secret is redeemable exactly once: the conditional revoke
    /// is the arbiter, so of two concurrent rotations with the same secret
    /// only one can win; the loser sees `SessionRevoked`.
    pub async fn execute(
        &self,
        raw_refresh_token: &str,
    ) -> Result<SessionTokens, IdentityServiceError> {
        let token_hash = keyed_hash(&self.tokens.token_hash_key, raw_refresh_token);
        let session = self
            .sessions
            .find_by_token_hash(&token_hash)
            .await?
            .ok_or(IdentityServiceError::SessionNotFound)?;

        if !session.is_usable() {
            return Err(IdentityServiceError::SessionRevoked);
        }

        if !self.sessions.revoke_if_usable(session.id).await? {
            return Err(IdentityServiceError::SessionRevoked);
        }

        let user = self
            .users
            .find(&Lookup::ById(session.user_id))
            .await?
            .ok_or(IdentityServiceError::UserNotFound)?;

        issue_session(&self.sessions, &user, &self.tokens).await
    }
}

// ── Resolve (validate) ───────────────────────────────────────────────────────

pub struct ResolveAccessUseCase<S: RefreshSessionRepository> {
    pub sessions: S,
    pub jwt_secret: String,
}

impl<S: RefreshSessionRepository> ResolveAccessUseCase<S> {
    /// Resolve an access token to a user id.
    ///
    /// Two independent checks combined: the token must be authentic
    /// (signature + expiry) AND the refresh session it references must still
    /// be live. Revoking the session kills every access token minted against
    /// it, even inside the token's own expiry window.
    pub async fn execute(&self, access_token: &str) -> Result<Uuid, IdentityServiceError> {
        let info = decode_access_token(access_token, &self.jwt_secret).map_err(|e| match e {
            TokenError::Expired => IdentityServiceError::TokenExpired,
            TokenError::InvalidSignature | TokenError::Malformed => {
                IdentityServiceError::TokenInvalid
            }
        })?;

        let session = self
            .sessions
            .find_by_id(info.refresh_session_id)
            .await?
            .ok_or(IdentityServiceError::SessionRevoked)?;

        if session.user_id != info.user_id {
            return Err(IdentityServiceError::TokenInvalid);
        }
        if !session.is_usable() {
            return Err(IdentityServiceError::SessionRevoked);
        }

        Ok(info.user_id)
    }
}

// ── Revoke (logout) ──────────────────────────────────────────────────────────

pub struct RevokeSessionUseCase<S: RefreshSessionRepository> {
    pub sessions: S,
    pub tokens: TokenSettings,
}

impl<S: RefreshSessionRepository> RevokeSessionUseCase<S> {
    pub async fn execute(&self, raw_refresh_token: &str) -> Result<(), IdentityServiceError> {
        let token_hash = keyed_hash(&self.tokens.token_hash_key, raw_refresh_token);
        let session = self
            .sessions
            .find_by_token_hash(&token_hash)
            .await?
            .ok_or(IdentityServiceError::SessionNotFound)?;

        if !self.sessions.revoke_if_usable(session.id).await? {
            return Err(IdentityServiceError::SessionRevoked);
        }
        Ok(())
    }
}
