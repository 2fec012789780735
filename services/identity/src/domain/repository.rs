#![allow(async_fn_in_trait)]

use uuid::Uuid;

use gatehouse_domain::user::Lookup;

use crate::domain::types::{Credential, Mail, OtpChallenge, RefreshSession, User};
use crate::error::IdentityServiceError;

/// Repository for user identity records.
pub trait UserRepository: Send + Sync {
    /// Look up a user by username, email, or id.
    async fn find(&self, lookup: &Lookup) -> Result<Option<User>, IdentityServiceError>;

    /// Insert a user and their password credential atomically (same
    /// transaction). Duplicate email/username surfaces as
    /// [`IdentityServiceError::UserAlreadyExists`].
    async fn create_with_credential(
        &self,
        user: &User,
        password_hash: &str,
    ) -> Result<(), IdentityServiceError>;

    /// Set `is_verified = true`. Idempotent.
    async fn mark_verified(&self, id: Uuid) -> Result<(), IdentityServiceError>;

    /// Update profile fields that are `Some`.
    async fn update_profile(
        &self,
        id: Uuid,
        full_name: Option<&str>,
        bio: Option<&str>,
    ) -> Result<(), IdentityServiceError>;
}

/// Repository for password credentials.
pub trait CredentialRepository: Send + Sync {
    async fn find_by_user_id(
        &self,
        user_id: Uuid,
    ) -> Result<Option<Credential>, IdentityServiceError>;

    /// Replace the stored hash. The previous hash is discarded.
    async fn update_hash(
        &self,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<(), IdentityServiceError>;
}

/// Repository for refresh sessions.
pub trait RefreshSessionRepository: Send + Sync {
    async fn create(&self, session: &RefreshSession) -> Result<(), IdentityServiceError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<RefreshSession>, IdentityServiceError>;

    async fn find_by_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshSession>, IdentityServiceError>;

    /// Conditionally revoke: `UPDATE … WHERE id = ? AND revoked_at IS NULL
    /// AND expires_at > now`. Returns `true` iff this call revoked the row —
    /// of two concurrent rotations exactly one sees `true`.
    async fn revoke_if_usable(&self, id: Uuid) -> Result<bool, IdentityServiceError>;

    /// Revoke every live session of a user ("logout everywhere").
    /// Returns the number of sessions revoked.
    async fn revoke_all(&self, user_id: Uuid) -> Result<u64, IdentityServiceError>;
}

/// Repository for OTP challenges.
pub trait OtpChallengeRepository: Send + Sync {
    /// The single unused, unexpired challenge for a user, if any.
    async fn find_pending(
        &self,
        user_id: Uuid,
    ) -> Result<Option<OtpChallenge>, IdentityServiceError>;

    async fn create(&self, challenge: &OtpChallenge) -> Result<(), IdentityServiceError>;

    /// Mark a challenge consumed (sets `used_at = now`).
    async fn mark_used(&self, id: Uuid) -> Result<(), IdentityServiceError>;
}

/// Port for outbound mail. Implementations must be fire-and-forget: the
/// calling request never blocks on, and never fails from, delivery.
pub trait NotificationPort: Send + Sync {
    fn dispatch(&self, mail: Mail);
}
