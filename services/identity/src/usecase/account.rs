use chrono::Utc;
use uuid::Uuid;

use gatehouse_domain::user::{Lookup, validate_password, validate_username};

use crate::config::OtpSettings;
use crate::domain::repository::{
    CredentialRepository, NotificationPort, OtpChallengeRepository, RefreshSessionRepository,
    UserRepository,
};
use crate::domain::types::{Mail, User};
use crate::error::IdentityServiceError;
use crate::security::password::{hash_secret, verify_secret};
use crate::usecase::otp::{issue_challenge, verify_challenge};

// ── Register ─────────────────────────────────────────────────────────────────

pub struct RegisterInput {
    pub email: String,
    pub username: String,
    pub full_name: String,
    pub bio: Option<String>,
    pub password: String,
}

pub struct RegisterUseCase<U, O, N>
where
    U: UserRepository,
    O: OtpChallengeRepository,
    N: NotificationPort,
{
    pub users: U,
    pub otps: O,
    pub notifier: N,
    pub otp_settings: OtpSettings,
}

impl<U, O, N> RegisterUseCase<U, O, N>
where
    U: UserRepository,
    O: OtpChallengeRepository,
    N: NotificationPort,
{
    /// Create the user and their credential in one transaction, then issue
    /// the first OTP challenge and hand the verification mail to the
    /// notifier. The account stays unverified until the OTP is confirmed.
    pub async fn execute(&self, input: RegisterInput) -> Result<User, IdentityServiceError> {
        if !validate_username(&input.username) {
            return Err(IdentityServiceError::InvalidUsername);
        }
        validate_password(&input.password).map_err(IdentityServiceError::WeakPassword)?;

        let password_hash = hash_secret(&input.password)?;
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: input.email,
            username: input.username,
            full_name: input.full_name,
            bio: input.bio,
            is_active: true,
            is_verified: false,
            created_at: now,
            updated_at: now,
        };
        self.users.create_with_credential(&user, &password_hash).await?;

        // A fresh user has no pending challenge, so this cannot conflict.
        let code = issue_challenge(&self.otps, user.id, &self.otp_settings).await?;

        self.notifier.dispatch(Mail {
            to: user.email.clone(),
            subject: "Verify your email".to_owned(),
            body: format!("One time password: {code}"),
        });

        Ok(user)
    }
}

// ── ChangePassword ───────────────────────────────────────────────────────────

pub struct ChangePasswordInput {
    pub user_id: Uuid,
    pub old_password: String,
    pub new_password: String,
}

pub struct ChangePasswordUseCase<C, S>
where
    C: CredentialRepository,
    S: RefreshSessionRepository,
{
    pub credentials: C,
    pub sessions: S,
}

impl<C, S> ChangePasswordUseCase<C, S>
where
    C: CredentialRepository,
    S: RefreshSessionRepository,
{
    /// Replace the password after checking the old one, then revoke every
    /// refresh session — a password change logs the user out everywhere.
    pub async fn execute(&self, input: ChangePasswordInput) -> Result<(), IdentityServiceError> {
        validate_password(&input.new_password).map_err(IdentityServiceError::WeakPassword)?;

        let credential = self
            .credentials
            .find_by_user_id(input.user_id)
            .await?
            .ok_or(IdentityServiceError::CredentialNotFound)?;

        if !verify_secret(&input.old_password, &credential.password_hash)? {
            return Err(IdentityServiceError::InvalidCredentials);
        }

        let new_hash = hash_secret(&input.new_password)?;
        self.credentials.update_hash(input.user_id, &new_hash).await?;
        self.sessions.revoke_all(input.user_id).await?;
        Ok(())
    }
}

// ── ResetPasswordByOtp ───────────────────────────────────────────────────────

pub struct ResetPasswordByOtpInput {
    pub lookup: Lookup,
    pub otp: String,
    pub new_password: String,
}

pub struct ResetPasswordByOtpUseCase<U, O, C, S>
where
    U: UserRepository,
    O: OtpChallengeRepository,
    C: CredentialRepository,
    S: RefreshSessionRepository,
{
    pub users: U,
    pub otps: O,
    pub credentials: C,
    pub sessions: S,
}

impl<U, O, C, S> ResetPasswordByOtpUseCase<U, O, C, S>
where
    U: UserRepository,
    O: OtpChallengeRepository,
    C: CredentialRepository,
    S: RefreshSessionRepository,
{
    /// Password reset proving control of the mail channel instead of the old
    /// password. The policy check runs before the OTP is consumed so a weak
    /// replacement password does not burn the challenge.
    pub async fn execute(
        &self,
        input: ResetPasswordByOtpInput,
    ) -> Result<(), IdentityServiceError> {
        validate_password(&input.new_password).map_err(IdentityServiceError::WeakPassword)?;

        let user = self
            .users
            .find(&input.lookup)
            .await?
            .ok_or(IdentityServiceError::UserNotFound)?;

        if !verify_challenge(&self.otps, user.id, &input.otp).await? {
            return Err(IdentityServiceError::OtpInvalid);
        }

        // A successful OTP also proves the mail channel — flip verification.
        self.users.mark_verified(user.id).await?;

        let new_hash = hash_secret(&input.new_password)?;
        self.credentials.update_hash(user.id, &new_hash).await?;
        self.sessions.revoke_all(user.id).await?;
        Ok(())
    }
}

// ── Profile ──────────────────────────────────────────────────────────────────

pub struct GetUserUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> GetUserUseCase<U> {
    pub async fn execute(&self, lookup: Lookup) -> Result<User, IdentityServiceError> {
        self.users
            .find(&lookup)
            .await?
            .ok_or(IdentityServiceError::UserNotFound)
    }
}

pub struct UpdateProfileInput {
    pub full_name: Option<String>,
    pub bio: Option<String>,
}

pub struct UpdateProfileUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> UpdateProfileUseCase<U> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        input: UpdateProfileInput,
    ) -> Result<(), IdentityServiceError> {
        if input.full_name.is_none() && input.bio.is_none() {
            return Err(IdentityServiceError::MissingData);
        }
        self.users
            .update_profile(user_id, input.full_name.as_deref(), input.bio.as_deref())
            .await
    }
}
