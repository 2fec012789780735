use chrono::{Duration, Utc};
use rand::RngExt;
use uuid::Uuid;

use gatehouse_domain::user::Lookup;

use crate::config::OtpSettings;
use crate::domain::repository::{NotificationPort, OtpChallengeRepository, UserRepository};
use crate::domain::types::{Mail, OtpChallenge};
use crate::error::IdentityServiceError;
use crate::security::password::{hash_secret, verify_secret};

/// Charset for generating OTP codes (decimal digits).
const CHARSET: &[u8] = b"0123456789";

/// Codes come from a non-cryptographic source; acceptable only because of
/// the short TTL and single-use consumption.
fn generate_code(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}

/// Issue a challenge for a user, returning the plaintext code for
/// out-of-band delivery.
///
/// At most one pending challenge may exist per user; a second issuance while
/// one is outstanding fails with `OtpOutstanding` — the caller waits out the
/// TTL or consumes the pending code.
pub async fn issue_challenge<O: OtpChallengeRepository>(
    otps: &O,
    user_id: Uuid,
    settings: &OtpSettings,
) -> Result<String, IdentityServiceError> {
    if otps.find_pending(user_id).await?.is_some() {
        return Err(IdentityServiceError::OtpOutstanding);
    }

    let code = generate_code(settings.length);
    let now = Utc::now();
    let challenge = OtpChallenge {
        id: Uuid::new_v4(),
        user_id,
        code_hash: hash_secret(&code)?,
        expires_at: now + Duration::minutes(settings.ttl_minutes),
        used_at: None,
        created_at: now,
    };
    otps.create(&challenge).await?;

    Ok(code)
}

/// Verify a candidate code against the user's pending challenge.
///
/// The challenge is consumed before the comparison, whether or not the code
/// matches — the first attempt burns it, so a wrong guess cannot be retried
/// against the same code. Returns the match result; callers translate
/// `false` into a user-facing failure.
pub async fn verify_challenge<O: OtpChallengeRepository>(
    otps: &O,
    user_id: Uuid,
    candidate: &str,
) -> Result<bool, IdentityServiceError> {
    let challenge = otps
        .find_pending(user_id)
        .await?
        .ok_or(IdentityServiceError::OtpNotFound)?;

    otps.mark_used(challenge.id).await?;

    verify_secret(candidate.trim(), &challenge.code_hash)
}

// ── SendOtp ──────────────────────────────────────────────────────────────────

pub struct SendOtpInput {
    pub lookup: Lookup,
}

pub struct SendOtpUseCase<U, O, N>
where
    U: UserRepository,
    O: OtpChallengeRepository,
    N: NotificationPort,
{
    pub users: U,
    pub otps: O,
    pub notifier: N,
    pub settings: OtpSettings,
}

impl<U, O, N> SendOtpUseCase<U, O, N>
where
    U: UserRepository,
    O: OtpChallengeRepository,
    N: NotificationPort,
{
    pub async fn execute(&self, input: SendOtpInput) -> Result<(), IdentityServiceError> {
        let user = self
            .users
            .find(&input.lookup)
            .await?
            .ok_or(IdentityServiceError::UserNotFound)?;

        let code = issue_challenge(&self.otps, user.id, &self.settings).await?;

        self.notifier.dispatch(Mail {
            to: user.email,
            subject: "Verify your email".to_owned(),
            body: format!("One time password: {code}"),
        });
        Ok(())
    }
}

// ── VerifyOtp ────────────────────────────────────────────────────────────────

pub struct VerifyOtpInput {
    pub lookup: Lookup,
    pub otp: String,
}

pub struct VerifyOtpUseCase<U, O>
where
    U: UserRepository,
    O: OtpChallengeRepository,
{
    pub users: U,
    pub otps: O,
}

impl<U, O> VerifyOtpUseCase<U, O>
where
    U: UserRepository,
    O: OtpChallengeRepository,
{
    /// Verify the pending challenge and flip the user's verification flag on
    /// success. A mismatch still consumes the challenge.
    pub async fn execute(&self, input: VerifyOtpInput) -> Result<(), IdentityServiceError> {
        let user = self
            .users
            .find(&input.lookup)
            .await?
            .ok_or(IdentityServiceError::UserNotFound)?;

        if !verify_challenge(&self.otps, user.id, &input.otp).await? {
            return Err(IdentityServiceError::OtpInvalid);
        }

        self.users.mark_verified(user.id).await?;
        Ok(())
    }
}
