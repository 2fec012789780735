use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};
use uuid::Uuid;

use gatehouse_domain::user::Lookup;
use gatehouse_identity::config::{OtpSettings, TokenSettings};
use gatehouse_identity::domain::repository::{
    CredentialRepository, NotificationPort, OtpChallengeRepository, RefreshSessionRepository,
    UserRepository,
};
use gatehouse_identity::domain::types::{Credential, Mail, OtpChallenge, RefreshSession, User};
use gatehouse_identity::error::IdentityServiceError;

// ── MockUserRepo ─────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockUserRepo {
    pub users: Arc<Mutex<Vec<User>>>,
    /// (user_id, password_hash) pairs recorded by create_with_credential.
    pub created_credentials: Arc<Mutex<Vec<(Uuid, String)>>>,
}

impl MockUserRepo {
    pub fn new(users: Vec<User>) -> Self {
        Self {
            users: Arc::new(Mutex::new(users)),
            created_credentials: Arc::new(Mutex::new(vec![])),
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }
}

impl UserRepository for MockUserRepo {
    async fn find(&self, lookup: &Lookup) -> Result<Option<User>, IdentityServiceError> {
        let users = self.users.lock().unwrap();
        Ok(match lookup {
            Lookup::ByUsername(username) => {
                users.iter().find(|u| &u.username == username).cloned()
            }
            Lookup::ByEmail(email) => users.iter().find(|u| &u.email == email).cloned(),
            Lookup::ById(id) => users.iter().find(|u| &u.id == id).cloned(),
        })
    }

    async fn create_with_credential(
        &self,
        user: &User,
        password_hash: &str,
    ) -> Result<(), IdentityServiceError> {
        let mut users = self.users.lock().unwrap();
        if users
            .iter()
            .any(|u| u.email == user.email || u.username == user.username)
        {
            return Err(IdentityServiceError::UserAlreadyExists);
        }
        users.push(user.clone());
        self.created_credentials
            .lock()
            .unwrap()
            .push((user.id, password_hash.to_owned()));
        Ok(())
    }

    async fn mark_verified(&self, id: Uuid) -> Result<(), IdentityServiceError> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(IdentityServiceError::UserNotFound)?;
        user.is_verified = true;
        Ok(())
    }

    async fn update_profile(
        &self,
        id: Uuid,
        full_name: Option<&str>,
        bio: Option<&str>,
    ) -> Result<(), IdentityServiceError> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(IdentityServiceError::UserNotFound)?;
        if let Some(full_name) = full_name {
            user.full_name = full_name.to_owned();
        }
        if let Some(bio) = bio {
            user.bio = Some(bio.to_owned());
        }
        Ok(())
    }
}

// ── MockCredentialRepo ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockCredentialRepo {
    pub credentials: Arc<Mutex<Vec<Credential>>>,
}

impl MockCredentialRepo {
    pub fn new(credentials: Vec<Credential>) -> Self {
        Self {
            credentials: Arc::new(Mutex::new(credentials)),
        }
    }
}

impl CredentialRepository for MockCredentialRepo {
    async fn find_by_user_id(
        &self,
        user_id: Uuid,
    ) -> Result<Option<Credential>, IdentityServiceError> {
        Ok(self
            .credentials
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.user_id == user_id)
            .cloned())
    }

    async fn update_hash(
        &self,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<(), IdentityServiceError> {
        let mut credentials = self.credentials.lock().unwrap();
        let credential = credentials
            .iter_mut()
            .find(|c| c.user_id == user_id)
            .ok_or(IdentityServiceError::CredentialNotFound)?;
        credential.password_hash = password_hash.to_owned();
        credential.updated_at = Utc::now();
        Ok(())
    }
}

// ── MockSessionRepo ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockSessionRepo {
    pub sessions: Arc<Mutex<Vec<RefreshSession>>>,
}

impl MockSessionRepo {
    pub fn empty() -> Self {
        Self {
            sessions: Arc::new(Mutex::new(vec![])),
        }
    }

    /// Shared handle for post-execution inspection.
    pub fn sessions_handle(&self) -> Arc<Mutex<Vec<RefreshSession>>> {
        Arc::clone(&self.sessions)
    }
}

impl RefreshSessionRepository for MockSessionRepo {
    async fn create(&self, session: &RefreshSession) -> Result<(), IdentityServiceError> {
        self.sessions.lock().unwrap().push(session.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<RefreshSession>, IdentityServiceError> {
        Ok(self
            .sessions
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == id)
            .cloned())
    }

    async fn find_by_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshSession>, IdentityServiceError> {
        Ok(self
            .sessions
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.token_hash == token_hash)
            .cloned())
    }

    async fn revoke_if_usable(&self, id: Uuid) -> Result<bool, IdentityServiceError> {
        let mut sessions = self.sessions.lock().unwrap();
        match sessions.iter_mut().find(|s| s.id == id) {
            Some(session) if session.is_usable() => {
                session.revoked_at = Some(Utc::now());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn revoke_all(&self, user_id: Uuid) -> Result<u64, IdentityServiceError> {
        let mut sessions = self.sessions.lock().unwrap();
        let mut revoked = 0;
        for session in sessions
            .iter_mut()
            .filter(|s| s.user_id == user_id && s.revoked_at.is_none())
        {
            session.revoked_at = Some(Utc::now());
            revoked += 1;
        }
        Ok(revoked)
    }
}

// ── MockOtpRepo ──────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockOtpRepo {
    pub challenges: Arc<Mutex<Vec<OtpChallenge>>>,
}

impl MockOtpRepo {
    pub fn empty() -> Self {
        Self {
            challenges: Arc::new(Mutex::new(vec![])),
        }
    }

    pub fn challenges_handle(&self) -> Arc<Mutex<Vec<OtpChallenge>>> {
        Arc::clone(&self.challenges)
    }
}

impl OtpChallengeRepository for MockOtpRepo {
    async fn find_pending(
        &self,
        user_id: Uuid,
    ) -> Result<Option<OtpChallenge>, IdentityServiceError> {
        Ok(self
            .challenges
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.user_id == user_id && c.is_pending())
            .cloned())
    }

    async fn create(&self, challenge: &OtpChallenge) -> Result<(), IdentityServiceError> {
        self.challenges.lock().unwrap().push(challenge.clone());
        Ok(())
    }

    async fn mark_used(&self, id: Uuid) -> Result<(), IdentityServiceError> {
        let mut challenges = self.challenges.lock().unwrap();
        if let Some(c) = challenges.iter_mut().find(|c| c.id == id) {
            c.used_at = Some(Utc::now());
        }
        Ok(())
    }
}

// ── MockNotifier ─────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockNotifier {
    pub mails: Arc<Mutex<Vec<Mail>>>,
}

impl MockNotifier {
    pub fn empty() -> Self {
        Self {
            mails: Arc::new(Mutex::new(vec![])),
        }
    }

    pub fn mails_handle(&self) -> Arc<Mutex<Vec<Mail>>> {
        Arc::clone(&self.mails)
    }
}

impl NotificationPort for MockNotifier {
    fn dispatch(&self, mail: Mail) {
        self.mails.lock().unwrap().push(mail);
    }
}

// ── Test fixture helpers ─────────────────────────────────────────────────────

pub const TEST_JWT_SECRET: &str = "test-jwt-secret-for-unit-tests-only";
pub const TEST_HASH_KEY: &str = "test-token-hash-key";

pub fn token_settings() -> TokenSettings {
    TokenSettings {
        jwt_secret: TEST_JWT_SECRET.to_owned(),
        token_hash_key: TEST_HASH_KEY.to_owned(),
        access_ttl_hours: 24,
        refresh_ttl_days: 7,
    }
}

pub fn otp_settings() -> OtpSettings {
    OtpSettings {
        length: 8,
        ttl_minutes: 10,
    }
}

pub fn test_user() -> User {
    let now = Utc::now();
    User {
        id: Uuid::parse_str("00000000-0000-0000-0000-000000000001").unwrap(),
        email: "alice@example.com".to_owned(),
        username: "alice".to_owned(),
        full_name: "Alice Park".to_owned(),
        bio: None,
        is_active: true,
        is_verified: true,
        created_at: now,
        updated_at: now,
    }
}

pub fn unverified_user() -> User {
    User {
        is_verified: false,
        ..test_user()
    }
}

pub fn test_challenge(user_id: Uuid, code_hash: String) -> OtpChallenge {
    let now = Utc::now();
    OtpChallenge {
        id: Uuid::new_v4(),
        user_id,
        code_hash,
        expires_at: now + Duration::minutes(10),
        used_at: None,
        created_at: now,
    }
}
