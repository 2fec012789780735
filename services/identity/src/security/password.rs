//! Argon2id hashing for passwords and OTP codes.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::error::IdentityServiceError;

/// Hash a secret with Argon2id and a random per-secret salt, returning a
/// PHC-formatted string safe for storage.
pub fn hash_secret(secret: &str) -> Result<String, IdentityServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map_err(|e| IdentityServiceError::Internal(anyhow::anyhow!("hashing failed: {e}")))?;
    Ok(hash.to_string())
}

/// Verify a candidate against a stored PHC hash. Constant-time comparison.
pub fn verify_secret(candidate: &str, stored_hash: &str) -> Result<bool, IdentityServiceError> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| IdentityServiceError::Internal(anyhow::anyhow!("invalid stored hash: {e}")))?;
    match Argon2::default().verify_password(candidate.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(IdentityServiceError::Internal(anyhow::anyhow!(
            "verification failed: {e}"
        ))),
    }
}
