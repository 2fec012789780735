//! Deterministic keyed hash for secrets stored at rest.
//!
//! Refresh tokens are looked up by this hash on every rotation, so it must
//! be deterministic — Argon2's per-secret salt rules it out here.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// HMAC-SHA256 of `value` under `key`, base64-encoded.
pub fn keyed_hash(key: &str, value: &str) -> String {
    // HMAC accepts keys of any length; new_from_slice cannot fail.
    let mut mac = HmacSha256::new_from_slice(key.as_bytes()).expect("hmac key");
    mac.update(value.as_bytes());
    STANDARD.encode(mac.finalize().into_bytes())
}
