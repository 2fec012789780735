//! JWT access- and refresh-token claims and validation.

use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::Deserialize;
#[cfg(any(feature = "USE_ONLY_IN_IDENTITY_SERVICE", test))]
use serde::Serialize;
use uuid::Uuid;

/// Identity extracted from a validated access token.
#[derive(Debug, Clone)]
pub struct AccessTokenInfo {
    pub user_id: Uuid,
    pub refresh_session_id: Uuid,
    pub exp: u64,
}

/// Errors returned by the decode functions.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("malformed token")]
    Malformed,
}

/// Access-token claims payload shared by token creation (identity service)
/// and validation (everyone else).
///
/// # Fields
///
/// | Field | JWT claim | Meaning |
/// |-------|-----------|---------|
/// | `sub` | `sub` | username |
/// | `email` | custom | account email |
/// | `user_id` | custom | user UUID string |
/// | `refresh_session_id` | custom | UUID of the refresh session this token was minted against |
/// | `exp` | `exp` | seconds since epoch |
///
/// The access token is self-verifying (signature + expiry) but only
/// *authorized* while its refresh session is live — callers combine both
/// checks, never one alone.
///
/// # Feature gate
///
/// [`Deserialize`] is always available — all consumers validate tokens.
/// [`Serialize`] requires the **`USE_ONLY_IN_IDENTITY_SERVICE`** cargo
/// feature. Only the identity service enables it because it is the sole
/// token issuer.
#[derive(Debug, Deserialize)]
#[cfg_attr(
    any(feature = "USE_ONLY_IN_IDENTITY_SERVICE", test),
    derive(Serialize)
)]
pub struct AccessClaims {
    pub sub: String,
    pub email: String,
    pub user_id: String,
    pub refresh_session_id: String,
    pub exp: u64,
}

/// Refresh-token claims payload.
///
/// The raw refresh token is never stored; its keyed hash is. `anchor` is a
/// random UUID baked into every refresh token so two tokens issued to the
/// same user in the same second still hash differently.
#[derive(Debug, Deserialize)]
#[cfg_attr(
    any(feature = "USE_ONLY_IN_IDENTITY_SERVICE", test),
    derive(Serialize)
)]
pub struct RefreshClaims {
    pub sub: String,
    pub email: String,
    pub user_id: String,
    pub anchor: String,
    pub exp: u64,
}

// ── Core decode (private) ────────────────────────────────────────────────

/// Decode and validate a JWT, returning raw claims.
///
/// Validation: HS256, exp checked, required claims: `exp` + `sub`.
/// Default leeway = 60s — tolerates clock skew between services.
fn decode_jwt<C: serde::de::DeserializeOwned>(token: &str, secret: &str) -> Result<C, TokenError> {
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.validate_exp = true;
    validation.required_spec_claims.clear();
    validation.set_required_spec_claims(&["exp", "sub"]);

    let data = decode::<C>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenError::InvalidSignature,
        _ => TokenError::Malformed,
    })?;

    Ok(data.claims)
}

// ── Public: all consumers ────────────────────────────────────────────────

/// Validate an access token, returning parsed identity.
///
/// This only proves *authenticity* (signature + expiry). The identity
/// service additionally checks the referenced refresh session for liveness
/// before treating the bearer as authorized.
pub fn decode_access_token(token: &str, secret: &str) -> Result<AccessTokenInfo, TokenError> {
    let claims: AccessClaims = decode_jwt(token, secret)?;
    let user_id = claims
        .user_id
        .parse::<Uuid>()
        .map_err(|_| TokenError::Malformed)?;
    let refresh_session_id = claims
        .refresh_session_id
        .parse::<Uuid>()
        .map_err(|_| TokenError::Malformed)?;
    Ok(AccessTokenInfo {
        user_id,
        refresh_session_id,
        exp: claims.exp,
    })
}

// ── Feature-gated: identity service only ─────────────────────────────────

/// Decode a refresh token's claims.
///
/// Rotation authenticates a refresh token by keyed-hash lookup, not by
/// decoding it; this exists for diagnostics and tests. Requires the
/// `USE_ONLY_IN_IDENTITY_SERVICE` feature.
#[cfg(any(feature = "USE_ONLY_IN_IDENTITY_SERVICE", test))]
pub fn decode_refresh_token(token: &str, secret: &str) -> Result<RefreshClaims, TokenError> {
    decode_jwt(token, secret)
}
