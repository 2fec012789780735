/// Identity service configuration loaded from environment variables.
///
/// Built once in `main` and handed into [`crate::state::AppState`]; business
/// logic never reads the environment directly.
#[derive(Debug)]
pub struct IdentityConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Base URL of the notifier service (e.g. "http://notifier:8200").
    pub notifier_url: String,
    /// TCP port to listen on (default 3110). Env var: `IDENTITY_PORT`.
    pub identity_port: u16,
    pub tokens: TokenSettings,
    pub otp: OtpSettings,
}

/// Signing and storage parameters for the token lifecycle engine.
#[derive(Debug, Clone)]
pub struct TokenSettings {
    /// HMAC secret for signing JWT access and refresh tokens.
    pub jwt_secret: String,
    /// Key for the keyed hash under which refresh tokens are stored at rest.
    pub token_hash_key: String,
    /// Access token lifetime in hours (default 24). Always clamped to the
    /// remaining refresh-session lifetime at issuance.
    pub access_ttl_hours: i64,
    /// Refresh session lifetime in days (default 7).
    pub refresh_ttl_days: i64,
}

/// Parameters for the OTP verification engine.
#[derive(Debug, Clone)]
pub struct OtpSettings {
    /// Number of decimal digits per code (default 8).
    pub length: usize,
    /// Challenge lifetime in minutes (default 10).
    pub ttl_minutes: i64,
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl IdentityConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL"),
            notifier_url: std::env::var("NOTIFIER_URL").expect("NOTIFIER_URL"),
            identity_port: env_parse("IDENTITY_PORT", 3110),
            tokens: TokenSettings {
                jwt_secret: std::env::var("JWT_SECRET").expect("JWT_SECRET"),
                token_hash_key: std::env::var("TOKEN_HASH_KEY").expect("TOKEN_HASH_KEY"),
                access_ttl_hours: env_parse("ACCESS_TOKEN_TTL_HOURS", 24),
                refresh_ttl_days: env_parse("REFRESH_TOKEN_TTL_DAYS", 7),
            },
            otp: OtpSettings {
                length: env_parse("OTP_LENGTH", 8),
                ttl_minutes: env_parse("OTP_TTL_MINUTES", 10),
            },
        }
    }
}
