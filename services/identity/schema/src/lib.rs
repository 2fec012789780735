//! SeaORM entities for the identity service database.

pub mod credentials;
pub mod otp_challenges;
pub mod refresh_sessions;
pub mod users;
