//! Cross-service ambient kit: health endpoints, request-id middleware,
//! tracing bootstrap, and serde helpers.

pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
