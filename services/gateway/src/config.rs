/// Gateway configuration loaded from environment variables.
#[derive(Debug)]
pub struct GatewayConfig {
    /// TCP port to listen on (default 3100). Env var: `GATEWAY_PORT`.
    pub gateway_port: u16,
    /// Identity service base URL (e.g. "http://identity:3110").
    pub identity_url: String,
    /// Storage service base URL (e.g. "http://storage:9000").
    pub storage_url: String,
    /// Timeout for each upstream call, validate round-trips included
    /// (default 10s). Env var: `UPSTREAM_TIMEOUT_SECS`.
    pub upstream_timeout_secs: u64,
}

impl GatewayConfig {
    pub fn from_env() -> Self {
        Self {
            gateway_port: std::env::var("GATEWAY_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3100),
            identity_url: std::env::var("IDENTITY_URL").expect("IDENTITY_URL"),
            storage_url: std::env::var("STORAGE_URL").expect("STORAGE_URL"),
            upstream_timeout_secs: std::env::var("UPSTREAM_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
        }
    }
}
