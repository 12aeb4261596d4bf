use serde::Deserialize;

const INSECURE_SECRET: &str = "CHANGE_ME_JWT_SECRET";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub redis_url: String,
    /// Shared HMAC secret for signing and verifying bearer tokens.
    pub jwt_secret: String,
    pub auth_service_url: String,
    pub payment_service_url: String,
    pub resource_service_url: String,
    /// Max admitted requests per client per window. Default: 100.
    pub rate_limit_max: u64,
    /// Fixed rate-limit window in seconds. Default: 60.
    pub rate_limit_window_secs: u64,
    /// When the shared store is unreachable at the rate-limit stage:
    /// false (default) rejects traffic, true admits it.
    pub rate_limit_fail_open: bool,
}

pub fn load() -> anyhow::Result<Config> {
    dotenvy::dotenv().ok();

    let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| INSECURE_SECRET.into());

    if jwt_secret == INSECURE_SECRET {
        let env_mode = std::env::var("GATEWAY_ENV")
            .or_else(|_| std::env::var("RUST_ENV"))
            .unwrap_or_default();
        if env_mode == "production" {
            anyhow::bail!(
                "JWT_SECRET is still the insecure placeholder. \
                 Set a proper secret before running in production."
            );
        }
        tracing::warn!("JWT_SECRET is not set — using insecure placeholder");
    }

    Ok(Config {
        port: std::env::var("GATEWAY_PORT")
            .unwrap_or_else(|_| "8080".into())
            .parse()
            .unwrap_or(8080),
        redis_url: std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".into()),
        jwt_secret,
        auth_service_url: std::env::var("AUTH_SERVICE_URL")
            .unwrap_or_else(|_| "http://auth-service:3001".into()),
        payment_service_url: std::env::var("PAYMENT_SERVICE_URL")
            .unwrap_or_else(|_| "http://pay-service:3002".into()),
        resource_service_url: std::env::var("RESOURCE_SERVICE_URL")
            .unwrap_or_else(|_| "http://resource-service:3003".into()),
        rate_limit_max: std::env::var("RATE_LIMIT_MAX")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(100),
        rate_limit_window_secs: std::env::var("RATE_LIMIT_WINDOW_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(60),
        rate_limit_fail_open: std::env::var("RATE_LIMIT_FAIL_OPEN")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(false),
    })
}
