use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub admin_api_url: String,
    pub hospital_id: i64,
    pub store_timeout_secs: u64,
    pub board_idle_secs: u64,
    pub server_port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            admin_api_url: env::var("ADMIN_API_URL")
                .unwrap_or_else(|_| {
                    warn!("ADMIN_API_URL not set, using empty value");
                    String::new()
                }),
            hospital_id: parse_or("HOSPITAL_ID", 1),
            store_timeout_secs: parse_or("STORE_TIMEOUT_SECS", 10),
            board_idle_secs: parse_or("BOARD_IDLE_SECS", 1800),
            server_port: parse_or("SERVER_PORT", 3000),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.admin_api_url.is_empty()
    }

    pub fn store_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.store_timeout_secs)
    }

    /// How long an untouched board is kept before it is evicted.
    pub fn board_idle_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.board_idle_secs)
    }
}

fn parse_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("{} has invalid value '{}', using default {}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}
