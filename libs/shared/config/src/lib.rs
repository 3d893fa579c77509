use std::env;
use tracing::warn;

pub const DEFAULT_STORE_TIMEOUT_SECONDS: u64 = 10;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store_url: String,
    pub store_api_key: String,
    pub store_timeout_seconds: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            store_url: env::var("ENTITY_STORE_URL")
                .unwrap_or_else(|_| {
                    warn!("ENTITY_STORE_URL not set, using empty value");
                    String::new()
                }),
            store_api_key: env::var("ENTITY_STORE_API_KEY")
                .unwrap_or_else(|_| {
                    warn!("ENTITY_STORE_API_KEY not set, using empty value");
                    String::new()
                }),
            store_timeout_seconds: env::var("ENTITY_STORE_TIMEOUT_SECONDS")
                .ok()
                .and_then(|raw| raw.parse().ok())
                .unwrap_or_else(|| {
                    warn!(
                        "ENTITY_STORE_TIMEOUT_SECONDS not set, defaulting to {}s",
                        DEFAULT_STORE_TIMEOUT_SECONDS
                    );
                    DEFAULT_STORE_TIMEOUT_SECONDS
                }),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.store_url.is_empty() && !self.store_api_key.is_empty()
    }
}
