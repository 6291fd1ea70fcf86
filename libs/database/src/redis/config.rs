#[cfg(feature = "config")]
use core_config::{ConfigError, FromEnv, env_or_default};

const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

/// Redis connection settings
///
/// Credentials and database index travel inside the URL
/// (`redis://[user:password@]host:port[/db]`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RedisConfig {
    pub url: String,
}

impl RedisConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self::new(DEFAULT_REDIS_URL)
    }
}

/// Reads `REDIS_URL`, defaulting to `redis://127.0.0.1:6379`.
#[cfg(feature = "config")]
impl FromEnv for RedisConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let url = env_or_default("REDIS_URL", DEFAULT_REDIS_URL);
        if url.trim().is_empty() {
            return Err(ConfigError::ParseError {
                key: "REDIS_URL".to_string(),
                details: "must not be empty".to_string(),
            });
        }
        Ok(Self::new(url))
    }
}
