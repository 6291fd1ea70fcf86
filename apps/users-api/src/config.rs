use core_config::{AppInfo, FromEnv, app_info, env_parse_or, server::ServerConfig};
use database::mongodb::MongoConfig;
use database::redis::RedisConfig;
use std::time::Duration;

pub use core_config::Environment;

const DEFAULT_NOTIFY_TIMEOUT_SECS: u64 = 5;

/// Application-specific configuration
/// Composes shared config components from the `config` and `database` libraries
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub mongodb: MongoConfig,
    pub redis: RedisConfig,
    pub server: ServerConfig,
    pub environment: Environment,
    /// Upper bound for one detached notification publish (`NOTIFY_TIMEOUT_SECS`)
    pub notify_timeout: Duration,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let app = app_info!();
        let environment = Environment::from_env();

        let mut mongodb = MongoConfig::from_env()?;
        if mongodb.app_name.is_none() {
            mongodb = mongodb.with_app_name(app.name);
        }

        let redis = RedisConfig::from_env()?;
        let server = ServerConfig::from_env()?;
        let notify_timeout = env_parse_or("NOTIFY_TIMEOUT_SECS", DEFAULT_NOTIFY_TIMEOUT_SECS)?;

        Ok(Self {
            app,
            mongodb,
            redis,
            server,
            environment,
            notify_timeout: Duration::from_secs(notify_timeout),
        })
    }
}
