//! Redis connection management and health checks

mod config;
mod connector;
mod health;

pub use config::RedisConfig;
pub use connector::{
    connect, connect_from_config, connect_from_config_with_retry, connect_with_retry,
};
pub use health::{check_health, check_health_detailed};

pub use redis::aio::ConnectionManager;
pub use redis::{Client, RedisResult};
