use redis::Client;
use redis::aio::ConnectionManager;
use tracing::info;

use super::RedisConfig;
use crate::common::{RetryConfig, retry, retry_with_backoff};

/// Opens a reconnecting `ConnectionManager` and verifies it with `PING`.
///
/// ```ignore
/// let mut conn = database::redis::connect("redis://127.0.0.1:6379").await?;
/// ```
pub async fn connect(url: &str) -> redis::RedisResult<ConnectionManager> {
    info!("Connecting to Redis");

    let client = Client::open(url)?;
    let manager = ConnectionManager::new(client).await?;

    let mut conn = manager.clone();
    let _: String = redis::cmd("PING").query_async(&mut conn).await?;

    info!("Connected to Redis");
    Ok(manager)
}

pub async fn connect_from_config(config: &RedisConfig) -> redis::RedisResult<ConnectionManager> {
    connect(config.url()).await
}

/// [`connect`] wrapped in [`retry_with_backoff`]; `None` uses the default policy.
pub async fn connect_with_retry(
    url: &str,
    retry_config: Option<RetryConfig>,
) -> redis::RedisResult<ConnectionManager> {
    match retry_config {
        Some(policy) => retry_with_backoff(|| connect(url), policy).await,
        None => retry(|| connect(url)).await,
    }
}

pub async fn connect_from_config_with_retry(
    config: &RedisConfig,
    retry_config: Option<RetryConfig>,
) -> redis::RedisResult<ConnectionManager> {
    connect_with_retry(config.url(), retry_config).await
}
