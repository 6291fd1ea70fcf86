use redis::aio::ConnectionManager;
use tracing::debug;

use crate::common::{DatabaseError, DatabaseResult, HealthStatus};

/// Sends `PING` and expects `PONG`.
pub async fn check_health(conn: &mut ConnectionManager) -> DatabaseResult<()> {
    debug!("Running Redis health check");

    let response: String = redis::cmd("PING")
        .query_async(conn)
        .await
        .map_err(|e| DatabaseError::HealthCheckFailed(format!("Redis PING failed: {e}")))?;

    if response != "PONG" {
        return Err(DatabaseError::HealthCheckFailed(format!(
            "Redis PING returned unexpected response: {response}"
        )));
    }
    Ok(())
}

/// Like [`check_health`], with timing.
pub async fn check_health_detailed(conn: &mut ConnectionManager) -> HealthStatus {
    HealthStatus::measure(check_health(conn)).await
}
