use mongodb::Client;
use tracing::debug;

use super::connector::ping;
use crate::common::{DatabaseError, DatabaseResult, HealthStatus};

/// Pings the deployment; used by readiness probes.
pub async fn check_health(client: &Client) -> DatabaseResult<()> {
    debug!("Running MongoDB health check");
    ping(client)
        .await
        .map_err(|e| DatabaseError::HealthCheckFailed(format!("MongoDB ping failed: {e}")))
}

/// Like [`check_health`], with timing.
pub async fn check_health_detailed(client: &Client) -> HealthStatus {
    HealthStatus::measure(check_health(client)).await
}
