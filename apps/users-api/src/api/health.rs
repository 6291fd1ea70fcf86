//! Readiness endpoint

use axum::{Router, extract::State, response::IntoResponse, routing::get};
use axum_helpers::{
    HealthCheckFuture, errors::responses::ServiceUnavailableResponse, run_health_checks,
};
use database::HealthStatus;
use tracing::debug;

use crate::state::AppState;

/// `GET /v1/ready`, nested under `/api`
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/v1/ready", get(readiness_check))
        .with_state(state)
}

fn into_check(name: &str, status: HealthStatus) -> Result<(), String> {
    debug!(
        check = name,
        healthy = status.healthy,
        response_time_ms = status.response_time_ms,
        "Readiness probe finished"
    );

    if status.healthy {
        Ok(())
    } else {
        Err(status.message.unwrap_or_else(|| "unhealthy".to_string()))
    }
}

/// Readiness check - verifies MongoDB and Redis connectivity
#[utoipa::path(
    get,
    path = "/api/v1/ready",
    tag = "Health",
    responses(
        (status = 200, description = "MongoDB and Redis reachable"),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let mut redis = state.redis.clone();

    let checks: Vec<(&str, HealthCheckFuture)> = vec![
        (
            "mongodb",
            Box::pin(async {
                into_check(
                    "mongodb",
                    database::mongodb::check_health_detailed(&state.mongo_client).await,
                )
            }),
        ),
        (
            "redis",
            Box::pin(async move {
                into_check(
                    "redis",
                    database::redis::check_health_detailed(&mut redis).await,
                )
            }),
        ),
    ];

    run_health_checks(checks).await
}
