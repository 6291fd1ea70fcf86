use std::future::Future;
use std::time::Instant;

/// Outcome of a single dependency probe, as reported by readiness endpoints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthStatus {
    pub healthy: bool,
    /// Error detail when unhealthy
    pub message: Option<String>,
    pub response_time_ms: u64,
}

impl HealthStatus {
    pub fn healthy(response_time_ms: u64) -> Self {
        Self {
            healthy: true,
            message: None,
            response_time_ms,
        }
    }

    pub fn unhealthy(message: impl Into<String>, response_time_ms: u64) -> Self {
        Self {
            healthy: false,
            message: Some(message.into()),
            response_time_ms,
        }
    }

    /// Runs `probe` and records how long it took.
    pub(crate) async fn measure<F, E>(probe: F) -> Self
    where
        F: Future<Output = Result<(), E>>,
        E: std::fmt::Display,
    {
        let start = Instant::now();
        let result = probe.await;
        let elapsed = start.elapsed().as_millis() as u64;

        match result {
            Ok(()) => Self::healthy(elapsed),
            Err(e) => Self::unhealthy(e.to_string(), elapsed),
        }
    }
}
