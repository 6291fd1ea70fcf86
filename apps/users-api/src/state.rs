//! Application state management.
//!
//! Process-wide clients are built once in `main` and shared by every handler.

use mongodb::{Client, Database};
use redis::aio::ConnectionManager;

/// Shared application state.
///
/// Cloned per router (inexpensive handle clones):
/// - Application configuration
/// - MongoDB client and database (shared connection pool)
/// - Redis connection manager (one multiplexed, self-reconnecting connection)
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    pub mongo_client: Client,
    pub db: Database,
    pub redis: ConnectionManager,
}
