//! Connectors and helpers for the stores behind the users service.
//!
//! # Features
//!
//! - `mongodb` (default) - MongoDB client, config and ping-based health checks
//! - `redis` (default) - Redis `ConnectionManager`, config and health checks
//! - `config` - `core_config::FromEnv` implementations for the configs
//!
//! # Examples
//!
//! ## MongoDB
//!
//! ```ignore
//! use database::mongodb::{MongoConfig, connect_from_config_with_retry};
//!
//! let config = MongoConfig::with_database("mongodb://localhost:27017", "users");
//! let client = connect_from_config_with_retry(&config, None).await?;
//! let users = client.database(&config.database).collection::<Document>("users");
//! ```
//!
//! ## Redis
//!
//! ```ignore
//! use database::redis;
//!
//! let mut conn = redis::connect("redis://127.0.0.1:6379").await?;
//! redis::check_health(&mut conn).await?;
//! ```

pub mod common;

#[cfg(feature = "redis")]
pub mod redis;

#[cfg(feature = "mongodb")]
pub mod mongodb;

pub use common::{DatabaseError, DatabaseResult, HealthStatus};
