//! Users Subscriber Service
//!
//! Consumes the notifications published by the users API.
//!
//! ```text
//! Redis pub/sub (user-created, user-updated, user-deleted)
//!   ↓
//! UserEvent::decode (JSON user, or bare id for deletions)
//!   ↓
//! structured log line per event
//! ```
//!
//! Pub/sub has no replay: events published while this process is down are lost.
//! Undecodable messages are logged and skipped.

use core_config::{Environment, FromEnv, app_info};
use database::redis::RedisConfig;
use domain_users::{UserEvent, all_user_topics};
use eyre::{Result, WrapErr, eyre};
use futures::StreamExt;
use tracing::{info, warn};

/// Run the subscriber until SIGINT/SIGTERM.
///
/// # Errors
///
/// Returns an error if:
/// - Redis configuration is invalid
/// - Redis cannot be reached after retries
/// - the pub/sub connection closes
pub async fn run() -> Result<()> {
    core_config::tracing::install_color_eyre();

    let environment = Environment::from_env();
    core_config::tracing::init_tracing(&environment);

    let app_info = app_info!();
    info!(name = %app_info.name, version = %app_info.version, "Starting users subscriber");

    let redis_config = RedisConfig::from_env().wrap_err("Failed to load Redis configuration")?;
    let client = redis::Client::open(redis_config.url()).wrap_err("Invalid Redis URL")?;

    let mut pubsub = database::common::retry(|| client.get_async_pubsub())
        .await
        .wrap_err("Failed to connect to Redis")?;

    for topic in all_user_topics() {
        pubsub
            .subscribe(topic)
            .await
            .wrap_err_with(|| format!("Failed to subscribe to {topic}"))?;
    }
    info!(topics = ?all_user_topics(), "Subscribed to user notifications");

    let mut messages = pubsub.on_message();
    let shutdown = axum_helpers::shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            msg = messages.next() => {
                let Some(msg) = msg else {
                    return Err(eyre!("Redis pub/sub connection closed"));
                };

                match msg.get_payload::<String>() {
                    Ok(payload) => {
                        handle_message(msg.get_channel_name(), &payload);
                    }
                    Err(e) => warn!(
                        topic = msg.get_channel_name(),
                        error = %e,
                        "Dropping non-text notification"
                    ),
                }
            }
        }
    }

    info!("Users subscriber stopped");
    Ok(())
}

/// Decodes and logs one notification; decode failures are logged and skipped.
pub fn handle_message(topic: &str, payload: &str) -> Option<UserEvent> {
    match UserEvent::decode(topic, payload) {
        Ok(event) => {
            match &event {
                UserEvent::Created(user) | UserEvent::Updated(user) => info!(
                    topic,
                    user_id = %user.id,
                    country = %user.country,
                    "User notification received"
                ),
                UserEvent::Deleted(id) => info!(topic, user_id = %id, "User notification received"),
            }
            Some(event)
        }
        Err(e) => {
            warn!(topic, error = %e, "Skipping undecodable notification");
            None
        }
    }
}
