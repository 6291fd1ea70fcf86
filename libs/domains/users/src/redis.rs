//! Redis pub/sub implementation of UserEventPublisher

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use tracing::{debug, instrument};

use crate::error::UserResult;
use crate::events::UserEvent;
use crate::models::User;
use crate::publisher::UserEventPublisher;

/// Publishes user events on the `user-*` channels.
///
/// The connection manager is a cheap handle over one multiplexed connection
/// that reconnects on its own.
#[derive(Clone)]
pub struct RedisUserPublisher {
    conn: ConnectionManager,
}

impl RedisUserPublisher {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    #[instrument(skip(self, event), fields(topic = event.topic()))]
    async fn publish(&self, event: UserEvent) -> UserResult<()> {
        let payload = event.payload()?;
        let mut conn = self.conn.clone();

        let receivers: i64 = redis::cmd("PUBLISH")
            .arg(event.topic())
            .arg(payload)
            .query_async(&mut conn)
            .await?;

        debug!(receivers, "User event published");
        Ok(())
    }
}

#[async_trait]
impl UserEventPublisher for RedisUserPublisher {
    async fn notify_user_creation(&self, user: User) -> UserResult<()> {
        self.publish(UserEvent::Created(user)).await
    }

    async fn notify_user_update(&self, user: User) -> UserResult<()> {
        self.publish(UserEvent::Updated(user)).await
    }

    async fn notify_user_deletion(&self, id: String) -> UserResult<()> {
        self.publish(UserEvent::Deleted(id)).await
    }
}
