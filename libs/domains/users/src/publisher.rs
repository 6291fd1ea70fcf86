use async_trait::async_trait;

use crate::error::UserResult;
use crate::models::User;

/// Outbound notifications for user mutations.
///
/// Implementations publish once with no retry; callers decide whether a
/// failure matters (the service only logs it).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserEventPublisher: Send + Sync {
    async fn notify_user_creation(&self, user: User) -> UserResult<()>;

    async fn notify_user_update(&self, user: User) -> UserResult<()>;

    /// Publishes the bare id of a deleted user
    async fn notify_user_deletion(&self, id: String) -> UserResult<()>;
}
