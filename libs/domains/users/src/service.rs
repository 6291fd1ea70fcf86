//! User Service - validation, persistence and notification dispatch

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::error::UserResult;
use crate::events::UserEvent;
use crate::filters::UserFilters;
use crate::models::{PaginatedUsers, User, UserPayload};
use crate::pagination::PaginationOptions;
use crate::publisher::UserEventPublisher;
use crate::repository::UserRepository;

pub const DEFAULT_NOTIFY_TIMEOUT: Duration = Duration::from_secs(5);

/// Runs every mutation as validate, then store, then notify.
///
/// Notifications go out on a detached task after the mutation succeeded; the
/// caller never waits on them and never sees their failures.
pub struct UserService<R: UserRepository, P: UserEventPublisher> {
    repository: Arc<R>,
    publisher: Arc<P>,
    notify_timeout: Duration,
}

impl<R: UserRepository, P: UserEventPublisher + 'static> UserService<R, P> {
    pub fn new(repository: R, publisher: P) -> Self {
        Self {
            repository: Arc::new(repository),
            publisher: Arc::new(publisher),
            notify_timeout: DEFAULT_NOTIFY_TIMEOUT,
        }
    }

    /// Upper bound for a single detached publish
    pub fn with_notify_timeout(mut self, notify_timeout: Duration) -> Self {
        self.notify_timeout = notify_timeout;
        self
    }

    #[instrument(skip(self, payload))]
    pub async fn create_user(&self, payload: UserPayload) -> UserResult<User> {
        let user = User::from(payload);
        user.validate()?;

        let created = self.repository.create(user).await?;
        self.dispatch(UserEvent::Created(created.clone()));

        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, id: Uuid) -> UserResult<User> {
        self.repository.get_by_id(id).await
    }

    /// Merges `payload` into the stored user and persists the result.
    ///
    /// Every mutable field is replaced, so an omitted field empties the stored
    /// value and the merged record then fails validation.
    #[instrument(skip(self, payload))]
    pub async fn update_user(&self, id: Uuid, payload: UserPayload) -> UserResult<User> {
        let mut user = self.repository.get_by_id(id).await?;
        user.merge(User::from(payload));
        user.validate()?;

        let updated = self.repository.update(user).await?;
        self.dispatch(UserEvent::Updated(updated.clone()));

        Ok(updated)
    }

    /// Succeeds whether or not the user existed.
    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: Uuid) -> UserResult<()> {
        self.repository.delete_by_id(id).await?;
        self.dispatch(UserEvent::Deleted(id.to_string()));
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn list_users(
        &self,
        pagination: PaginationOptions,
        filters: UserFilters,
    ) -> UserResult<PaginatedUsers> {
        self.repository
            .get_paginated_users(pagination, filters)
            .await
    }

    fn dispatch(&self, event: UserEvent) {
        let publisher = Arc::clone(&self.publisher);
        let notify_timeout = self.notify_timeout;
        let topic = event.topic();

        tokio::spawn(async move {
            let publish = async {
                match event {
                    UserEvent::Created(user) => publisher.notify_user_creation(user).await,
                    UserEvent::Updated(user) => publisher.notify_user_update(user).await,
                    UserEvent::Deleted(id) => publisher.notify_user_deletion(id).await,
                }
            };

            match tokio::time::timeout(notify_timeout, publish).await {
                Ok(Ok(())) => debug!(topic, "User notification sent"),
                Ok(Err(e)) => warn!(topic, error = %e, "Failed to publish user notification"),
                Err(_) => warn!(
                    topic,
                    timeout_ms = notify_timeout.as_millis() as u64,
                    "User notification timed out"
                ),
            }
        });
    }
}

impl<R: UserRepository, P: UserEventPublisher> Clone for UserService<R, P> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            publisher: Arc::clone(&self.publisher),
            notify_timeout: self.notify_timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UserError;
    use crate::models::now_millis;
    use crate::pagination::paginate;
    use crate::publisher::MockUserEventPublisher;
    use crate::repository::MockUserRepository;
    use tokio::sync::mpsc;

    fn payload() -> UserPayload {
        UserPayload {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            nickname: "ada".into(),
            password: "hunter2".into(),
            email: "ada@example.com".into(),
            country: "GB".into(),
        }
    }

    fn stored(id: Uuid) -> User {
        let now = now_millis();
        User {
            id: id.to_string(),
            created_at: now,
            updated_at: now,
            ..User::from(payload())
        }
    }

    async fn next<T>(rx: &mut mpsc::UnboundedReceiver<T>) -> T {
        tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("notification was not dispatched")
            .expect("channel closed")
    }

    #[tokio::test]
    async fn test_create_missing_email_touches_nothing() {
        let mut repo = MockUserRepository::new();
        repo.expect_create().never();
        let mut publisher = MockUserEventPublisher::new();
        publisher.expect_notify_user_creation().never();

        let service = UserService::new(repo, publisher);
        let result = service
            .create_user(UserPayload {
                email: String::new(),
                ..payload()
            })
            .await;

        assert!(matches!(result, Err(UserError::Validation(ref m)) if m.contains("email")));
    }

    #[tokio::test]
    async fn test_create_notifies_with_persisted_user() {
        let id = Uuid::new_v4();
        let mut repo = MockUserRepository::new();
        repo.expect_create()
            .times(1)
            .returning(move |user| {
                Ok(User {
                    id: id.to_string(),
                    ..user
                })
            });

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut publisher = MockUserEventPublisher::new();
        publisher
            .expect_notify_user_creation()
            .times(1)
            .returning(move |user| {
                tx.send(user).unwrap();
                Ok(())
            });

        let service = UserService::new(repo, publisher);
        let created = service.create_user(payload()).await.unwrap();

        assert_eq!(created.id, id.to_string());
        assert_eq!(next(&mut rx).await, created);
    }

    #[tokio::test]
    async fn test_publish_failure_does_not_fail_the_mutation() {
        let id = Uuid::new_v4();
        let mut repo = MockUserRepository::new();
        repo.expect_delete_by_id().returning(|_| Ok(()));

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut publisher = MockUserEventPublisher::new();
        publisher.expect_notify_user_deletion().returning(move |id| {
            tx.send(id).unwrap();
            Err(UserError::Publish("broker down".into()))
        });

        let service = UserService::new(repo, publisher);
        service.delete_user(id).await.unwrap();

        assert_eq!(next(&mut rx).await, id.to_string());
    }

    #[tokio::test]
    async fn test_update_with_partial_payload_is_rejected_after_merge() {
        let id = Uuid::new_v4();
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_id()
            .with(mockall::predicate::eq(id))
            .returning(move |id| Ok(stored(id)));
        repo.expect_update().never();
        let mut publisher = MockUserEventPublisher::new();
        publisher.expect_notify_user_update().never();

        let service = UserService::new(repo, publisher);
        let result = service
            .update_user(
                id,
                UserPayload {
                    first_name: "X".into(),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(UserError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_persists_merged_user_and_keeps_identity() {
        let id = Uuid::new_v4();
        let original = stored(id);
        let created_at = original.created_at;

        let mut repo = MockUserRepository::new();
        repo.expect_get_by_id()
            .returning(move |_| Ok(original.clone()));
        repo.expect_update()
            .withf(move |user| user.id == id.to_string() && user.first_name == "Grace")
            .returning(Ok);

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut publisher = MockUserEventPublisher::new();
        publisher.expect_notify_user_update().returning(move |user| {
            tx.send(user).unwrap();
            Ok(())
        });

        let service = UserService::new(repo, publisher);
        let updated = service
            .update_user(
                id,
                UserPayload {
                    first_name: "Grace".into(),
                    ..payload()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.created_at, created_at);
        assert_eq!(next(&mut rx).await.first_name, "Grace");
    }

    #[tokio::test]
    async fn test_update_unknown_user_is_not_found() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_id()
            .returning(|id| Err(UserError::NotFound(id.to_string())));
        repo.expect_update().never();

        let service = UserService::new(repo, MockUserEventPublisher::new());
        let result = service.update_user(Uuid::new_v4(), payload()).await;

        assert!(matches!(result, Err(UserError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_passes_options_through() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_paginated_users()
            .withf(|pagination, filters| {
                pagination.page == Some(2) && filters.country == "NL"
            })
            .returning(|pagination, _| {
                Ok(PaginatedUsers {
                    pagination: paginate(0, pagination).envelope,
                    users: vec![],
                })
            });

        let service = UserService::new(repo, MockUserEventPublisher::new());
        let page = service
            .list_users(
                PaginationOptions {
                    page: Some(2),
                    size: None,
                },
                UserFilters {
                    country: "NL".into(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(page.pagination.current_page, 2);
        assert!(page.users.is_empty());
    }

    #[tokio::test]
    async fn test_storage_failure_skips_notification() {
        let mut repo = MockUserRepository::new();
        repo.expect_create()
            .returning(|_| Err(UserError::Storage("write concern".into())));
        let mut publisher = MockUserEventPublisher::new();
        publisher.expect_notify_user_creation().never();

        let service = UserService::new(repo, publisher)
            .with_notify_timeout(Duration::from_millis(50));
        let result = service.create_user(payload()).await;

        assert!(matches!(result, Err(UserError::Storage(_))));
    }
}
