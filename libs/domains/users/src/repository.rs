use async_trait::async_trait;
use uuid::Uuid;

use crate::error::UserResult;
use crate::filters::UserFilters;
use crate::models::{PaginatedUsers, User};
use crate::pagination::PaginationOptions;

/// Repository trait for User persistence
///
/// Implementations own the server-assigned fields: `create` sets the id and both
/// timestamps, `update` refreshes `updated_at`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user, ignoring any caller-supplied id or timestamps
    async fn create(&self, user: User) -> UserResult<User>;

    /// `NotFound` when no user has this id
    async fn get_by_id(&self, id: Uuid) -> UserResult<User>;

    /// Replace the stored user with the same id and return what was written
    async fn update(&self, user: User) -> UserResult<User>;

    /// Hard delete; succeeds when nothing matched
    async fn delete_by_id(&self, id: Uuid) -> UserResult<()>;

    async fn get_paginated_users(
        &self,
        pagination: PaginationOptions,
        filters: UserFilters,
    ) -> UserResult<PaginatedUsers>;
}
