//! Users API routes
//!
//! Wires the users domain to MongoDB storage and Redis notifications.

use axum::Router;
use domain_users::{MongoUserRepository, RedisUserPublisher, UserService, handlers};

use crate::state::AppState;

pub fn router(state: &AppState) -> Router {
    let repository = MongoUserRepository::new(&state.db);
    let publisher = RedisUserPublisher::new(state.redis.clone());

    let service = UserService::new(repository, publisher)
        .with_notify_timeout(state.config.notify_timeout);

    handlers::router(service)
}
