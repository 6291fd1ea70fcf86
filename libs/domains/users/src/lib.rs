//! Users Domain
//!
//! CRUD over user records stored in MongoDB, with a best-effort notification
//! on Redis pub/sub after every successful mutation.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, query/body binding
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐      ┌─────────────┐
//! │   Service   │ ───► │  Publisher  │  ← detached, fire-and-forget
//! └──────┬──────┘      └─────────────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← filters + pagination (trait + MongoDB implementation)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← User, payloads, stored document
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_users::{MongoUserRepository, RedisUserPublisher, UserService, handlers};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ::mongodb::Client::with_uri_str("mongodb://localhost:27017").await?;
//! let redis = ::redis::Client::open("redis://127.0.0.1:6379")?
//!     .get_connection_manager()
//!     .await?;
//!
//! let repository = MongoUserRepository::new(&client.database("users_service"));
//! let service = UserService::new(repository, RedisUserPublisher::new(redis));
//!
//! let router = handlers::router(service);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod events;
pub mod filters;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod pagination;
pub mod publisher;
pub mod redis;
pub mod repository;
pub mod service;

pub use self::mongodb::MongoUserRepository;
pub use self::redis::RedisUserPublisher;
pub use error::{UserError, UserResult};
pub use events::{
    EventDecodeError, TOPIC_USER_CREATED, TOPIC_USER_DELETED, TOPIC_USER_UPDATED, UserEvent,
    all_user_topics,
};
pub use filters::UserFilters;
pub use handlers::{ApiDoc, ListUsersQuery};
pub use models::{PaginatedUsers, User, UserPayload};
pub use pagination::{PageDescriptor, Paginated, PaginationOptions, paginate};
pub use publisher::UserEventPublisher;
pub use repository::UserRepository;
pub use service::{DEFAULT_NOTIFY_TIMEOUT, UserService};
