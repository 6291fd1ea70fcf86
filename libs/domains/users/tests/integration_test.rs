//! Integration tests for the Users domain
//!
//! Real MongoDB and Redis via testcontainers:
//! - repository round trips and server-assigned fields
//! - pagination and filtering against stored documents
//! - the wire format seen by a pub/sub subscriber

use std::time::Duration;

use domain_users::*;
use futures::StreamExt;
use test_utils::{TestDataBuilder, TestMongo, TestRedis};
use uuid::Uuid;

fn user(first_name: &str, country: &str, builder: &TestDataBuilder) -> User {
    User {
        first_name: first_name.to_string(),
        last_name: "Tester".to_string(),
        nickname: first_name.to_lowercase(),
        password: "p4ssw0rd".to_string(),
        email: builder.email(&first_name.to_lowercase()),
        country: country.to_string(),
        ..Default::default()
    }
}

async fn repository(mongo: &TestMongo, test_name: &str) -> MongoUserRepository {
    let builder = TestDataBuilder::from_test_name(test_name);
    let repo = MongoUserRepository::new(&mongo.database(&builder.database_name()));
    repo.create_indexes().await.unwrap();
    repo
}

// ============================================================================
// Repository Tests
// ============================================================================

#[tokio::test]
async fn test_create_then_get_round_trips() {
    let mongo = TestMongo::new().await;
    let repo = repository(&mongo, "create_then_get").await;
    let builder = TestDataBuilder::from_test_name("create_then_get");

    let mut input = user("Ada", "GB", &builder);
    input.id = "caller-supplied".to_string();

    let created = repo.create(input).await.unwrap();

    let id = Uuid::parse_str(&created.id).expect("server assigns a UUID");
    assert_eq!(id.get_version_num(), 4);
    assert_eq!(created.created_at, created.updated_at);

    let fetched = repo.get_by_id(id).await.unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_get_unknown_id_is_not_found() {
    let mongo = TestMongo::new().await;
    let repo = repository(&mongo, "get_unknown").await;
    let id = TestDataBuilder::from_test_name("get_unknown").user_id();

    let err = repo.get_by_id(id).await.unwrap_err();
    assert!(matches!(err, UserError::NotFound(ref missing) if *missing == id.to_string()));
}

#[tokio::test]
async fn test_update_refreshes_updated_at_only() {
    let mongo = TestMongo::new().await;
    let repo = repository(&mongo, "update_refresh").await;
    let builder = TestDataBuilder::from_test_name("update_refresh");

    let created = repo.create(user("Ada", "GB", &builder)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;

    let mut changed = created.clone();
    changed.country = "FR".to_string();
    let updated = repo.update(changed).await.unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.country, "FR");
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at > created.updated_at);
}

#[tokio::test]
async fn test_update_unknown_id_is_not_found() {
    let mongo = TestMongo::new().await;
    let repo = repository(&mongo, "update_unknown").await;
    let builder = TestDataBuilder::from_test_name("update_unknown");

    let mut ghost = user("Ghost", "NL", &builder);
    ghost.id = builder.user_id().to_string();

    let err = repo.update(ghost).await.unwrap_err();
    assert!(matches!(err, UserError::NotFound(_)));
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let mongo = TestMongo::new().await;
    let repo = repository(&mongo, "delete_twice").await;
    let builder = TestDataBuilder::from_test_name("delete_twice");

    let created = repo.create(user("Ada", "GB", &builder)).await.unwrap();
    let id = Uuid::parse_str(&created.id).unwrap();

    repo.delete_by_id(id).await.unwrap();
    repo.delete_by_id(id).await.unwrap();

    assert!(matches!(
        repo.get_by_id(id).await,
        Err(UserError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_pagination_over_stored_users() {
    let mongo = TestMongo::new().await;
    let repo = repository(&mongo, "paginate").await;
    let builder = TestDataBuilder::from_test_name("paginate");

    let mut created = Vec::new();
    for i in 0..10 {
        created.push(repo.create(user(&format!("User{i}"), "NL", &builder)).await.unwrap());
    }

    let first = repo
        .get_paginated_users(PaginationOptions::new(1, 2), UserFilters::default())
        .await
        .unwrap();
    assert_eq!(first.pagination.total_count, 10);
    assert_eq!(first.pagination.total_pages, 5);
    assert!(first.pagination.has_more);
    assert_eq!(first.users.len(), 2);

    let last = repo
        .get_paginated_users(PaginationOptions::new(5, 2), UserFilters::default())
        .await
        .unwrap();
    assert!(!last.pagination.has_more);
    assert_eq!(last.users.len(), 2);

    let beyond = repo
        .get_paginated_users(PaginationOptions::new(6, 2), UserFilters::default())
        .await
        .unwrap();
    assert_eq!(beyond.pagination.total_pages, 5);
    assert_eq!(beyond.pagination.current_page, 6);
    assert!(!beyond.pagination.has_more);
    assert!(beyond.users.is_empty());

    let mut seen: Vec<String> = Vec::new();
    for page in 1..=5 {
        let slice = repo
            .get_paginated_users(PaginationOptions::new(page, 2), UserFilters::default())
            .await
            .unwrap();
        seen.extend(slice.users.into_iter().map(|u| u.id));
    }
    let mut expected: Vec<String> = created.into_iter().map(|u| u.id).collect();
    seen.sort();
    expected.sort();
    assert_eq!(seen, expected, "pages must cover every user exactly once");
}

#[tokio::test]
async fn test_default_pagination_applies() {
    let mongo = TestMongo::new().await;
    let repo = repository(&mongo, "default_page").await;
    let builder = TestDataBuilder::from_test_name("default_page");

    for i in 0..12 {
        repo.create(user(&format!("U{i}"), "DE", &builder)).await.unwrap();
    }

    let page = repo
        .get_paginated_users(PaginationOptions::new(0, -5), UserFilters::default())
        .await
        .unwrap();

    assert_eq!(page.pagination.current_page, 1);
    assert_eq!(page.pagination.size, 10);
    assert_eq!(page.users.len(), 10);
    assert!(page.pagination.has_more);
}

#[tokio::test]
async fn test_filters_drive_count_and_find() {
    let mongo = TestMongo::new().await;
    let repo = repository(&mongo, "filters").await;
    let builder = TestDataBuilder::from_test_name("filters");

    repo.create(user("Ada", "GB", &builder)).await.unwrap();
    repo.create(user("Alan", "GB", &builder)).await.unwrap();
    repo.create(user("Ada", "FR", &builder)).await.unwrap();

    let by_country = repo
        .get_paginated_users(
            PaginationOptions::default(),
            UserFilters {
                country: "GB".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(by_country.pagination.total_count, 2);
    assert!(by_country.users.iter().all(|u| u.country == "GB"));

    let conjunction = repo
        .get_paginated_users(
            PaginationOptions::default(),
            UserFilters {
                first_name: "Ada".into(),
                country: "FR".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(conjunction.pagination.total_count, 1);
    assert_eq!(conjunction.users[0].country, "FR");

    // nickname is not applied
    let by_nickname = repo
        .get_paginated_users(
            PaginationOptions::default(),
            UserFilters {
                nickname: "nobody".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(by_nickname.pagination.total_count, 3);
}

// ============================================================================
// Publisher Tests
// ============================================================================

#[tokio::test]
async fn test_publisher_wire_format() {
    let redis = TestRedis::new().await;
    let builder = TestDataBuilder::from_test_name("publisher_wire_format");

    let mut pubsub = redis.client().get_async_pubsub().await.unwrap();
    for topic in all_user_topics() {
        pubsub.subscribe(topic).await.unwrap();
    }

    let publisher = RedisUserPublisher::new(redis.connection_manager().await);
    let mut created = user("Ada", "GB", &builder);
    created.id = builder.user_id().to_string();

    publisher.notify_user_creation(created.clone()).await.unwrap();
    publisher
        .notify_user_deletion(created.id.clone())
        .await
        .unwrap();

    let mut messages = pubsub.on_message();

    let msg = tokio::time::timeout(Duration::from_secs(5), messages.next())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(msg.get_channel_name(), TOPIC_USER_CREATED);
    let body: String = msg.get_payload().unwrap();
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["id"], created.id);
    assert_eq!(json["password"], "p4ssw0rd");

    let msg = tokio::time::timeout(Duration::from_secs(5), messages.next())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(msg.get_channel_name(), TOPIC_USER_DELETED);
    let body: String = msg.get_payload().unwrap();
    assert_eq!(body, created.id);
}

#[tokio::test]
async fn test_service_notifies_after_commit() {
    let mongo = TestMongo::new().await;
    let redis = TestRedis::new().await;
    let repo = repository(&mongo, "service_notifies").await;

    let mut pubsub = redis.client().get_async_pubsub().await.unwrap();
    pubsub.subscribe(TOPIC_USER_CREATED).await.unwrap();

    let service = UserService::new(repo, RedisUserPublisher::new(redis.connection_manager().await));
    let created = service
        .create_user(UserPayload {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            nickname: "ada".into(),
            password: "hunter2".into(),
            email: "ada@example.com".into(),
            country: "GB".into(),
        })
        .await
        .unwrap();

    let mut messages = pubsub.on_message();
    let msg = tokio::time::timeout(Duration::from_secs(5), messages.next())
        .await
        .unwrap()
        .unwrap();
    let body: String = msg.get_payload().unwrap();

    assert_eq!(
        UserEvent::decode(msg.get_channel_name(), &body).unwrap(),
        UserEvent::Created(created)
    );
}
