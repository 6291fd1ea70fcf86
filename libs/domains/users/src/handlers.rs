use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{
    JsonBody, QueryParams, UuidPath,
    errors::responses::{
        BadRequestQueryResponse, BadRequestUuidResponse, BadRequestValidationResponse,
        InternalServerErrorResponse, NotFoundResponse,
    },
};
use serde::{Deserialize, Deserializer};
use std::sync::Arc;
use utoipa::{IntoParams, OpenApi};

use crate::error::UserResult;
use crate::filters::UserFilters;
use crate::models::{PaginatedUsers, User, UserPayload};
use crate::pagination::{Paginated, PaginationOptions};
use crate::publisher::UserEventPublisher;
use crate::repository::UserRepository;
use crate::service::UserService;

/// OpenAPI documentation for Users API
#[derive(OpenApi)]
#[openapi(
    paths(list_users, create_user, get_user, update_user, delete_user),
    components(
        schemas(User, UserPayload, PaginatedUsers, Paginated),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            BadRequestQueryResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Users", description = "User management endpoints (MongoDB + Redis notifications)")
    )
)]
pub struct ApiDoc;

type SharedService<R, P> = State<Arc<UserService<R, P>>>;

/// Create the users router with all HTTP endpoints
pub fn router<R, P>(service: UserService<R, P>) -> Router
where
    R: UserRepository + 'static,
    P: UserEventPublisher + 'static,
{
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route(
            "/{userId}",
            get(get_user).post(update_user).delete(delete_user),
        )
        .with_state(Arc::new(service))
}

/// Query string of the list endpoint
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListUsersQuery {
    /// 1-based page, defaults to 1
    #[serde(default, deserialize_with = "blank_as_none")]
    pub page: Option<i64>,
    /// Page size, defaults to 10
    #[serde(default, deserialize_with = "blank_as_none")]
    pub size: Option<i64>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Accepted but not applied as a filter
    pub nickname: Option<String>,
    pub email: Option<String>,
    pub country: Option<String>,
}

impl ListUsersQuery {
    pub fn into_parts(self) -> (PaginationOptions, UserFilters) {
        (
            PaginationOptions {
                page: self.page,
                size: self.size,
            },
            UserFilters {
                first_name: self.first_name.unwrap_or_default(),
                last_name: self.last_name.unwrap_or_default(),
                nickname: self.nickname.unwrap_or_default(),
                email: self.email.unwrap_or_default(),
                country: self.country.unwrap_or_default(),
            },
        )
    }
}

/// `page=` binds as absent; anything else must be an integer.
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

/// List users page by page with optional exact-match filters
#[utoipa::path(
    get,
    path = "",
    tag = "Users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "One page of users", body = PaginatedUsers),
        (status = 400, response = BadRequestQueryResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_users<R: UserRepository, P: UserEventPublisher + 'static>(
    State(service): SharedService<R, P>,
    QueryParams(query): QueryParams<ListUsersQuery>,
) -> UserResult<Json<PaginatedUsers>> {
    let (pagination, filters) = query.into_parts();
    let page = service.list_users(pagination, filters).await?;
    Ok(Json(page))
}

/// Create a new user
#[utoipa::path(
    post,
    path = "",
    tag = "Users",
    request_body = UserPayload,
    responses(
        (status = 201, description = "User created successfully", body = User),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_user<R: UserRepository, P: UserEventPublisher + 'static>(
    State(service): SharedService<R, P>,
    JsonBody(payload): JsonBody<UserPayload>,
) -> UserResult<impl IntoResponse> {
    let user = service.create_user(payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Get a user by ID
#[utoipa::path(
    get,
    path = "/{userId}",
    tag = "Users",
    params(
        ("userId" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User found", body = User),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_user<R: UserRepository, P: UserEventPublisher + 'static>(
    State(service): SharedService<R, P>,
    UuidPath(id): UuidPath,
) -> UserResult<Json<User>> {
    let user = service.get_user(id).await?;
    Ok(Json(user))
}

/// Replace the mutable fields of a user
#[utoipa::path(
    post,
    path = "/{userId}",
    tag = "Users",
    params(
        ("userId" = Uuid, Path, description = "User ID")
    ),
    request_body = UserPayload,
    responses(
        (status = 200, description = "User updated successfully", body = User),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_user<R: UserRepository, P: UserEventPublisher + 'static>(
    State(service): SharedService<R, P>,
    UuidPath(id): UuidPath,
    JsonBody(payload): JsonBody<UserPayload>,
) -> UserResult<Json<User>> {
    let user = service.update_user(id, payload).await?;
    Ok(Json(user))
}

/// Delete a user; succeeds for unknown ids too
#[utoipa::path(
    delete,
    path = "/{userId}",
    tag = "Users",
    params(
        ("userId" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, response = BadRequestUuidResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_user<R: UserRepository, P: UserEventPublisher + 'static>(
    State(service): SharedService<R, P>,
    UuidPath(id): UuidPath,
) -> UserResult<impl IntoResponse> {
    service.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UserError;
    use crate::models::now_millis;
    use crate::pagination::paginate;
    use crate::publisher::MockUserEventPublisher;
    use crate::repository::MockUserRepository;
    use axum::{body::Body, http::Request};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use uuid::Uuid;

    fn app(repo: MockUserRepository, publisher: MockUserEventPublisher) -> Router {
        router(UserService::new(repo, publisher))
    }

    fn quiet_publisher() -> MockUserEventPublisher {
        let mut publisher = MockUserEventPublisher::new();
        publisher.expect_notify_user_creation().returning(|_| Ok(()));
        publisher.expect_notify_user_update().returning(|_| Ok(()));
        publisher.expect_notify_user_deletion().returning(|_| Ok(()));
        publisher
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    fn full_body() -> Value {
        json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "nickname": "ada",
            "password": "hunter2",
            "email": "ada@example.com",
            "country": "GB"
        })
    }

    #[tokio::test]
    async fn test_create_returns_201_with_server_fields() {
        let mut repo = MockUserRepository::new();
        repo.expect_create().returning(|user| {
            let now = now_millis();
            Ok(User {
                id: Uuid::new_v4().to_string(),
                created_at: now,
                updated_at: now,
                ..user
            })
        });

        let (status, body) = send(
            app(repo, quiet_publisher()),
            json_request("POST", "/", full_body()),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["firstName"], "Ada");
        assert!(Uuid::parse_str(body["id"].as_str().unwrap()).is_ok());
        assert_eq!(body["createdAt"], body["updatedAt"]);
    }

    #[tokio::test]
    async fn test_create_missing_email_is_400() {
        let mut repo = MockUserRepository::new();
        repo.expect_create().never();

        let mut body = full_body();
        body.as_object_mut().unwrap().remove("email");

        let (status, body) = send(
            app(repo, MockUserEventPublisher::new()),
            json_request("POST", "/", body),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_create_malformed_json_is_400() {
        let request = Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from("{\"firstName\":"))
            .unwrap();

        let (status, body) = send(
            app(MockUserRepository::new(), MockUserEventPublisher::new()),
            request,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "JSON_EXTRACTION");
    }

    #[tokio::test]
    async fn test_get_malformed_id_is_400() {
        let (status, body) = send(
            app(MockUserRepository::new(), MockUserEventPublisher::new()),
            empty_request("GET", "/not-a-uuid"),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "INVALID_UUID");
    }

    #[tokio::test]
    async fn test_get_unknown_id_is_404() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_id()
            .returning(|id| Err(UserError::NotFound(id.to_string())));

        let id = Uuid::new_v4();
        let (status, body) = send(
            app(repo, MockUserEventPublisher::new()),
            empty_request("GET", &format!("/{id}")),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], format!("user {id} not found"));
    }

    #[tokio::test]
    async fn test_storage_failure_is_opaque_500() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_id()
            .returning(|_| Err(UserError::Storage("server selection timeout".into())));

        let (status, body) = send(
            app(repo, MockUserEventPublisher::new()),
            empty_request("GET", &format!("/{}", Uuid::new_v4())),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "DATABASE_ERROR");
        assert!(!body.to_string().contains("selection"));
    }

    #[tokio::test]
    async fn test_update_is_post_on_user_path() {
        let id = Uuid::new_v4();
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_id().returning(|id| {
            let now = now_millis();
            Ok(User {
                id: id.to_string(),
                created_at: now,
                updated_at: now,
                ..User::from(serde_json::from_value::<UserPayload>(full_body()).unwrap())
            })
        });
        repo.expect_update().returning(Ok);

        let mut body = full_body();
        body["country"] = json!("FR");

        let (status, body) = send(
            app(repo, quiet_publisher()),
            json_request("POST", &format!("/{id}"), body),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], id.to_string());
        assert_eq!(body["country"], "FR");
    }

    #[tokio::test]
    async fn test_delete_unknown_id_is_204() {
        let mut repo = MockUserRepository::new();
        repo.expect_delete_by_id().times(1).returning(|_| Ok(()));

        let (status, body) = send(
            app(repo, quiet_publisher()),
            empty_request("DELETE", &format!("/{}", Uuid::new_v4())),
        )
        .await;

        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, Value::Null);
    }

    #[tokio::test]
    async fn test_list_binds_pagination_and_filters() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_paginated_users()
            .withf(|pagination, filters| {
                *pagination == PaginationOptions::new(6, 2)
                    && filters.first_name == "Ada"
                    && filters.nickname == "ada"
            })
            .returning(|pagination, _| {
                Ok(PaginatedUsers {
                    pagination: paginate(10, pagination).envelope,
                    users: vec![],
                })
            });

        let (status, body) = send(
            app(repo, MockUserEventPublisher::new()),
            empty_request("GET", "/?page=6&size=2&firstName=Ada&nickname=ada"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalPages"], 5);
        assert_eq!(body["hasMore"], false);
        assert_eq!(body["users"], json!([]));
    }

    #[tokio::test]
    async fn test_list_blank_page_uses_defaults() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_paginated_users()
            .withf(|pagination, _| pagination.page.is_none() && pagination.size.is_none())
            .returning(|pagination, _| {
                Ok(PaginatedUsers {
                    pagination: paginate(0, pagination).envelope,
                    users: vec![],
                })
            });

        let (status, body) = send(
            app(repo, MockUserEventPublisher::new()),
            empty_request("GET", "/?page=&size="),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["currentPage"], 1);
        assert_eq!(body["size"], 10);
    }

    #[tokio::test]
    async fn test_list_non_numeric_page_is_400() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_paginated_users().never();

        let (status, body) = send(
            app(repo, MockUserEventPublisher::new()),
            empty_request("GET", "/?page=two"),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "INVALID_QUERY");
    }
}
