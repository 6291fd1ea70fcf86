//! OpenAPI documentation configuration

use axum_helpers::{HealthResponse, errors::responses::ServiceUnavailableResponse};
use utoipa::OpenApi;

/// Combined OpenAPI documentation for all APIs
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Users API",
        version = "0.1.0",
        description = "User records in MongoDB with change notifications on Redis pub/sub",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    paths(crate::api::health::readiness_check),
    nest(
        (path = "/api/v1/users", api = domain_users::ApiDoc)
    ),
    components(
        schemas(HealthResponse),
        responses(ServiceUnavailableResponse)
    ),
    tags(
        (name = "Users", description = "User management endpoints (MongoDB + Redis notifications)"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;
