use super::shutdown::ShutdownCoordinator;
use crate::errors::handlers::{method_not_allowed, not_found};
use crate::http::{cors_layer_from_env, security_headers};
use axum::{Router, http::StatusCode, middleware};
use core_config::server::ServerConfig;
use std::io;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info};
use utoipa::OpenApi;

/// Combines domain routes with documentation and cross-cutting middleware.
///
/// - OpenAPI JSON at `/api-docs/openapi.json`, Swagger UI at `/swagger-ui`,
///   plus ReDoc, RapiDoc and Scalar
/// - `apis` nested under `/api`
/// - every request bounded by `request_timeout` (408 when exceeded, which
///   drops the handler future and whatever storage call it was awaiting)
/// - access logs, security headers, CORS from `CORS_ALLOWED_ORIGIN`, compression
/// - JSON 404/405 fallbacks
///
/// `apis` must already have its state applied.
///
/// # Errors
/// Fails when `CORS_ALLOWED_ORIGIN` is set to an empty or invalid value.
pub fn create_router<T>(apis: Router, request_timeout: Duration) -> io::Result<Router>
where
    T: OpenApi + 'static,
{
    use utoipa_rapidoc::RapiDoc;
    use utoipa_redoc::{Redoc, Servable as RedocServable};
    use utoipa_scalar::{Scalar, Servable as ScalarServable};
    use utoipa_swagger_ui::SwaggerUi;

    let cors_layer = cors_layer_from_env()?;

    let router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", T::openapi()))
        .merge(Redoc::with_url("/redoc", T::openapi()))
        .merge(RapiDoc::new("/api-docs/openapi.json").path("/rapidoc"))
        .merge(Scalar::with_url("/scalar", T::openapi()))
        .nest("/api", apis)
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(middleware::from_fn(security_headers))
        .layer(cors_layer)
        .layer(CompressionLayer::new());

    Ok(router)
}

/// Serves `router` until SIGINT/SIGTERM, then runs `cleanup` within
/// `server_config.shutdown_timeout`.
///
/// `cleanup` starts only after every in-flight request has completed, so it
/// may close the connections those requests use.
pub async fn create_production_app<F>(
    router: Router,
    server_config: &ServerConfig,
    cleanup: F,
) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(server_config.address()).await?;
    info!("Server starting on {}", listener.local_addr()?);

    let coordinator = ShutdownCoordinator::new();
    serve_then_cleanup(
        listener,
        router,
        async move { coordinator.wait_for_signal().await },
        cleanup,
        server_config.shutdown_timeout,
    )
    .await
}

async fn serve_then_cleanup<S, F>(
    listener: TcpListener,
    router: Router,
    signal: S,
    cleanup: F,
    shutdown_timeout: Duration,
) -> io::Result<()>
where
    S: Future<Output = ()> + Send + 'static,
    F: Future<Output = ()>,
{
    let serve_result = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(signal)
        .await
        .inspect_err(|e| {
            tracing::error!("Server encountered an error: {:?}", e);
        });

    // also reached on a serve error, which skips the signal path
    info!(timeout = ?shutdown_timeout, "Starting cleanup tasks");
    match tokio::time::timeout(shutdown_timeout, cleanup).await {
        Ok(()) => info!("Cleanup completed successfully"),
        Err(_) => tracing::warn!(
            "Cleanup exceeded timeout of {:?}, forcing shutdown",
            shutdown_timeout
        ),
    }

    serve_result
}
