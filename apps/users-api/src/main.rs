use axum_helpers::server::{
    CleanupCoordinator, create_production_app, create_router, health_router,
};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_users::MongoUserRepository;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    info!(
        app = config.app.name,
        version = config.app.version,
        database = %config.mongodb.database,
        "Starting users API"
    );

    let mongo_client =
        database::mongodb::connect_from_config_with_retry(&config.mongodb, None).await?;
    let db = mongo_client.database(&config.mongodb.database);

    MongoUserRepository::new(&db).create_indexes().await?;

    let redis = database::redis::connect_from_config_with_retry(&config.redis, None).await?;

    let state = AppState {
        config,
        mongo_client,
        db,
        redis,
    };

    let api_routes = api::routes(&state);
    let app = create_router::<openapi::ApiDoc>(api_routes, state.config.server.request_timeout)?
        .merge(health_router(state.config.app));

    let server = state.config.server.clone();
    create_production_app(app, &server, async move {
        let AppState {
            mongo_client,
            db,
            redis,
            ..
        } = state;

        let mut cleanup = CleanupCoordinator::new();
        cleanup.add_task("mongodb", async move {
            drop(db);
            mongo_client.shutdown().await;
        });
        cleanup.add_task("redis", async move { drop(redis) });
        cleanup.run().await;
    })
    .await?;

    info!("Users API shutdown complete");
    Ok(())
}
