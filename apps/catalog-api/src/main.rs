//! Catalog API - REST server for products and brands

use axum_helpers::server::{create_production_app, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_users::PostgresUserRepository;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

mod api;
mod config;
mod notify;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    // Connect to PostgreSQL and bring the schema up to date
    let db = database::postgres::connect_from_config_with_retry(&config.database, None).await?;
    database::postgres::run_migrations::<migration::Migrator>(&db).await?;

    info!("Connected to PostgreSQL, migrations applied");

    let state = AppState {
        config: config.clone(),
        db: db.clone(),
    };

    let users = Arc::new(PostgresUserRepository::new(db.clone()));
    let notifier = notify::build_notifier(&config.environment, users)?;

    // Build REST router
    let api_routes = api::routes(&state, notifier.clone());
    let router = axum_helpers::create_router::<openapi::ApiDoc>(api_routes).await?;
    let app = router
        .merge(health_router(config.app))
        .merge(api::health::ready_router(db.clone(), notifier));

    info!("Starting Catalog API on port {}", config.server.port);

    create_production_app(app, &config.server, Duration::from_secs(30), async move {
        info!("Shutting down: closing PostgreSQL connections");
        db.close().await.ok();
        info!("PostgreSQL connection closed");
    })
    .await?;

    info!("Catalog API shutdown complete");
    Ok(())
}
