use axum_helpers::server::{close_postgres, create_production_app, health_router};
use clients::{HttpOrderClient, HttpProductClient, build_http_client};
use core_config::tracing::{init_tracing, install_color_eyre};
use eyre::WrapErr;
use migration::ReviewsMigrator;
use std::{sync::Arc, time::Duration};
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

    let db = database::postgres::connect_from_config(config.database.clone())
        .await
        .wrap_err("PostgreSQL connection failed")?;

    database::postgres::run_migrations::<ReviewsMigrator>(&db, config.app.name)
        .await
        .wrap_err("Reviews migrations failed")?;

    let http = build_http_client(config.services.request_timeout)?;

    let state = AppState {
        jwt: axum_helpers::JwtAuth::new(&config.jwt),
        products: Arc::new(HttpProductClient::new(
            http.clone(),
            config.services.catalog.clone(),
        )),
        orders: Arc::new(HttpOrderClient::new(http, config.services.orders.clone())),
        config,
        db,
    };

    let router = axum_helpers::create_router::<openapi::ApiDoc>(api::routes(&state)).await?;
    let app = router
        .merge(health_router(state.config.app.clone()))
        .merge(api::ready_router(state.clone()));

    info!("Starting reviews service");

    let server = state.config.server.clone();
    let db = state.db.clone();
    create_production_app(app, &server, Duration::from_secs(30), async move {
        close_postgres(db, "reviews").await;
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Reviews service shutdown complete");
    Ok(())
}
