use axum_helpers::server::{create_production_app, health_router};
use clients::{HttpProductClient, build_http_client};
use core_config::tracing::{init_tracing, install_color_eyre};
use eyre::WrapErr;
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

    let redis = database::redis::connect_from_config(&config.redis)
        .await
        .wrap_err("Redis connection failed")?;

    let http = build_http_client(config.services.request_timeout)?;
    let products = HttpProductClient::new(http, config.services.catalog.clone());

    let state = AppState {
        jwt: axum_helpers::JwtAuth::new(&config.jwt),
        products: Arc::new(products),
        config,
        redis,
    };

    let router = axum_helpers::create_router::<openapi::ApiDoc>(api::routes(&state)).await?;
    let app = router
        .merge(health_router(state.config.app.clone()))
        .merge(api::ready_router(state.clone()));

    info!(catalog = %state.config.services.catalog, "Starting cart service");

    let server = state.config.server.clone();
    create_production_app(app, &server, Duration::from_secs(30), async move {
        // ConnectionManager closes on drop
        drop(state);
        info!("Redis connection released");
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Cart service shutdown complete");
    Ok(())
}
