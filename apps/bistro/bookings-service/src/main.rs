use axum_helpers::server::{close_postgres, create_production_app, health_router};
use contracts::RedisEventPublisher;
use core_config::tracing::{init_tracing, install_color_eyre};
use eyre::WrapErr;
use migration::BookingsMigrator;
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

    let postgres = async {
        database::postgres::connect_from_config(config.database.clone())
            .await
            .wrap_err("PostgreSQL connection failed")
    };
    let redis = async {
        database::redis::connect_from_config(&config.redis)
            .await
            .wrap_err("Redis connection failed")
    };
    let (db, redis) = tokio::try_join!(postgres, redis)?;

    database::postgres::run_migrations::<BookingsMigrator>(&db, config.app.name)
        .await
        .wrap_err("Bookings migrations failed")?;

    let state = AppState {
        jwt: axum_helpers::JwtAuth::new(&config.jwt),
        publisher: Arc::new(RedisEventPublisher::new(redis.clone())),
        config,
        db,
        redis,
    };

    let router = axum_helpers::create_router::<openapi::ApiDoc>(api::routes(&state)).await?;
    let app = router
        .merge(health_router(state.config.app.clone()))
        .merge(api::ready_router(state.clone()));

    info!("Starting bookings service");

    let server = state.config.server.clone();
    let db = state.db.clone();
    create_production_app(app, &server, Duration::from_secs(30), async move {
        close_postgres(db, "bookings").await;
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Bookings service shutdown complete");
    Ok(())
}
