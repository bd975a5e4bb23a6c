use axum_helpers::server::{close_postgres, create_production_app, health_router};
use clients::{HttpCartClient, HttpProductClient, HttpUserClient, build_http_client};
use contracts::RedisEventPublisher;
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_orders::{OrderClients, OrderService, PgOrderRepository};
use eyre::WrapErr;
use migration::OrdersMigrator;
use std::{sync::Arc, time::Duration};
use tokio::sync::watch;
use tracing::{info, warn};

mod api;
mod config;
mod openapi;
mod state;
mod worker;

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
    let worker_redis = async {
        database::redis::connect_from_config(&config.redis)
            .await
            .wrap_err("Redis connection for the payment listener failed")
    };
    let (db, redis, worker_redis) = tokio::try_join!(postgres, redis, worker_redis)?;

    database::postgres::run_migrations::<OrdersMigrator>(&db, config.app.name)
        .await
        .wrap_err("Orders migrations failed")?;

    let http = build_http_client(config.services.request_timeout)?;
    let clients = OrderClients {
        carts: Arc::new(HttpCartClient::new(http.clone(), config.services.cart.clone())),
        products: Arc::new(HttpProductClient::new(
            http.clone(),
            config.services.catalog.clone(),
        )),
        users: Arc::new(HttpUserClient::new(http, config.services.users.clone())),
    };

    let orders = Arc::new(OrderService::new(
        PgOrderRepository::new(db.clone()),
        Arc::new(RedisEventPublisher::new(redis.clone())),
        clients,
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let listener = worker::spawn(worker_redis, orders.clone(), shutdown_rx);

    let state = AppState {
        jwt: axum_helpers::JwtAuth::new(&config.jwt),
        config,
        db,
        redis,
        orders,
    };

    let router = axum_helpers::create_router::<openapi::ApiDoc>(api::routes(&state)).await?;
    let app = router
        .merge(health_router(state.config.app.clone()))
        .merge(api::ready_router(state.clone()));

    info!("Starting orders service");

    let server = state.config.server.clone();
    let db = state.db.clone();
    create_production_app(app, &server, Duration::from_secs(30), async move {
        let _ = shutdown_tx.send(true);
        if let Err(e) = listener.await {
            warn!(error = %e, "Payment listener task failed");
        }
        close_postgres(db, "orders").await;
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Orders service shutdown complete");
    Ok(())
}
