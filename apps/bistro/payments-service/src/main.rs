use axum_helpers::server::{close_postgres, create_production_app, health_router};
use clients::{HttpOrderClient, build_http_client};
use contracts::RedisEventPublisher;
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_payments::{FakePaymentGateway, PaymentGateway, StripeGateway};
use eyre::WrapErr;
use migration::PaymentsMigrator;
use std::{sync::Arc, time::Duration};
use tracing::{info, warn};

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

    database::postgres::run_migrations::<PaymentsMigrator>(&db, config.app.name)
        .await
        .wrap_err("Payments migrations failed")?;

    let http = build_http_client(config.services.request_timeout)?;

    let gateway: Arc<dyn PaymentGateway> = match &config.stripe {
        Some(stripe) => Arc::new(StripeGateway::new(http.clone(), stripe.clone())),
        None => {
            warn!("STRIPE_SECRET_KEY not set, using the fake payment gateway");
            Arc::new(FakePaymentGateway::new())
        }
    };
    info!(provider = gateway.provider(), "Payment gateway ready");

    let state = AppState {
        jwt: axum_helpers::JwtAuth::new(&config.jwt),
        orders: Arc::new(HttpOrderClient::new(http, config.services.orders.clone())),
        publisher: Arc::new(RedisEventPublisher::new(redis.clone())),
        gateway,
        config,
        db,
        redis,
    };

    let router = axum_helpers::create_router::<openapi::ApiDoc>(api::routes(&state)).await?;
    let app = router
        .merge(health_router(state.config.app.clone()))
        .merge(api::ready_router(state.clone()));

    info!("Starting payments service");

    let server = state.config.server.clone();
    let db = state.db.clone();
    create_production_app(app, &server, Duration::from_secs(30), async move {
        close_postgres(db, "payments").await;
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Payments service shutdown complete");
    Ok(())
}
