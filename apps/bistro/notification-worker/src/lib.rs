//! Notification worker
//!
//! Consumes every integration event through its own consumer group and sends
//! the customer-facing ones as email.
//!
//! ```text
//! Redis Stream (bistro:events)
//!   ↓ (consumer group: notifications)
//! StreamWorker<IntegrationEvent, NotificationProcessor>
//!   ↓ (renders templates)
//! TemplateEngine (Handlebars)
//!   ↓
//! EmailProvider (SMTP, or the mock in development)
//! ```
//!
//! Jobs that keep failing end up in `bistro:events:dlq`. A small HTTP server
//! answers `/health`, `/ready` and `/metrics`.

use axum::{
    Router,
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
};
use axum_helpers::server::{HealthCheckFuture, health_router, run_health_checks, shutdown_signal};
use contracts::{BistroEvents, IntegrationEvent};
use core_config::{AppInfo, Environment, FromEnv, app_info, env_optional, env_parse};
use database::redis::{ConnectionManager, RedisConfig};
use email::{
    EmailProvider, MockEmailProvider, NotificationProcessor, NotificationSettings, SmtpConfig,
    SmtpProvider, TemplateEngine,
};
use eyre::{Result, WrapErr};
use std::sync::Arc;
use stream_worker::{StreamWorker, WorkerConfig, init_metrics, render_metrics};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info, warn};

pub const CONSUMER_GROUP: &str = "notifications";

const DEFAULT_HEALTH_PORT: u16 = 8081;

/// `NOTIFICATION_WORKER_HEALTH_PORT`, then `HEALTH_PORT`, then 8081.
///
/// `PORT` is left to the HTTP services sharing the environment.
pub fn health_port() -> Result<u16> {
    let port = match env_optional("NOTIFICATION_WORKER_HEALTH_PORT") {
        Some(_) => env_parse("NOTIFICATION_WORKER_HEALTH_PORT", DEFAULT_HEALTH_PORT)?,
        None => env_parse("HEALTH_PORT", DEFAULT_HEALTH_PORT)?,
    };
    Ok(port)
}

/// SMTP when `SMTP_HOST` is set. Development without it falls back to the
/// mock provider, which only records messages.
pub fn select_provider(environment: &Environment) -> Result<Box<dyn EmailProvider>> {
    if env_optional("SMTP_HOST").is_none() && environment.is_development() {
        warn!("SMTP_HOST not set, emails are captured by the mock provider and not delivered");
        return Ok(Box::new(MockEmailProvider::new()));
    }

    let config = SmtpConfig::from_env().wrap_err("SMTP configuration error")?;
    info!(host = %config.host, port = config.port, "Using SMTP provider");
    let provider = SmtpProvider::new(config).wrap_err("Failed to create SMTP provider")?;
    Ok(Box::new(provider))
}

/// `/health`, `/ready` (Redis ping) and `/metrics`
pub fn admin_router(app_info: AppInfo, redis: ConnectionManager) -> Router {
    let ready = Router::new()
        .route("/ready", get(ready_handler))
        .with_state(redis);

    health_router(app_info)
        .merge(ready)
        .route("/metrics", get(metrics_handler))
}

async fn ready_handler(State(redis): State<ConnectionManager>) -> Response {
    let checks: Vec<(&str, HealthCheckFuture<'_>)> = vec![(
        "redis",
        Box::pin(async {
            database::redis::check_health(&redis)
                .await
                .map_err(|e| e.to_string())
        }),
    )];

    match run_health_checks(checks).await {
        Ok((status, json)) => (status, json).into_response(),
        Err((status, json)) => (status, json).into_response(),
    }
}

async fn metrics_handler() -> String {
    render_metrics()
}

async fn serve_admin(
    app: Router,
    port: u16,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr)
        .await
        .wrap_err_with(|| format!("Failed to bind health server to {}", addr))?;

    info!(port = %port, "Health and metrics server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.wait_for(|stop| *stop).await;
        })
        .await
        .wrap_err("Health server failed")
}

/// Run the worker until SIGINT/SIGTERM.
pub async fn run() -> Result<()> {
    let environment = Environment::from_env();
    core_config::tracing::init_tracing(&environment);

    init_metrics().map_err(|e| eyre::eyre!("{}", e))?;

    let app_info = app_info!();
    info!(name = %app_info.name, version = %app_info.version, ?environment, "Starting notification worker");

    let health_port = health_port()?;
    let settings = NotificationSettings::from_env()?;
    let provider = select_provider(&environment)?;
    if let Err(e) = provider.health_check().await {
        warn!(provider = provider.name(), error = %e, "Email provider health check failed");
    }

    let redis_config = RedisConfig::from_env().wrap_err("Failed to load Redis configuration")?;
    // The worker gets its own connection; blocking XREADGROUP holds it.
    let (worker_redis, admin_redis) = tokio::try_join!(
        database::redis::connect_from_config(&redis_config),
        database::redis::connect_from_config(&redis_config),
    )
    .wrap_err("Failed to connect to Redis")?;
    info!("Connected to Redis");

    let worker_config = WorkerConfig::from_stream_def::<BistroEvents>(CONSUMER_GROUP);
    info!(
        stream = %worker_config.stream_name,
        consumer_group = %worker_config.consumer_group,
        consumer_id = %worker_config.consumer_id,
        max_retries = worker_config.max_retries,
        "Worker configuration loaded"
    );

    let templates = TemplateEngine::new().wrap_err("Failed to initialize template engine")?;
    info!(templates = ?templates.list_templates(), "Template engine initialized");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    let admin = admin_router(app_info, admin_redis);
    let admin_shutdown = shutdown_rx.clone();
    let admin_handle = tokio::spawn(async move {
        if let Err(e) = serve_admin(admin, health_port, admin_shutdown).await {
            error!(error = %e, "Health server failed");
        }
    });

    let processor = NotificationProcessor::new(provider, templates, settings);
    let worker =
        StreamWorker::<IntegrationEvent, _>::new(worker_redis, Arc::new(processor), worker_config);
    worker
        .run(shutdown_rx)
        .await
        .map_err(|e| eyre::eyre!("{}", e))?;

    if let Err(e) = admin_handle.await {
        warn!(error = %e, "Health server task failed");
    }

    info!("Notification worker stopped");
    Ok(())
}
