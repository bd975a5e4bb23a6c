//! Background listener marking orders Paid from `PaymentCompleted` events.

use contracts::{BistroEvents, IntegrationEvent};
use database::redis::ConnectionManager;
use domain_orders::{OrderService, PaymentCompletedHandler, PgOrderRepository};
use std::sync::Arc;
use stream_worker::{StreamWorker, WorkerConfig};
use tokio::{sync::watch, task::JoinHandle};
use tracing::{error, info};

use crate::config::CONSUMER_GROUP;

/// Spawns the worker; it stops once `shutdown` flips to `true`.
///
/// `redis` must be a connection of its own: the worker's blocking
/// XREADGROUP would otherwise stall event publishing from request handlers.
pub fn spawn(
    redis: ConnectionManager,
    orders: Arc<OrderService<PgOrderRepository>>,
    shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    let config = WorkerConfig::from_stream_def::<BistroEvents>(CONSUMER_GROUP);
    info!(
        stream = %config.stream_name,
        consumer_group = %config.consumer_group,
        consumer_id = %config.consumer_id,
        "Payment listener configured"
    );

    let worker = StreamWorker::<IntegrationEvent, _>::new(
        redis,
        Arc::new(PaymentCompletedHandler::new(orders)),
        config,
    );

    tokio::spawn(async move {
        if let Err(e) = worker.run(shutdown).await {
            error!(error = %e, "Payment listener stopped with an error");
        }
    })
}
