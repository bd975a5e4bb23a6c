use axum_helpers::JwtAuth;
use clients::OrderClient;
use contracts::EventPublisher;
use domain_payments::PaymentGateway;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    pub db: database::postgres::DatabaseConnection,
    pub redis: database::redis::ConnectionManager,
    pub jwt: JwtAuth,
    pub gateway: Arc<dyn PaymentGateway>,
    pub orders: Arc<dyn OrderClient>,
    pub publisher: Arc<dyn EventPublisher>,
}
