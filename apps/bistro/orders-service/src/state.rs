use axum_helpers::JwtAuth;
use domain_orders::{OrderService, PgOrderRepository};
use std::sync::Arc;

/// The order service is shared between the HTTP routes and the payment listener.
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    pub db: database::postgres::DatabaseConnection,
    pub redis: database::redis::ConnectionManager,
    pub jwt: JwtAuth,
    pub orders: Arc<OrderService<PgOrderRepository>>,
}
