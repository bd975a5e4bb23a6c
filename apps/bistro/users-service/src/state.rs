use axum_helpers::JwtAuth;
use contracts::EventPublisher;
use std::sync::Arc;

/// Shared by the route builders and the readiness check
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    pub db: database::postgres::DatabaseConnection,
    pub redis: database::redis::ConnectionManager,
    pub jwt: JwtAuth,
    pub publisher: Arc<dyn EventPublisher>,
}
