use axum_helpers::JwtAuth;
use clients::{OrderClient, ProductClient};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    pub db: database::postgres::DatabaseConnection,
    pub jwt: JwtAuth,
    pub products: Arc<dyn ProductClient>,
    pub orders: Arc<dyn OrderClient>,
}
