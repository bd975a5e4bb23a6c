use axum_helpers::JwtAuth;
use clients::ProductClient;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    pub redis: database::redis::ConnectionManager,
    pub jwt: JwtAuth,
    pub products: Arc<dyn ProductClient>,
}
