use axum_helpers::JwtAuth;

#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    pub db: database::postgres::DatabaseConnection,
    pub jwt: JwtAuth,
}
