use axum::{Router, middleware, routing::get};
use axum_helpers::optional_jwt_auth_middleware;
use domain_catalog::{CatalogService, PgCatalogRepository, handlers};

use crate::state::AppState;

pub mod health;

/// Catalog routes carry their own `/categories` and `/products` prefixes.
pub fn routes(state: &AppState) -> Router {
    let service = CatalogService::new(PgCatalogRepository::new(state.db.clone()));

    Router::new()
        .merge(handlers::router(service))
        .layer(middleware::from_fn_with_state(
            state.jwt.clone(),
            optional_jwt_auth_middleware,
        ))
}

pub fn ready_router(state: AppState) -> Router {
    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
}
