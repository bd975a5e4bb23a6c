use axum::{Router, middleware, routing::get};
use axum_helpers::optional_jwt_auth_middleware;
use domain_orders::handlers;

use crate::state::AppState;

pub mod health;

pub fn routes(state: &AppState) -> Router {
    Router::new()
        .nest("/orders", handlers::router_with_shared(state.orders.clone()))
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
