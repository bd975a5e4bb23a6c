use axum::{Router, middleware, routing::get};
use axum_helpers::optional_jwt_auth_middleware;
use domain_cart::{CartService, RedisCartStore, handlers};

use crate::state::AppState;

pub mod health;

pub fn routes(state: &AppState) -> Router {
    let service = CartService::new(
        RedisCartStore::new(state.redis.clone()),
        state.products.clone(),
    );

    Router::new()
        .nest("/cart", handlers::router(service))
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
