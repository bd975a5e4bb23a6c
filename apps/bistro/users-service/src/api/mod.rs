use axum::{Router, middleware, routing::get};
use axum_helpers::optional_jwt_auth_middleware;
use domain_users::{PgUserRepository, UserService, handlers};

use crate::state::AppState;

pub mod health;

/// Routes without the `/api` prefix, which `create_router` adds.
pub fn routes(state: &AppState) -> Router {
    Router::new()
        .nest("/users", handlers::router(user_service(state)))
        .layer(middleware::from_fn_with_state(
            state.jwt.clone(),
            optional_jwt_auth_middleware,
        ))
}

pub fn user_service(state: &AppState) -> UserService<PgUserRepository> {
    UserService::new(
        PgUserRepository::new(state.db.clone()),
        state.publisher.clone(),
        state.jwt.clone(),
    )
}

/// `/ready` with real Postgres and Redis checks
pub fn ready_router(state: AppState) -> Router {
    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
}
