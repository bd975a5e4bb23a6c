use axum::{Router, middleware, routing::get};
use axum_helpers::optional_jwt_auth_middleware;
use domain_payments::{PaymentService, PgPaymentRepository, handlers};

use crate::state::AppState;

pub mod health;

/// The webhook route is public; the provider signature authenticates it.
pub fn routes(state: &AppState) -> Router {
    let service = PaymentService::new(
        PgPaymentRepository::new(state.db.clone()),
        state.gateway.clone(),
        state.orders.clone(),
        state.publisher.clone(),
        state.config.checkout.clone(),
    );

    Router::new()
        .nest("/payments", handlers::router(service))
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
