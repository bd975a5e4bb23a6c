//! Server bootstrap: router assembly with API docs, health endpoints,
//! graceful shutdown and connection cleanup.

pub mod app;
pub mod cleanup;
pub mod health;
pub mod shutdown;

pub use app::{create_app, create_production_app, create_router};
pub use cleanup::close_postgres;
pub use health::{HealthCheckFuture, HealthResponse, health_router, run_health_checks};
pub use shutdown::{ShutdownCoordinator, shutdown_signal};
