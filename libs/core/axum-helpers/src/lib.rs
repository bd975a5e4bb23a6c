//! # Axum Helpers
//!
//! Shared HTTP plumbing for the bistro services.
//!
//! - **[`auth`]**: stateless JWT, roles and the [`CurrentUser`] extractor
//! - **[`server`]**: router assembly, health checks, graceful shutdown
//! - **[`http`]**: CORS and security headers
//! - **[`errors`]**: [`AppError`] and the JSON error body
//! - **[`extractors`]**: [`UuidPath`], [`ValidatedJson`] and [`ValidatedQuery`]
//! - **[`audit`]**: audit log events

pub mod audit;
pub mod auth;
pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

pub use auth::{
    AuthError, BearerToken, CurrentUser, IssuedToken, JwtAuth, JwtClaims, JwtConfig, Role,
    jwt_auth_middleware, optional_jwt_auth_middleware,
};

pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, close_postgres, create_app,
    create_production_app, create_router, health_router, run_health_checks, shutdown_signal,
};

pub use http::{cors_from_env, create_cors_layer, security_headers};

pub use errors::{AppError, ErrorCode, ErrorResponse};

pub use extractors::{UuidPath, ValidatedJson, ValidatedQuery};

pub use audit::{AuditEvent, AuditOutcome, extract_ip_from_headers, extract_user_agent};
