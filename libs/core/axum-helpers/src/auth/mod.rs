//! Stateless JWT authentication and role-based authorization.
//!
//! ```ignore
//! let auth = JwtAuth::new(&JwtConfig::from_env()?);
//!
//! let api = Router::new()
//!     .nest("/orders", domain_orders::router(service))
//!     .layer(axum::middleware::from_fn_with_state(auth, optional_jwt_auth_middleware));
//!
//! async fn handler(user: CurrentUser) -> ... {
//!     user.require_any(&[Role::Admin, Role::Manager])?;
//! }
//! ```

pub mod config;
pub mod current_user;
pub mod jwt;
pub mod middleware;
pub mod roles;

pub use config::JwtConfig;
pub use current_user::{BearerToken, CurrentUser};
pub use jwt::{AuthError, IssuedToken, JwtAuth, JwtClaims};
pub use middleware::{extract_token_from_request, jwt_auth_middleware, optional_jwt_auth_middleware};
pub use roles::Role;
