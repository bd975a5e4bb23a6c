//! Connectors and health checks for PostgreSQL (SeaORM) and Redis, plus the
//! generic [`redis::TtlCache`].
//!
//! # Features
//!
//! - `postgres` (default): SeaORM connection and migrations
//! - `redis` (default): `ConnectionManager` connection and TTL cache
//! - `config`: `core_config::FromEnv` for the config structs
//!
//! ```ignore
//! let db = database::postgres::connect_from_config(PostgresConfig::from_env()?).await?;
//! database::postgres::run_migrations::<OrdersMigrator>(&db, "orders-service").await?;
//!
//! let redis = database::redis::connect_from_config(&RedisConfig::from_env()?).await?;
//! ```

pub mod common;

#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(feature = "redis")]
pub mod redis;

pub use common::{DatabaseError, DatabaseResult};
