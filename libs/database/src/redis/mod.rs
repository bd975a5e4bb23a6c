//! Redis via `ConnectionManager`, plus the JSON [`TtlCache`].

mod cache;
mod config;
mod connector;
mod health;

pub use cache::TtlCache;
pub use config::RedisConfig;
pub use connector::{connect, connect_from_config};
pub use health::check_health;

pub use redis::aio::ConnectionManager;
