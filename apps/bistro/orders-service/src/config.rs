use axum_helpers::JwtConfig;
use core_config::{AppInfo, FromEnv, app_info, server::ServerConfig, services::ServiceUrls};
use database::postgres::PostgresConfig;
use database::redis::RedisConfig;

pub use core_config::Environment;

/// Consumer group of the payment listener
pub const CONSUMER_GROUP: &str = "orders";

#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub database: PostgresConfig,
    pub redis: RedisConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub services: ServiceUrls,
    pub environment: Environment,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        Ok(Self {
            app: app_info!(),
            database: PostgresConfig::from_env()?,
            redis: RedisConfig::from_env()?,
            server: ServerConfig::from_env()?,
            jwt: JwtConfig::from_env()?,
            services: ServiceUrls::from_env()?,
            environment: Environment::from_env(),
        })
    }
}
