use axum_helpers::JwtConfig;
use core_config::{AppInfo, FromEnv, app_info, server::ServerConfig, services::ServiceUrls};
use database::redis::RedisConfig;

pub use core_config::Environment;

#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
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
            redis: RedisConfig::from_env()?,
            server: ServerConfig::from_env()?,
            jwt: JwtConfig::from_env()?,
            services: ServiceUrls::from_env()?,
            environment: Environment::from_env(),
        })
    }
}
