use axum_helpers::JwtConfig;
use core_config::{
    AppInfo, FromEnv, app_info, env_optional, server::ServerConfig, services::ServiceUrls,
};
use database::postgres::PostgresConfig;
use database::redis::RedisConfig;
use domain_payments::{CheckoutSettings, StripeConfig};

pub use core_config::Environment;

#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub database: PostgresConfig,
    pub redis: RedisConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub services: ServiceUrls,
    pub checkout: CheckoutSettings,
    /// `None` selects the fake gateway, which only development allows
    pub stripe: Option<StripeConfig>,
    pub environment: Environment,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let stripe = stripe_from_env(&environment)?;

        Ok(Self {
            app: app_info!(),
            database: PostgresConfig::from_env()?,
            redis: RedisConfig::from_env()?,
            server: ServerConfig::from_env()?,
            jwt: JwtConfig::from_env()?,
            services: ServiceUrls::from_env()?,
            checkout: CheckoutSettings::from_env()?,
            stripe,
            environment,
        })
    }
}

fn stripe_from_env(environment: &Environment) -> eyre::Result<Option<StripeConfig>> {
    if env_optional("STRIPE_SECRET_KEY").is_none() && environment.is_development() {
        return Ok(None);
    }
    Ok(Some(StripeConfig::from_env()?))
}
