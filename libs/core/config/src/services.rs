use crate::{env_or_default, env_parse, ConfigError, FromEnv};
use std::time::Duration;

/// Base URLs of sibling services, used by the inter-service HTTP clients.
#[derive(Clone, Debug)]
pub struct ServiceUrls {
    pub cart: String,
    pub catalog: String,
    pub users: String,
    pub orders: String,
    /// Timeout applied to every outbound request.
    pub request_timeout: Duration,
}

impl FromEnv for ServiceUrls {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            cart: trim_slash(env_or_default("CART_SERVICE_URL", "http://localhost:8082")),
            catalog: trim_slash(env_or_default("CATALOG_SERVICE_URL", "http://localhost:8081")),
            users: trim_slash(env_or_default("USERS_SERVICE_URL", "http://localhost:8080")),
            orders: trim_slash(env_or_default("ORDERS_SERVICE_URL", "http://localhost:8083")),
            request_timeout: Duration::from_secs(env_parse("SERVICE_TIMEOUT_SECS", 10)?),
        })
    }
}

fn trim_slash(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
