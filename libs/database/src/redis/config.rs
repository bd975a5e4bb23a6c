#[cfg(feature = "config")]
use core_config::{ConfigError, FromEnv};

/// Redis connection settings.
#[derive(Clone, Debug)]
pub struct RedisConfig {
    pub url: String,
}

impl RedisConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self::new("redis://127.0.0.1:6379")
    }
}

#[cfg(feature = "config")]
impl FromEnv for RedisConfig {
    /// `REDIS_URL`, falling back to `REDIS_HOST`.
    fn from_env() -> Result<Self, ConfigError> {
        let url = std::env::var("REDIS_URL")
            .or_else(|_| std::env::var("REDIS_HOST"))
            .map_err(|_| ConfigError::MissingEnvVar("REDIS_URL or REDIS_HOST".to_string()))?;

        Ok(Self { url })
    }
}

#[cfg(all(test, feature = "config"))]
mod tests {
    use super::*;

    #[test]
    fn test_redis_config_prefers_redis_url() {
        temp_env::with_vars(
            [
                ("REDIS_URL", Some("redis://cache:6379")),
                ("REDIS_HOST", Some("redis://other:6379")),
            ],
            || {
                assert_eq!(RedisConfig::from_env().unwrap().url, "redis://cache:6379");
            },
        );
    }

    #[test]
    fn test_redis_config_falls_back_to_host() {
        temp_env::with_vars(
            [("REDIS_URL", None), ("REDIS_HOST", Some("redis://other:6379"))],
            || {
                assert_eq!(RedisConfig::from_env().unwrap().url, "redis://other:6379");
            },
        );
    }

    #[test]
    fn test_redis_config_missing() {
        temp_env::with_vars([("REDIS_URL", None::<&str>), ("REDIS_HOST", None)], || {
            let err = RedisConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("REDIS_URL"));
        });
    }
}
