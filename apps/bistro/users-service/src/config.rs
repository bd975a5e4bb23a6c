use axum_helpers::JwtConfig;
use core_config::{AppInfo, FromEnv, app_info, env_optional, env_or_default, server::ServerConfig};
use database::postgres::PostgresConfig;
use database::redis::RedisConfig;

pub use core_config::Environment;

/// Account created at startup when `ADMIN_EMAIL` and `ADMIN_PASSWORD` are both set
#[derive(Clone, Debug)]
pub struct AdminBootstrap {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl AdminBootstrap {
    pub fn from_env() -> Option<Self> {
        let email = env_optional("ADMIN_EMAIL")?;
        let password = env_optional("ADMIN_PASSWORD")?;
        Some(Self {
            email,
            password,
            name: env_or_default("ADMIN_NAME", "Administrator"),
        })
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub database: PostgresConfig,
    pub redis: RedisConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub admin: Option<AdminBootstrap>,
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
            admin: AdminBootstrap::from_env(),
            environment: Environment::from_env(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_bootstrap_needs_email_and_password() {
        temp_env::with_vars(
            [
                ("ADMIN_EMAIL", Some("admin@bistro.test")),
                ("ADMIN_PASSWORD", None::<&str>),
            ],
            || assert!(AdminBootstrap::from_env().is_none()),
        );
    }

    #[test]
    fn test_admin_bootstrap_default_name() {
        temp_env::with_vars(
            [
                ("ADMIN_EMAIL", Some("admin@bistro.test")),
                ("ADMIN_PASSWORD", Some("Sup3r$ecret")),
                ("ADMIN_NAME", None),
            ],
            || {
                let admin = AdminBootstrap::from_env().unwrap();
                assert_eq!(admin.email, "admin@bistro.test");
                assert_eq!(admin.name, "Administrator");
            },
        );
    }

    #[test]
    fn test_config_requires_jwt_secret() {
        temp_env::with_vars(
            [
                ("DATABASE_URL", Some("postgres://localhost/bistro")),
                ("REDIS_URL", Some("redis://localhost:6379")),
                ("JWT_SECRET", None),
            ],
            || {
                let err = Config::from_env().unwrap_err();
                assert!(err.to_string().contains("JWT_SECRET"));
            },
        );
    }
}
