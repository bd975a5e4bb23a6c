use redis::Client;
use redis::aio::ConnectionManager;
use tracing::info;

use super::RedisConfig;

/// Opens a `ConnectionManager` and verifies it with PING.
pub async fn connect(url: &str) -> redis::RedisResult<ConnectionManager> {
    let client = Client::open(url)?;
    let manager = ConnectionManager::new(client).await?;

    let mut conn = manager.clone();
    let _: String = redis::cmd("PING").query_async(&mut conn).await?;

    info!("Connected to Redis");
    Ok(manager)
}

pub async fn connect_from_config(config: &RedisConfig) -> redis::RedisResult<ConnectionManager> {
    connect(&config.url).await
}
