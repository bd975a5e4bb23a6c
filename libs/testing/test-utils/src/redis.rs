//! Redis test infrastructure

use redis::Client;
use redis::aio::ConnectionManager;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::redis::Redis;

/// A throwaway Redis container, removed on drop.
///
/// ```no_run
/// # async fn example() {
/// let redis = test_utils::TestRedis::new().await;
/// let manager = redis.manager().await;
/// # }
/// ```
pub struct TestRedis {
    #[allow(dead_code)]
    container: ContainerAsync<Redis>,
    pub connection_string: String,
}

impl TestRedis {
    pub async fn new() -> Self {
        let container = Redis::default()
            .with_tag("8-alpine")
            .start()
            .await
            .expect("Failed to start Redis container");

        let host_port = container
            .get_host_port_ipv4(6379)
            .await
            .expect("Failed to get Redis port");

        let connection_string = format!("redis://127.0.0.1:{}", host_port);
        tracing::info!(port = host_port, "Test Redis ready (Redis 8-alpine)");

        Self {
            container,
            connection_string,
        }
    }

    /// A new `ConnectionManager`, the connection type the services use.
    pub async fn manager(&self) -> ConnectionManager {
        let client =
            Client::open(self.connection_string.clone()).expect("Failed to create Redis client");
        ConnectionManager::new(client)
            .await
            .expect("Failed to connect to Redis")
    }
}
