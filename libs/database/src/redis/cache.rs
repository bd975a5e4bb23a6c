use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use serde::{Serialize, de::DeserializeOwned};
use std::time::Duration;

use crate::common::DatabaseResult;

/// JSON values under `"{prefix}:{key}"` that expire `ttl` after the last write.
///
/// Every `set` rewrites the value with a fresh expiry, so the TTL slides with
/// activity. Eviction is left entirely to Redis.
#[derive(Clone)]
pub struct TtlCache {
    conn: ConnectionManager,
    prefix: String,
    ttl: Duration,
}

impl TtlCache {
    pub fn new(conn: ConnectionManager, prefix: impl Into<String>, ttl: Duration) -> Self {
        Self {
            conn,
            prefix: prefix.into(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Full Redis key for `key`.
    pub fn key(&self, key: &str) -> String {
        format!("{}:{}", self.prefix, key)
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> DatabaseResult<Option<T>> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(self.key(key)).await?;
        Ok(raw.map(|s| serde_json::from_str(&s)).transpose()?)
    }

    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> DatabaseResult<()> {
        let mut conn = self.conn.clone();
        let payload = serde_json::to_string(value)?;
        conn.set_ex::<_, _, ()>(self.key(key), payload, self.ttl.as_secs())
            .await?;
        Ok(())
    }

    /// Returns whether a value was removed.
    pub async fn delete(&self, key: &str) -> DatabaseResult<bool> {
        let mut conn = self.conn.clone();
        let removed: u64 = conn.del(self.key(key)).await?;
        Ok(removed > 0)
    }

    /// Seconds until `key` expires, `None` when it does not exist.
    pub async fn remaining_ttl(&self, key: &str) -> DatabaseResult<Option<u64>> {
        let mut conn = self.conn.clone();
        let ttl: i64 = conn.ttl(self.key(key)).await?;
        Ok(u64::try_from(ttl).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use test_utils::TestRedis;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Basket {
        items: Vec<String>,
    }

    #[tokio::test]
    async fn test_set_get_delete() {
        let redis = TestRedis::new().await;
        let cache = TtlCache::new(redis.manager().await, "cart", Duration::from_secs(1800));

        let basket = Basket {
            items: vec!["borscht".into()],
        };
        cache.set("user-1", &basket).await.unwrap();

        let loaded: Option<Basket> = cache.get("user-1").await.unwrap();
        assert_eq!(loaded, Some(basket));

        let ttl = cache.remaining_ttl("user-1").await.unwrap().unwrap();
        assert!(ttl > 1790 && ttl <= 1800);

        assert!(cache.delete("user-1").await.unwrap());
        assert!(!cache.delete("user-1").await.unwrap());
        let gone: Option<Basket> = cache.get("user-1").await.unwrap();
        assert!(gone.is_none());
    }

    #[tokio::test]
    async fn test_missing_key_has_no_ttl() {
        let redis = TestRedis::new().await;
        let cache = TtlCache::new(redis.manager().await, "cart", Duration::from_secs(60));

        assert_eq!(cache.remaining_ttl("nobody").await.unwrap(), None);
        assert_eq!(cache.key("abc"), "cart:abc");
    }
}
