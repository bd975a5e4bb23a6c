use async_trait::async_trait;
use database::redis::{ConnectionManager, TtlCache};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::CartResult;
use crate::models::Cart;

/// Carts live for 30 minutes after the last write
pub const CART_TTL: Duration = Duration::from_secs(30 * 60);

/// Storage of one cart per user
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CartStore: Send + Sync {
    async fn get(&self, user_id: Uuid) -> CartResult<Option<Cart>>;

    /// Write the cart and restart its expiry
    async fn save(&self, cart: &Cart) -> CartResult<()>;

    /// Returns whether a cart existed
    async fn delete(&self, user_id: Uuid) -> CartResult<bool>;
}

/// Redis-backed carts under `cart:{user_id}`
#[derive(Clone)]
pub struct RedisCartStore {
    cache: TtlCache,
}

impl RedisCartStore {
    pub fn new(conn: ConnectionManager) -> Self {
        Self::with_ttl(conn, CART_TTL)
    }

    pub fn with_ttl(conn: ConnectionManager, ttl: Duration) -> Self {
        Self {
            cache: TtlCache::new(conn, "cart", ttl),
        }
    }
}

#[async_trait]
impl CartStore for RedisCartStore {
    async fn get(&self, user_id: Uuid) -> CartResult<Option<Cart>> {
        Ok(self.cache.get(&user_id.to_string()).await?)
    }

    async fn save(&self, cart: &Cart) -> CartResult<()> {
        Ok(self.cache.set(&cart.user_id.to_string(), cart).await?)
    }

    async fn delete(&self, user_id: Uuid) -> CartResult<bool> {
        Ok(self.cache.delete(&user_id.to_string()).await?)
    }
}

/// In-memory carts without expiry (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryCartStore {
    carts: Arc<RwLock<HashMap<Uuid, Cart>>>,
}

impl InMemoryCartStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CartStore for InMemoryCartStore {
    async fn get(&self, user_id: Uuid) -> CartResult<Option<Cart>> {
        Ok(self.carts.read().await.get(&user_id).cloned())
    }

    async fn save(&self, cart: &Cart) -> CartResult<()> {
        self.carts
            .write()
            .await
            .insert(cart.user_id, cart.clone());
        Ok(())
    }

    async fn delete(&self, user_id: Uuid) -> CartResult<bool> {
        Ok(self.carts.write().await.remove(&user_id).is_some())
    }
}
