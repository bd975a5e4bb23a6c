//! In-memory stand-ins for the HTTP clients, for tests and local runs.

use crate::error::{ClientError, ClientResult};
use crate::{CartClient, OrderClient, ProductClient, UserClient};
use async_trait::async_trait;
use contracts::{CartSnapshot, OrderSummary, ProductSummary, UserPublicProfile};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Carts keyed by bearer token.
#[derive(Clone, Default)]
pub struct FakeCartClient {
    carts: Arc<RwLock<HashMap<String, CartSnapshot>>>,
    clear_calls: Arc<AtomicUsize>,
    fail_clear: bool,
}

impl FakeCartClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// `clear_cart` always fails with a 503 from upstream.
    pub fn failing_clear() -> Self {
        Self {
            fail_clear: true,
            ..Self::default()
        }
    }

    pub async fn set_cart(&self, token: &str, cart: CartSnapshot) {
        self.carts.write().await.insert(token.to_string(), cart);
    }

    pub fn clear_calls(&self) -> usize {
        self.clear_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CartClient for FakeCartClient {
    async fn get_cart(&self, token: &str) -> ClientResult<CartSnapshot> {
        self.carts
            .read()
            .await
            .get(token)
            .cloned()
            .ok_or(ClientError::Unauthorized)
    }

    async fn clear_cart(&self, token: &str) -> ClientResult<()> {
        self.clear_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_clear {
            return Err(ClientError::Upstream {
                status: 503,
                body: "cart service unavailable".into(),
            });
        }
        if let Some(cart) = self.carts.write().await.get_mut(token) {
            cart.items.clear();
            cart.total_cents = 0;
        }
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct FakeProductClient {
    products: Arc<RwLock<HashMap<Uuid, ProductSummary>>>,
}

impl FakeProductClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, product: ProductSummary) {
        self.products.write().await.insert(product.id, product);
    }
}

#[async_trait]
impl ProductClient for FakeProductClient {
    async fn get_product(&self, id: Uuid) -> ClientResult<ProductSummary> {
        self.products
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(ClientError::NotFound)
    }
}

#[derive(Clone, Default)]
pub struct FakeUserClient {
    profiles: Arc<RwLock<HashMap<Uuid, UserPublicProfile>>>,
}

impl FakeUserClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, profile: UserPublicProfile) {
        self.profiles.write().await.insert(profile.id, profile);
    }
}

#[async_trait]
impl UserClient for FakeUserClient {
    async fn get_public_profile(&self, id: Uuid, _token: &str) -> ClientResult<UserPublicProfile> {
        self.profiles
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(ClientError::NotFound)
    }
}

#[derive(Clone, Default)]
pub struct FakeOrderClient {
    orders: Arc<RwLock<HashMap<Uuid, OrderSummary>>>,
}

impl FakeOrderClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, order: OrderSummary) {
        self.orders.write().await.insert(order.id, order);
    }
}

#[async_trait]
impl OrderClient for FakeOrderClient {
    async fn get_order(&self, id: Uuid, _token: &str) -> ClientResult<OrderSummary> {
        self.orders
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(ClientError::NotFound)
    }
}
