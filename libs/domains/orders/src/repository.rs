use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{OrderError, OrderResult};
use crate::models::{Order, OrderFilter};

/// Repository trait for Order persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Insert the order together with its items
    async fn create(&self, order: Order) -> OrderResult<Order>;

    async fn get_by_id(&self, id: Uuid) -> OrderResult<Option<Order>>;

    /// Newest first, paginated
    async fn list(&self, filter: OrderFilter) -> OrderResult<Vec<Order>>;

    async fn count(&self, filter: OrderFilter) -> OrderResult<u64>;

    /// Persist status, contact fields and timestamps. Items never change after creation.
    async fn update(&self, order: Order) -> OrderResult<Order>;

    async fn delete(&self, id: Uuid) -> OrderResult<bool>;
}

/// In-memory implementation of OrderRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryOrderRepository {
    orders: Arc<RwLock<HashMap<Uuid, Order>>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn create(&self, order: Order) -> OrderResult<Order> {
        self.orders.write().await.insert(order.id, order.clone());
        Ok(order)
    }

    async fn get_by_id(&self, id: Uuid) -> OrderResult<Option<Order>> {
        Ok(self.orders.read().await.get(&id).cloned())
    }

    async fn list(&self, filter: OrderFilter) -> OrderResult<Vec<Order>> {
        let orders = self.orders.read().await;

        let mut result: Vec<Order> = orders
            .values()
            .filter(|o| filter.matches(o))
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(result
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .collect())
    }

    async fn count(&self, filter: OrderFilter) -> OrderResult<u64> {
        let orders = self.orders.read().await;
        Ok(orders.values().filter(|o| filter.matches(o)).count() as u64)
    }

    async fn update(&self, order: Order) -> OrderResult<Order> {
        let mut orders = self.orders.write().await;

        match orders.get_mut(&order.id) {
            Some(existing) => {
                *existing = order.clone();
                Ok(order)
            }
            None => Err(OrderError::NotFound(order.id)),
        }
    }

    async fn delete(&self, id: Uuid) -> OrderResult<bool> {
        Ok(self.orders.write().await.remove(&id).is_some())
    }
}
