use axum_helpers::CurrentUser;
use chrono::Utc;
use clients::{CartClient, ClientError, ProductClient, UserClient};
use contracts::{BistroEvent, EventPublisher, OrderDeleted, OrderStatus, PaymentCompleted};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{OrderError, OrderResult};
use crate::models::{CreateOrder, Customer, Order, OrderFilter, OrderItem, OrderList, UpdateOrder};
use crate::repository::OrderRepository;

/// Sibling services the order flow calls into
#[derive(Clone)]
pub struct OrderClients {
    pub carts: Arc<dyn CartClient>,
    pub products: Arc<dyn ProductClient>,
    pub users: Arc<dyn UserClient>,
}

/// What a `PaymentCompleted` event did to its order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentOutcome {
    MarkedPaid,
    /// Already Paid or further along
    Duplicate,
    OrderMissing,
    /// The order is in a state a payment cannot apply to
    Ignored(OrderStatus),
}

/// Service layer for the order lifecycle
pub struct OrderService<R: OrderRepository> {
    repository: Arc<R>,
    publisher: Arc<dyn EventPublisher>,
    clients: OrderClients,
}

impl<R: OrderRepository> Clone for OrderService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            publisher: Arc::clone(&self.publisher),
            clients: self.clients.clone(),
        }
    }
}

impl<R: OrderRepository> OrderService<R> {
    pub fn new(repository: R, publisher: Arc<dyn EventPublisher>, clients: OrderClients) -> Self {
        Self {
            repository: Arc::new(repository),
            publisher,
            clients,
        }
    }

    /// Turn the caller's cart into a Draft order priced from the current catalog.
    pub async fn create_order(&self, user: &CurrentUser, input: CreateOrder) -> OrderResult<Order> {
        let cart = self
            .clients
            .carts
            .get_cart(&user.token)
            .await
            .map_err(|e| OrderError::Upstream("cart", e))?;
        if cart.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        let mut items = Vec::with_capacity(cart.items.len());
        for line in &cart.items {
            let product = match self.clients.products.get_product(line.product_id).await {
                Ok(product) => product,
                Err(ClientError::NotFound) => {
                    return Err(OrderError::ProductUnavailable(line.name.clone()));
                }
                Err(e) => return Err(OrderError::Upstream("catalog", e)),
            };
            if !product.is_available {
                return Err(OrderError::ProductUnavailable(product.name));
            }
            items.push(OrderItem::new(
                product.id,
                product.name,
                product.price_cents,
                line.quantity,
            ));
        }

        let customer = self.resolve_customer(user).await;
        let order = self
            .repository
            .create(Order::new(customer, items, input))
            .await?;

        tracing::info!(
            order_id = %order.id,
            user_id = %order.user_id,
            total_cents = order.total_cents,
            "Order created"
        );
        Ok(order)
    }

    /// Draft → Pending, then announce the order and empty the cart.
    pub async fn confirm_order(&self, user: &CurrentUser, id: Uuid) -> OrderResult<Order> {
        let mut order = self.load(id).await?;
        if order.user_id != user.id {
            return Err(OrderError::Forbidden(
                "Only the owner can confirm this order".to_string(),
            ));
        }
        let draft = order.clone();
        if !order.transition(OrderStatus::Pending) {
            return Err(OrderError::InvalidTransition {
                from: order.status,
                to: OrderStatus::Pending,
            });
        }

        let order = self.repository.update(order).await?;
        if let Err(e) = self
            .publish(BistroEvent::OrderCreated(order.created_event()))
            .await
        {
            // Back to Draft so the owner can confirm again
            if let Err(rollback) = self.repository.update(draft).await {
                tracing::error!(order_id = %order.id, error = %rollback, "Failed to return order to Draft");
            }
            return Err(e);
        }

        if let Err(e) = self.clients.carts.clear_cart(&user.token).await {
            tracing::warn!(order_id = %order.id, error = %e, "Failed to clear cart after confirmation");
        }

        tracing::info!(order_id = %order.id, "Order confirmed");
        Ok(order)
    }

    pub async fn update_order(
        &self,
        user: &CurrentUser,
        id: Uuid,
        input: UpdateOrder,
    ) -> OrderResult<Order> {
        let mut order = self.load(id).await?;
        if order.user_id != user.id {
            return Err(OrderError::Forbidden(
                "Only the owner can edit this order".to_string(),
            ));
        }
        if order.status != OrderStatus::Draft {
            return Err(OrderError::NotEditable(order.status));
        }

        order.apply_update(input);
        let order = self.repository.update(order).await?;
        self.publish(BistroEvent::OrderUpdated(order.updated_event(order.status)))
            .await?;
        Ok(order)
    }

    /// Owners may cancel before payment; staff may cancel anything not yet final.
    pub async fn cancel_order(&self, user: &CurrentUser, id: Uuid) -> OrderResult<Order> {
        let order = self.load(id).await?;
        let is_staff = user.is_staff();
        if order.user_id != user.id && !is_staff {
            return Err(OrderError::Forbidden(
                "Not allowed to cancel this order".to_string(),
            ));
        }
        if !is_staff && order.status == OrderStatus::Paid {
            return Err(OrderError::Forbidden(
                "Paid orders can only be canceled by staff".to_string(),
            ));
        }

        self.advance(order, OrderStatus::Canceled).await
    }

    /// Paid → Completed; the caller must already be staff.
    pub async fn complete_order(&self, id: Uuid) -> OrderResult<Order> {
        let order = self.load(id).await?;
        self.advance(order, OrderStatus::Completed).await
    }

    pub async fn get_order(&self, user: &CurrentUser, id: Uuid) -> OrderResult<Order> {
        let order = self.load(id).await?;
        if order.user_id != user.id && !user.is_staff() {
            return Err(OrderError::Forbidden(
                "Not allowed to view this order".to_string(),
            ));
        }
        Ok(order)
    }

    /// Staff see every order; everyone else only their own.
    pub async fn list_orders(
        &self,
        user: &CurrentUser,
        mut filter: OrderFilter,
    ) -> OrderResult<OrderList> {
        if !user.is_staff() {
            filter.user_id = Some(user.id);
        }

        let total = self.repository.count(filter.clone()).await?;
        let items = self.repository.list(filter).await?;
        Ok(OrderList { items, total })
    }

    pub async fn delete_order(&self, id: Uuid) -> OrderResult<()> {
        let order = self.load(id).await?;
        if !self.repository.delete(id).await? {
            return Err(OrderError::NotFound(id));
        }

        self.publish(BistroEvent::OrderDeleted(OrderDeleted {
            order_id: order.id,
            user_id: order.user_id,
            deleted_at: Utc::now(),
        }))
        .await?;

        tracing::info!(order_id = %id, "Order deleted");
        Ok(())
    }

    /// Apply a completed payment. Replays of the same payment are no-ops.
    pub async fn apply_payment(&self, payment: &PaymentCompleted) -> OrderResult<PaymentOutcome> {
        let Some(order) = self.repository.get_by_id(payment.order_id).await? else {
            return Ok(PaymentOutcome::OrderMissing);
        };

        match order.status {
            OrderStatus::Pending => {
                self.advance(order, OrderStatus::Paid).await?;
                Ok(PaymentOutcome::MarkedPaid)
            }
            OrderStatus::Paid | OrderStatus::Completed => Ok(PaymentOutcome::Duplicate),
            other => Ok(PaymentOutcome::Ignored(other)),
        }
    }

    async fn load(&self, id: Uuid) -> OrderResult<Order> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(OrderError::NotFound(id))
    }

    /// Persist a status change and publish `OrderUpdated`.
    async fn advance(&self, mut order: Order, next: OrderStatus) -> OrderResult<Order> {
        let previous = order.status;
        if !order.transition(next) {
            return Err(OrderError::InvalidTransition {
                from: previous,
                to: next,
            });
        }

        let order = self.repository.update(order).await?;
        self.publish(BistroEvent::OrderUpdated(order.updated_event(previous)))
            .await?;

        tracing::info!(order_id = %order.id, from = %previous, to = %next, "Order status changed");
        Ok(order)
    }

    async fn resolve_customer(&self, user: &CurrentUser) -> Customer {
        match self
            .clients
            .users
            .get_public_profile(user.id, &user.token)
            .await
        {
            Ok(profile) => Customer {
                user_id: user.id,
                name: profile.name,
                email: profile.email,
            },
            Err(e) => {
                tracing::warn!(user_id = %user.id, error = %e, "Profile lookup failed, using token claims");
                Customer {
                    user_id: user.id,
                    name: user.name.clone(),
                    email: user.email.clone(),
                }
            }
        }
    }

    async fn publish(&self, event: BistroEvent) -> OrderResult<()> {
        let event_type = event.event_type();
        self.publisher.publish(event).await.map_err(|e| {
            tracing::error!(event_type, error = %e, "Failed to publish event");
            OrderError::Events(e.to_string())
        })
    }
}
