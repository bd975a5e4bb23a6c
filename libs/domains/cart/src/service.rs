use clients::{ClientError, ProductClient};
use contracts::CartSnapshot;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{CartError, CartResult};
use crate::models::{AddCartItem, Cart, CartItem, MAX_QUANTITY, UpdateCartItem};
use crate::store::CartStore;

/// Service layer for the per-user cart
#[derive(Clone)]
pub struct CartService<S: CartStore> {
    store: Arc<S>,
    products: Arc<dyn ProductClient>,
}

impl<S: CartStore> CartService<S> {
    pub fn new(store: S, products: Arc<dyn ProductClient>) -> Self {
        Self {
            store: Arc::new(store),
            products,
        }
    }

    /// A user without a stored cart gets an empty one.
    pub async fn get_cart(&self, user_id: Uuid) -> CartResult<CartSnapshot> {
        Ok(self.load(user_id).await?.snapshot())
    }

    /// Add a product, or raise the quantity of its existing line.
    pub async fn add_item(&self, user_id: Uuid, input: AddCartItem) -> CartResult<CartSnapshot> {
        let product = self
            .products
            .get_product(input.product_id)
            .await
            .map_err(|e| match e {
                ClientError::NotFound => CartError::ProductNotFound(input.product_id),
                other => CartError::Catalog(other),
            })?;
        if !product.is_available {
            return Err(CartError::ProductUnavailable(product.name));
        }

        let mut cart = self.load(user_id).await?;
        match cart.item_mut(product.id) {
            Some(item) => {
                let quantity = item.quantity + input.quantity;
                if quantity > MAX_QUANTITY {
                    return Err(CartError::QuantityLimit { max: MAX_QUANTITY });
                }
                item.quantity = quantity;
            }
            None => cart.items.push(CartItem {
                product_id: product.id,
                name: product.name,
                unit_price_cents: product.price_cents,
                quantity: input.quantity,
                image_url: product.image_url,
            }),
        }

        self.save(cart).await
    }

    pub async fn update_item(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        input: UpdateCartItem,
    ) -> CartResult<CartSnapshot> {
        if input.quantity > MAX_QUANTITY {
            return Err(CartError::QuantityLimit { max: MAX_QUANTITY });
        }

        let mut cart = self.load(user_id).await?;
        if input.quantity == 0 {
            if !cart.remove(product_id) {
                return Err(CartError::ItemNotFound(product_id));
            }
        } else {
            cart.item_mut(product_id)
                .ok_or(CartError::ItemNotFound(product_id))?
                .quantity = input.quantity;
        }

        self.save(cart).await
    }

    pub async fn remove_item(&self, user_id: Uuid, product_id: Uuid) -> CartResult<CartSnapshot> {
        let mut cart = self.load(user_id).await?;
        if !cart.remove(product_id) {
            return Err(CartError::ItemNotFound(product_id));
        }

        self.save(cart).await
    }

    /// Idempotent; clearing a missing cart is not an error.
    pub async fn clear(&self, user_id: Uuid) -> CartResult<()> {
        if self.store.delete(user_id).await? {
            tracing::info!(user_id = %user_id, "Cart cleared");
        }
        Ok(())
    }

    async fn load(&self, user_id: Uuid) -> CartResult<Cart> {
        Ok(self
            .store
            .get(user_id)
            .await?
            .unwrap_or_else(|| Cart::new(user_id)))
    }

    async fn save(&self, mut cart: Cart) -> CartResult<CartSnapshot> {
        cart.touch();
        self.store.save(&cart).await?;
        Ok(cart.snapshot())
    }
}
