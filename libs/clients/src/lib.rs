//! Clients for calls between services.
//!
//! Each service dependency is a trait so domain services can be tested with
//! the in-memory fakes from [`fake`]. The `Http*` implementations forward the
//! caller's bearer token where the upstream route needs it. There are no
//! retries; a failed call surfaces as a [`ClientError`].

mod error;
pub mod fake;
mod http;

pub use error::{ClientError, ClientResult};
pub use http::{
    HttpCartClient, HttpOrderClient, HttpProductClient, HttpUserClient, build_http_client,
};

use async_trait::async_trait;
use contracts::{CartSnapshot, OrderSummary, ProductSummary, UserPublicProfile};
use uuid::Uuid;

/// The cart service, acting on the cart of the token's owner.
#[async_trait]
pub trait CartClient: Send + Sync {
    async fn get_cart(&self, token: &str) -> ClientResult<CartSnapshot>;

    async fn clear_cart(&self, token: &str) -> ClientResult<()>;
}

/// The catalog service's public product lookup.
#[async_trait]
pub trait ProductClient: Send + Sync {
    async fn get_product(&self, id: Uuid) -> ClientResult<ProductSummary>;
}

#[async_trait]
pub trait UserClient: Send + Sync {
    async fn get_public_profile(&self, id: Uuid, token: &str) -> ClientResult<UserPublicProfile>;
}

#[async_trait]
pub trait OrderClient: Send + Sync {
    async fn get_order(&self, id: Uuid, token: &str) -> ClientResult<OrderSummary>;
}
