//! Cart Domain
//!
//! One cart per user, kept in Redis for 30 minutes after the last change.
//! Lines are priced from the catalog when added; the orders service
//! re-checks prices at checkout.
//!
//! ```text
//! Handlers ──▶ CartService ──▶ CartStore (Redis TtlCache | in-memory)
//!                   │
//!                   └──▶ ProductClient (catalog service)
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod service;
pub mod store;

pub use error::{CartError, CartResult};
pub use handlers::ApiDoc;
pub use models::{AddCartItem, Cart, CartItem, MAX_QUANTITY, UpdateCartItem};
pub use service::CartService;
pub use store::{CART_TTL, CartStore, InMemoryCartStore, RedisCartStore};
