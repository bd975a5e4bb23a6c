//! Catalog Domain
//!
//! The menu: categories and the products listed in them.
//!
//! ```text
//! Handlers ──▶ CatalogService ──▶ CatalogRepository (in-memory | Postgres)
//! ```
//!
//! `GET /products/{id}` is also the lookup the cart, orders and reviews
//! services use through `clients::ProductClient`.

pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{CatalogError, CatalogResult};
pub use handlers::ApiDoc;
pub use models::{
    Category, CreateCategory, CreateProduct, Product, ProductFilter, SetAvailability,
    UpdateCategory, UpdateProduct,
};
pub use postgres::PgCatalogRepository;
pub use repository::{CatalogRepository, InMemoryCatalogRepository};
pub use service::CatalogService;
