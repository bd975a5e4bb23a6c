//! Reviews Domain
//!
//! Star ratings with an optional comment, one per author and target.
//! A target is either a catalog product or one of the author's completed orders,
//! verified against the catalog and orders services before the review is stored.
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_reviews::{handlers, InMemoryReviewRepository, ReviewService};
//!
//! let service = ReviewService::new(InMemoryReviewRepository::new(), products, orders);
//! let router = handlers::router(service);
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{ReviewError, ReviewResult};
pub use handlers::ApiDoc;
pub use models::{
    CreateReview, Page, RatingSummary, RatingTotals, Review, ReviewFilter, ReviewList,
    ReviewTarget, ReviewType, TargetReviewsQuery, UpdateReview,
};
pub use postgres::PgReviewRepository;
pub use repository::{InMemoryReviewRepository, ReviewRepository};
pub use service::ReviewService;
