//! Bookings Domain
//!
//! Table reservations by zone, each holding one table for a two-hour slot,
//! with hookahs pre-ordered as line items.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP layer (axum), nested at /bookings
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← capacity check, hookah rules, BookingCreated event
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← bookings + hookah_bookings (in-memory and Postgres)
//! └─────────────┘
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{BookingError, BookingResult};
pub use handlers::ApiDoc;
pub use models::{
    AddHookah, Availability, AvailabilityQuery, Booking, BookingFilter, BookingList,
    BookingStatus, BookingZone, Contact, CreateBooking, HookahBooking, HookahStrength,
    SLOT_MINUTES, slot_end,
};
pub use postgres::PgBookingRepository;
pub use repository::{BookingRepository, InMemoryBookingRepository};
pub use service::BookingService;
