use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{BookingError, BookingResult};
use crate::models::{Booking, BookingFilter, BookingZone, HookahBooking};

/// Repository trait for Booking persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Insert the booking together with its hookahs
    async fn create(&self, booking: Booking) -> BookingResult<Booking>;

    async fn get_by_id(&self, id: Uuid) -> BookingResult<Option<Booking>>;

    /// Soonest first, paginated
    async fn list(&self, filter: BookingFilter) -> BookingResult<Vec<Booking>>;

    async fn count(&self, filter: BookingFilter) -> BookingResult<u64>;

    /// Persist status and `updated_at`
    async fn update(&self, booking: Booking) -> BookingResult<Booking>;

    /// Non-canceled bookings in `zone` overlapping `[starts_at, ends_at)`
    async fn count_overlapping(
        &self,
        zone: BookingZone,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
    ) -> BookingResult<u32>;

    async fn add_hookah(&self, hookah: HookahBooking) -> BookingResult<HookahBooking>;

    async fn remove_hookah(&self, booking_id: Uuid, hookah_id: Uuid) -> BookingResult<bool>;
}

/// In-memory implementation of BookingRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryBookingRepository {
    bookings: Arc<RwLock<HashMap<Uuid, Booking>>>,
}

impl InMemoryBookingRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookingRepository for InMemoryBookingRepository {
    async fn create(&self, booking: Booking) -> BookingResult<Booking> {
        self.bookings
            .write()
            .await
            .insert(booking.id, booking.clone());
        Ok(booking)
    }

    async fn get_by_id(&self, id: Uuid) -> BookingResult<Option<Booking>> {
        Ok(self.bookings.read().await.get(&id).cloned())
    }

    async fn list(&self, filter: BookingFilter) -> BookingResult<Vec<Booking>> {
        let bookings = self.bookings.read().await;

        let mut result: Vec<Booking> = bookings
            .values()
            .filter(|b| filter.matches(b))
            .cloned()
            .collect();
        result.sort_by(|a, b| a.starts_at.cmp(&b.starts_at).then(a.id.cmp(&b.id)));

        Ok(result
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .collect())
    }

    async fn count(&self, filter: BookingFilter) -> BookingResult<u64> {
        let bookings = self.bookings.read().await;
        Ok(bookings.values().filter(|b| filter.matches(b)).count() as u64)
    }

    async fn update(&self, booking: Booking) -> BookingResult<Booking> {
        let mut bookings = self.bookings.write().await;

        match bookings.get_mut(&booking.id) {
            Some(existing) => {
                existing.status = booking.status;
                existing.updated_at = booking.updated_at;
                Ok(existing.clone())
            }
            None => Err(BookingError::NotFound(booking.id)),
        }
    }

    async fn count_overlapping(
        &self,
        zone: BookingZone,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
    ) -> BookingResult<u32> {
        let bookings = self.bookings.read().await;
        let overlapping = bookings
            .values()
            .filter(|b| b.zone == zone && b.status.is_open())
            .filter(|b| b.starts_at < ends_at && b.ends_at > starts_at)
            .count();
        Ok(overlapping as u32)
    }

    async fn add_hookah(&self, hookah: HookahBooking) -> BookingResult<HookahBooking> {
        let mut bookings = self.bookings.write().await;
        let booking = bookings
            .get_mut(&hookah.booking_id)
            .ok_or(BookingError::NotFound(hookah.booking_id))?;

        booking.hookahs.push(hookah.clone());
        Ok(hookah)
    }

    async fn remove_hookah(&self, booking_id: Uuid, hookah_id: Uuid) -> BookingResult<bool> {
        let mut bookings = self.bookings.write().await;
        let Some(booking) = bookings.get_mut(&booking_id) else {
            return Ok(false);
        };

        let before = booking.hookahs.len();
        booking.hookahs.retain(|h| h.id != hookah_id);
        Ok(booking.hookahs.len() < before)
    }
}
