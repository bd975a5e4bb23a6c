use axum_helpers::CurrentUser;
use chrono::{DateTime, Utc};
use contracts::{BistroEvent, EventPublisher};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{BookingError, BookingResult};
use crate::models::{
    AddHookah, Availability, Booking, BookingFilter, BookingList, BookingStatus, BookingZone,
    Contact, CreateBooking, HookahBooking, slot_end,
};
use crate::repository::BookingRepository;

/// Service layer for table bookings and their hookahs
pub struct BookingService<R: BookingRepository> {
    repository: Arc<R>,
    publisher: Arc<dyn EventPublisher>,
}

impl<R: BookingRepository> Clone for BookingService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            publisher: Arc::clone(&self.publisher),
        }
    }
}

impl<R: BookingRepository> BookingService<R> {
    pub fn new(repository: R, publisher: Arc<dyn EventPublisher>) -> Self {
        Self {
            repository: Arc::new(repository),
            publisher,
        }
    }

    pub async fn availability(
        &self,
        zone: BookingZone,
        starts_at: DateTime<Utc>,
    ) -> BookingResult<Availability> {
        let ends_at = slot_end(starts_at);
        let booked = self
            .repository
            .count_overlapping(zone, starts_at, ends_at)
            .await?;
        let capacity = zone.capacity();

        Ok(Availability {
            zone,
            starts_at,
            ends_at,
            capacity,
            booked,
            available: capacity.saturating_sub(booked),
        })
    }

    /// Reserve a table in the requested zone and announce it.
    pub async fn create_booking(
        &self,
        user: &CurrentUser,
        input: CreateBooking,
    ) -> BookingResult<Booking> {
        if input.starts_at <= Utc::now() {
            return Err(BookingError::Invalid(
                "Booking must start in the future".to_string(),
            ));
        }
        let max_party = input.zone.max_party();
        if input.guests == 0 || input.guests > max_party {
            return Err(BookingError::Invalid(format!(
                "{} seats between 1 and {} guests",
                input.zone.display_name(),
                max_party
            )));
        }

        let ends_at = slot_end(input.starts_at);
        for hookah in &input.hookahs {
            check_serve_at(hookah, input.starts_at, ends_at)?;
        }

        let availability = self.availability(input.zone, input.starts_at).await?;
        if availability.available == 0 {
            return Err(BookingError::ZoneFull(input.zone));
        }

        let contact = Contact {
            user_id: user.id,
            name: input
                .contact_name
                .as_deref()
                .map(str::trim)
                .unwrap_or(&user.name)
                .to_string(),
            email: input
                .contact_email
                .clone()
                .unwrap_or_else(|| user.email.clone())
                .to_lowercase(),
        };
        let booking = self
            .repository
            .create(Booking::new(contact, input))
            .await?;

        self.publish(BistroEvent::BookingCreated(booking.created_event()))
            .await?;

        tracing::info!(
            booking_id = %booking.id,
            zone = %booking.zone,
            starts_at = %booking.starts_at,
            guests = booking.guests,
            "Booking created"
        );
        Ok(booking)
    }

    pub async fn get_booking(&self, user: &CurrentUser, id: Uuid) -> BookingResult<Booking> {
        let booking = self.load(id).await?;
        if booking.user_id != user.id && !user.is_staff() {
            return Err(BookingError::Forbidden(
                "Not allowed to view this booking".to_string(),
            ));
        }
        Ok(booking)
    }

    /// Staff see every booking; everyone else only their own.
    pub async fn list_bookings(
        &self,
        user: &CurrentUser,
        mut filter: BookingFilter,
    ) -> BookingResult<BookingList> {
        if !user.is_staff() {
            filter.user_id = Some(user.id);
        }

        let total = self.repository.count(filter.clone()).await?;
        let items = self.repository.list(filter).await?;
        Ok(BookingList { items, total })
    }

    pub async fn add_hookah(
        &self,
        user: &CurrentUser,
        id: Uuid,
        input: AddHookah,
    ) -> BookingResult<Booking> {
        let booking = self.load_open_for_owner(user, id).await?;
        check_serve_at(&input, booking.starts_at, booking.ends_at)?;

        let hookah = self
            .repository
            .add_hookah(HookahBooking::new(booking.id, input))
            .await?;
        tracing::info!(booking_id = %id, hookah_id = %hookah.id, "Hookah added");

        self.load(id).await
    }

    pub async fn remove_hookah(
        &self,
        user: &CurrentUser,
        id: Uuid,
        hookah_id: Uuid,
    ) -> BookingResult<Booking> {
        self.load_open_for_owner(user, id).await?;

        if !self.repository.remove_hookah(id, hookah_id).await? {
            return Err(BookingError::HookahNotFound(hookah_id));
        }
        tracing::info!(booking_id = %id, hookah_id = %hookah_id, "Hookah removed");

        self.load(id).await
    }

    /// Pending → Confirmed; the caller must already be staff.
    pub async fn confirm_booking(&self, id: Uuid) -> BookingResult<Booking> {
        let booking = self.load(id).await?;
        self.advance(booking, BookingStatus::Confirmed).await
    }

    pub async fn cancel_booking(&self, user: &CurrentUser, id: Uuid) -> BookingResult<Booking> {
        let booking = self.load(id).await?;
        if booking.user_id != user.id && !user.is_staff() {
            return Err(BookingError::Forbidden(
                "Not allowed to cancel this booking".to_string(),
            ));
        }
        self.advance(booking, BookingStatus::Canceled).await
    }

    /// Confirmed → Completed; the caller must already be staff.
    pub async fn complete_booking(&self, id: Uuid) -> BookingResult<Booking> {
        let booking = self.load(id).await?;
        self.advance(booking, BookingStatus::Completed).await
    }

    async fn load(&self, id: Uuid) -> BookingResult<Booking> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(BookingError::NotFound(id))
    }

    async fn load_open_for_owner(&self, user: &CurrentUser, id: Uuid) -> BookingResult<Booking> {
        let booking = self.load(id).await?;
        if booking.user_id != user.id {
            return Err(BookingError::Forbidden(
                "Only the owner can change hookahs on this booking".to_string(),
            ));
        }
        if !booking.status.is_open() {
            return Err(BookingError::HookahsClosed(booking.status));
        }
        Ok(booking)
    }

    async fn advance(&self, mut booking: Booking, next: BookingStatus) -> BookingResult<Booking> {
        let previous = booking.status;
        if !booking.transition(next) {
            return Err(BookingError::InvalidTransition {
                from: previous,
                to: next,
            });
        }

        let booking = self.repository.update(booking).await?;
        tracing::info!(booking_id = %booking.id, from = %previous, to = %next, "Booking status changed");
        Ok(booking)
    }

    async fn publish(&self, event: BistroEvent) -> BookingResult<()> {
        let event_type = event.event_type();
        self.publisher.publish(event).await.map_err(|e| {
            tracing::error!(event_type, error = %e, "Failed to publish event");
            BookingError::Events(e.to_string())
        })
    }
}

fn check_serve_at(
    hookah: &AddHookah,
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
) -> BookingResult<()> {
    match hookah.serve_at {
        Some(at) if at < starts_at || at >= ends_at => Err(BookingError::Invalid(
            "Hookah serve time must fall within the booking".to_string(),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HookahStrength, SLOT_MINUTES};
    use crate::repository::MockBookingRepository;
    use axum_helpers::Role;
    use chrono::Duration;
    use contracts::InMemoryEventPublisher;

    fn user(roles: Vec<Role>) -> CurrentUser {
        CurrentUser {
            id: Uuid::now_v7(),
            email: "Ann@Bistro.test".into(),
            name: "Ann".into(),
            roles,
            token: "token".into(),
        }
    }

    fn tomorrow() -> DateTime<Utc> {
        Utc::now() + Duration::days(1)
    }

    fn input(zone: BookingZone, guests: u32) -> CreateBooking {
        CreateBooking {
            zone,
            starts_at: tomorrow(),
            guests,
            contact_name: None,
            contact_phone: "+100000000".into(),
            contact_email: None,
            comment: None,
            hookahs: vec![],
        }
    }

    fn service(
        repo: MockBookingRepository,
    ) -> (BookingService<MockBookingRepository>, InMemoryEventPublisher) {
        let publisher = InMemoryEventPublisher::new();
        (
            BookingService::new(repo, Arc::new(publisher.clone())),
            publisher,
        )
    }

    #[tokio::test]
    async fn test_create_booking_publishes_event() {
        let mut repo = MockBookingRepository::new();
        repo.expect_count_overlapping().returning(|_, _, _| Ok(3));
        repo.expect_create().returning(Ok);
        let (service, publisher) = service(repo);

        let booking = service
            .create_booking(&user(vec![Role::User]), input(BookingZone::Terrace, 4))
            .await
            .unwrap();

        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.contact_name, "Ann");
        assert_eq!(booking.contact_email, "ann@bistro.test");
        assert_eq!(publisher.event_types().await, vec!["BookingCreated"]);
    }

    #[tokio::test]
    async fn test_full_zone_is_rejected() {
        let mut repo = MockBookingRepository::new();
        repo.expect_count_overlapping()
            .returning(|zone, _, _| Ok(zone.capacity()));
        repo.expect_create().never();
        let (service, publisher) = service(repo);

        let result = service
            .create_booking(&user(vec![Role::User]), input(BookingZone::Vip, 2))
            .await;

        assert!(matches!(result, Err(BookingError::ZoneFull(BookingZone::Vip))));
        assert!(publisher.published().await.is_empty());
    }

    #[tokio::test]
    async fn test_party_size_limits() {
        let mut repo = MockBookingRepository::new();
        repo.expect_count_overlapping().never();
        let (service, _) = service(repo);
        let ann = user(vec![Role::User]);

        let too_many = service
            .create_booking(&ann, input(BookingZone::Terrace, 7))
            .await;
        assert!(matches!(too_many, Err(BookingError::Invalid(_))));

        let nobody = service
            .create_booking(&ann, input(BookingZone::Terrace, 0))
            .await;
        assert!(matches!(nobody, Err(BookingError::Invalid(_))));
    }

    #[tokio::test]
    async fn test_past_start_is_rejected() {
        let repo = MockBookingRepository::new();
        let (service, _) = service(repo);

        let mut past = input(BookingZone::MainHall, 2);
        past.starts_at = Utc::now() - Duration::minutes(5);

        let result = service.create_booking(&user(vec![Role::User]), past).await;
        assert!(matches!(result, Err(BookingError::Invalid(msg)) if msg.contains("future")));
    }

    #[tokio::test]
    async fn test_hookah_served_after_slot_is_rejected() {
        let repo = MockBookingRepository::new();
        let (service, _) = service(repo);

        let mut late = input(BookingZone::MainHall, 2);
        late.hookahs.push(AddHookah {
            flavor: "Mint".into(),
            strength: HookahStrength::Light,
            quantity: 1,
            serve_at: Some(late.starts_at + Duration::minutes(SLOT_MINUTES)),
        });

        let result = service.create_booking(&user(vec![Role::User]), late).await;
        assert!(matches!(result, Err(BookingError::Invalid(_))));
    }

    #[tokio::test]
    async fn test_availability_never_negative() {
        let mut repo = MockBookingRepository::new();
        repo.expect_count_overlapping().returning(|_, _, _| Ok(20));
        let (service, _) = service(repo);

        let availability = service
            .availability(BookingZone::Vip, tomorrow())
            .await
            .unwrap();

        assert_eq!(availability.capacity, 4);
        assert_eq!(availability.available, 0);
        assert_eq!(availability.ends_at - availability.starts_at, Duration::hours(2));
    }

    #[tokio::test]
    async fn test_stranger_cannot_cancel() {
        let owner = user(vec![Role::User]);
        let booking = Booking::new(
            Contact {
                user_id: owner.id,
                name: "Ann".into(),
                email: "ann@bistro.test".into(),
            },
            input(BookingZone::Vip, 2),
        );

        let mut repo = MockBookingRepository::new();
        repo.expect_get_by_id()
            .returning(move |_| Ok(Some(booking.clone())));
        repo.expect_update().never();
        let (service, _) = service(repo);

        let result = service
            .cancel_booking(&user(vec![Role::User]), Uuid::now_v7())
            .await;
        assert!(matches!(result, Err(BookingError::Forbidden(_))));
    }
}
