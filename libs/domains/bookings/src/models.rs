use chrono::{DateTime, Duration, NaiveDate, Utc};
use contracts::BookingCreated;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Every booking holds one table for this long
pub const SLOT_MINUTES: i64 = 120;

pub fn slot_end(starts_at: DateTime<Utc>) -> DateTime<Utc> {
    starts_at + Duration::minutes(SLOT_MINUTES)
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BookingZone {
    Terrace,
    MainHall,
    Vip,
}

impl BookingZone {
    /// Tables in the zone
    pub fn capacity(self) -> u32 {
        match self {
            BookingZone::Terrace => 8,
            BookingZone::MainHall => 15,
            BookingZone::Vip => 4,
        }
    }

    /// Largest party a single table in the zone seats
    pub fn max_party(self) -> u32 {
        match self {
            BookingZone::Terrace => 6,
            BookingZone::MainHall => 10,
            BookingZone::Vip => 12,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            BookingZone::Terrace => "Terrace",
            BookingZone::MainHall => "Main hall",
            BookingZone::Vip => "VIP",
        }
    }
}

/// Pending → Confirmed → Completed, Canceled from either open state.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Canceled,
    Completed,
}

impl BookingStatus {
    pub fn can_transition_to(self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed) | (Pending, Canceled) | (Confirmed, Canceled) | (Confirmed, Completed)
        )
    }

    /// Open bookings still hold their table and accept hookah changes
    pub fn is_open(self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum HookahStrength {
    Light,
    Medium,
    Strong,
}

impl HookahStrength {
    pub fn unit_price_cents(self) -> i64 {
        match self {
            HookahStrength::Light => 1800,
            HookahStrength::Medium => 2000,
            HookahStrength::Strong => 2200,
        }
    }
}

/// A hookah pre-ordered for a table booking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HookahBooking {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub flavor: String,
    pub strength: HookahStrength,
    pub quantity: u32,
    pub serve_at: Option<DateTime<Utc>>,
    /// Strength price times quantity
    pub price_cents: i64,
}

impl HookahBooking {
    pub fn new(booking_id: Uuid, input: AddHookah) -> Self {
        Self {
            id: Uuid::now_v7(),
            booking_id,
            flavor: input.flavor.trim().to_string(),
            strength: input.strength,
            quantity: input.quantity,
            serve_at: input.serve_at,
            price_cents: input.strength.unit_price_cents() * i64::from(input.quantity),
        }
    }
}

/// Booking entity, one row of `bookings` plus its `hookah_bookings`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub zone: BookingZone,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub guests: u32,
    pub contact_name: String,
    pub contact_phone: String,
    pub contact_email: String,
    pub comment: Option<String>,
    pub status: BookingStatus,
    pub hookahs: Vec<HookahBooking>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Who made the booking, resolved by the service from the request and token
#[derive(Debug, Clone)]
pub struct Contact {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
}

impl Booking {
    pub fn new(contact: Contact, input: CreateBooking) -> Self {
        let now = Utc::now();
        let id = Uuid::now_v7();
        let hookahs = input
            .hookahs
            .into_iter()
            .map(|h| HookahBooking::new(id, h))
            .collect();

        Self {
            id,
            user_id: contact.user_id,
            zone: input.zone,
            starts_at: input.starts_at,
            ends_at: slot_end(input.starts_at),
            guests: input.guests,
            contact_name: contact.name,
            contact_phone: input.contact_phone.trim().to_string(),
            contact_email: contact.email,
            comment: input.comment,
            status: BookingStatus::Pending,
            hookahs,
            created_at: now,
            updated_at: now,
        }
    }

    /// Half-open: a hookah can be served at the start but not at the end
    pub fn covers(&self, at: DateTime<Utc>) -> bool {
        self.starts_at <= at && at < self.ends_at
    }

    /// Returns false, leaving the booking untouched, if the move is not allowed.
    pub fn transition(&mut self, next: BookingStatus) -> bool {
        if !self.status.can_transition_to(next) {
            return false;
        }
        self.status = next;
        self.updated_at = Utc::now();
        true
    }

    pub fn hookahs_total_cents(&self) -> i64 {
        self.hookahs.iter().map(|h| h.price_cents).sum()
    }

    pub fn created_event(&self) -> BookingCreated {
        BookingCreated {
            booking_id: self.id,
            user_id: self.user_id,
            contact_email: self.contact_email.clone(),
            contact_name: self.contact_name.clone(),
            zone: self.zone.display_name().to_string(),
            starts_at: self.starts_at,
            guests: self.guests,
            hookahs_count: self.hookahs.iter().map(|h| h.quantity).sum(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AddHookah {
    #[validate(length(min = 1, max = 100))]
    pub flavor: String,
    pub strength: HookahStrength,
    #[validate(range(min = 1, max = 10))]
    pub quantity: u32,
    pub serve_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBooking {
    pub zone: BookingZone,
    pub starts_at: DateTime<Utc>,
    /// Checked against the zone's party limit by the service
    #[validate(range(min = 1))]
    pub guests: u32,
    /// Defaults to the account name
    #[validate(length(min = 1, max = 100))]
    pub contact_name: Option<String>,
    #[validate(length(min = 5, max = 32))]
    pub contact_phone: String,
    /// Defaults to the account email
    #[validate(email, length(max = 255))]
    pub contact_email: Option<String>,
    #[validate(length(max = 1000))]
    pub comment: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub hookahs: Vec<AddHookah>,
}

#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
pub struct AvailabilityQuery {
    pub zone: BookingZone,
    pub starts_at: DateTime<Utc>,
}

/// Free tables in a zone for the slot starting at `starts_at`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Availability {
    pub zone: BookingZone,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub capacity: u32,
    pub booked: u32,
    pub available: u32,
}

/// Query filters for listing bookings; `user_id` is forced for non-staff callers
#[derive(Debug, Clone, Deserialize, Validate, ToSchema, IntoParams)]
pub struct BookingFilter {
    pub zone: Option<BookingZone>,
    pub status: Option<BookingStatus>,
    /// Calendar day (UTC) the booking starts on
    pub date: Option<NaiveDate>,
    pub user_id: Option<Uuid>,
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 200))]
    pub limit: u64,
    #[serde(default)]
    #[validate(range(max = 1_000_000))]
    pub offset: u64,
}

impl Default for BookingFilter {
    fn default() -> Self {
        Self {
            zone: None,
            status: None,
            date: None,
            user_id: None,
            limit: default_limit(),
            offset: 0,
        }
    }
}

fn default_limit() -> u64 {
    50
}

impl BookingFilter {
    pub fn matches(&self, booking: &Booking) -> bool {
        self.zone.is_none_or(|zone| booking.zone == zone)
            && self.status.is_none_or(|status| booking.status == status)
            && self
                .date
                .is_none_or(|date| booking.starts_at.date_naive() == date)
            && self.user_id.is_none_or(|user_id| booking.user_id == user_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookingList {
    pub items: Vec<Booking>,
    pub total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::str::FromStr;

    fn booking(hookahs: Vec<AddHookah>) -> Booking {
        Booking::new(
            Contact {
                user_id: Uuid::now_v7(),
                name: "Ann".into(),
                email: "ann@bistro.test".into(),
            },
            CreateBooking {
                zone: BookingZone::MainHall,
                starts_at: Utc.with_ymd_and_hms(2030, 5, 1, 19, 0, 0).unwrap(),
                guests: 4,
                contact_name: None,
                contact_phone: " +100000000 ".into(),
                contact_email: None,
                comment: None,
                hookahs,
            },
        )
    }

    fn hookah(strength: HookahStrength, quantity: u32) -> AddHookah {
        AddHookah {
            flavor: "Mint".into(),
            strength,
            quantity,
            serve_at: None,
        }
    }

    #[test]
    fn test_new_booking_holds_two_hour_slot() {
        let booking = booking(vec![]);
        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.ends_at - booking.starts_at, Duration::hours(2));
        assert_eq!(booking.contact_phone, "+100000000");
    }

    #[test]
    fn test_hookah_price_by_strength() {
        let booking = booking(vec![
            hookah(HookahStrength::Light, 1),
            hookah(HookahStrength::Strong, 2),
        ]);
        assert_eq!(booking.hookahs[0].price_cents, 1800);
        assert_eq!(booking.hookahs[1].price_cents, 4400);
        assert_eq!(booking.hookahs_total_cents(), 6200);
        assert!(booking.hookahs.iter().all(|h| h.booking_id == booking.id));
    }

    #[test]
    fn test_covers_is_half_open() {
        let booking = booking(vec![]);
        assert!(booking.covers(booking.starts_at));
        assert!(booking.covers(booking.starts_at + Duration::minutes(119)));
        assert!(!booking.covers(booking.ends_at));
        assert!(!booking.covers(booking.starts_at - Duration::minutes(1)));
    }

    #[test]
    fn test_transitions() {
        let mut booking = booking(vec![]);
        assert!(!booking.transition(BookingStatus::Completed));
        assert!(booking.transition(BookingStatus::Confirmed));
        assert!(booking.transition(BookingStatus::Completed));
        assert!(!booking.transition(BookingStatus::Canceled));
        assert!(!booking.status.is_open());
    }

    #[test]
    fn test_created_event_uses_display_zone_and_counts_hookahs() {
        let booking = booking(vec![
            hookah(HookahStrength::Medium, 2),
            hookah(HookahStrength::Light, 1),
        ]);
        let event = booking.created_event();
        assert_eq!(event.zone, "Main hall");
        assert_eq!(event.hookahs_count, 3);
        assert_eq!(event.guests, 4);
    }

    #[test]
    fn test_zone_limits_and_storage_names() {
        assert_eq!(BookingZone::Terrace.capacity(), 8);
        assert_eq!(BookingZone::Vip.max_party(), 12);
        assert_eq!(BookingZone::MainHall.to_string(), "main_hall");
        assert_eq!(BookingZone::from_str("vip").unwrap(), BookingZone::Vip);
    }

    #[test]
    fn test_filter_matches_day() {
        let booking = booking(vec![]);
        let same_day = BookingFilter {
            date: NaiveDate::from_ymd_opt(2030, 5, 1),
            zone: Some(BookingZone::MainHall),
            ..Default::default()
        };
        assert!(same_day.matches(&booking));

        let next_day = BookingFilter {
            date: NaiveDate::from_ymd_opt(2030, 5, 2),
            ..Default::default()
        };
        assert!(!next_day.matches(&booking));
    }
}
