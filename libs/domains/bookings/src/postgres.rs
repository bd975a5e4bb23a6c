use async_trait::async_trait;
use chrono::{DateTime, Days, Utc};
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DbBackend, FromQueryResult, Statement, TransactionTrait,
    Value,
};
use std::collections::HashMap;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{BookingError, BookingResult};
use crate::models::{
    Booking, BookingFilter, BookingStatus, BookingZone, HookahBooking, HookahStrength,
};
use crate::repository::BookingRepository;

/// PostgreSQL implementation of BookingRepository using SeaORM.
/// Hookahs live in `hookah_bookings` and cascade with their booking.
#[derive(Clone)]
pub struct PgBookingRepository {
    db: DatabaseConnection,
}

impl PgBookingRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[derive(Debug, FromQueryResult)]
struct BookingRow {
    id: Uuid,
    user_id: Uuid,
    zone: String,
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
    guests: i32,
    contact_name: String,
    contact_phone: String,
    contact_email: String,
    comment: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl BookingRow {
    fn into_booking(self, hookahs: Vec<HookahBooking>) -> BookingResult<Booking> {
        let zone = BookingZone::from_str(&self.zone).map_err(|_| {
            BookingError::Internal(format!("Unknown booking zone in database: {}", self.zone))
        })?;
        let status = BookingStatus::from_str(&self.status).map_err(|_| {
            BookingError::Internal(format!("Unknown booking status in database: {}", self.status))
        })?;

        Ok(Booking {
            id: self.id,
            user_id: self.user_id,
            zone,
            starts_at: self.starts_at,
            ends_at: self.ends_at,
            guests: self.guests.max(0) as u32,
            contact_name: self.contact_name,
            contact_phone: self.contact_phone,
            contact_email: self.contact_email,
            comment: self.comment,
            status,
            hookahs,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, FromQueryResult)]
struct HookahRow {
    id: Uuid,
    booking_id: Uuid,
    flavor: String,
    strength: String,
    quantity: i32,
    serve_at: Option<DateTime<Utc>>,
    price_cents: i64,
}

impl TryFrom<HookahRow> for HookahBooking {
    type Error = BookingError;

    fn try_from(row: HookahRow) -> BookingResult<Self> {
        let strength = HookahStrength::from_str(&row.strength).map_err(|_| {
            BookingError::Internal(format!("Unknown hookah strength in database: {}", row.strength))
        })?;

        Ok(HookahBooking {
            id: row.id,
            booking_id: row.booking_id,
            flavor: row.flavor,
            strength,
            quantity: row.quantity.max(0) as u32,
            serve_at: row.serve_at,
            price_cents: row.price_cents,
        })
    }
}

const COLUMNS: &str = "id, user_id, zone, starts_at, ends_at, guests, contact_name, \
    contact_phone, contact_email, comment, status, created_at, updated_at";

const HOOKAH_COLUMNS: &str = "id, booking_id, flavor, strength, quantity, serve_at, price_cents";

/// WHERE clause and bind values for booking listing
fn filter_clause(filter: &BookingFilter) -> (String, Vec<Value>) {
    let mut conditions = Vec::new();
    let mut values: Vec<Value> = Vec::new();

    if let Some(zone) = filter.zone {
        values.push(zone.to_string().into());
        conditions.push(format!("zone = ${}", values.len()));
    }
    if let Some(status) = filter.status {
        values.push(status.to_string().into());
        conditions.push(format!("status = ${}", values.len()));
    }
    if let Some(date) = filter.date {
        let day_start = date.and_time(chrono::NaiveTime::MIN).and_utc();
        let next_day = day_start
            .checked_add_days(Days::new(1))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        values.push(day_start.into());
        conditions.push(format!("starts_at >= ${}", values.len()));
        values.push(next_day.into());
        conditions.push(format!("starts_at < ${}", values.len()));
    }
    if let Some(user_id) = filter.user_id {
        values.push(user_id.into());
        conditions.push(format!("user_id = ${}", values.len()));
    }

    let clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };
    (clause, values)
}

fn hookah_insert(hookah: &HookahBooking) -> Statement {
    let sql = format!(
        "INSERT INTO hookah_bookings ({HOOKAH_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7)"
    );
    Statement::from_sql_and_values(
        DbBackend::Postgres,
        sql,
        [
            hookah.id.into(),
            hookah.booking_id.into(),
            hookah.flavor.clone().into(),
            hookah.strength.to_string().into(),
            (hookah.quantity as i32).into(),
            hookah.serve_at.into(),
            hookah.price_cents.into(),
        ],
    )
}

fn assemble(rows: Vec<BookingRow>, hookahs: Vec<HookahRow>) -> BookingResult<Vec<Booking>> {
    let mut by_booking: HashMap<Uuid, Vec<HookahBooking>> = HashMap::new();
    for row in hookahs {
        by_booking
            .entry(row.booking_id)
            .or_default()
            .push(row.try_into()?);
    }

    rows.into_iter()
        .map(|row| {
            let hookahs = by_booking.remove(&row.id).unwrap_or_default();
            row.into_booking(hookahs)
        })
        .collect()
}

#[async_trait]
impl BookingRepository for PgBookingRepository {
    async fn create(&self, booking: Booking) -> BookingResult<Booking> {
        let txn = self.db.begin().await?;

        let sql = format!(
            r#"
            INSERT INTO bookings ({COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#
        );
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [
                booking.id.into(),
                booking.user_id.into(),
                booking.zone.to_string().into(),
                booking.starts_at.into(),
                booking.ends_at.into(),
                (booking.guests as i32).into(),
                booking.contact_name.clone().into(),
                booking.contact_phone.clone().into(),
                booking.contact_email.clone().into(),
                booking.comment.clone().into(),
                booking.status.to_string().into(),
                booking.created_at.into(),
                booking.updated_at.into(),
            ],
        );
        txn.execute_raw(stmt).await?;

        for hookah in &booking.hookahs {
            txn.execute_raw(hookah_insert(hookah)).await?;
        }

        txn.commit().await?;
        Ok(booking)
    }

    async fn get_by_id(&self, id: Uuid) -> BookingResult<Option<Booking>> {
        let sql = format!("SELECT {COLUMNS} FROM bookings WHERE id = $1");
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, [id.into()]);

        let Some(row) = BookingRow::find_by_statement(stmt).one(&self.db).await? else {
            return Ok(None);
        };

        let sql = format!(
            "SELECT {HOOKAH_COLUMNS} FROM hookah_bookings WHERE booking_id = $1 ORDER BY created_at, id"
        );
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, [id.into()]);
        let hookahs = HookahRow::find_by_statement(stmt)
            .all(&self.db)
            .await?
            .into_iter()
            .map(HookahBooking::try_from)
            .collect::<BookingResult<Vec<_>>>()?;

        row.into_booking(hookahs).map(Some)
    }

    async fn list(&self, filter: BookingFilter) -> BookingResult<Vec<Booking>> {
        let (clause, mut values) = filter_clause(&filter);
        values.push((filter.limit as i64).into());
        values.push((filter.offset as i64).into());
        let page = format!(
            "{clause} ORDER BY starts_at, id LIMIT ${} OFFSET ${}",
            values.len() - 1,
            values.len()
        );

        let sql = format!("SELECT {COLUMNS} FROM bookings {page}");
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, values.clone());
        let rows = BookingRow::find_by_statement(stmt).all(&self.db).await?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            r#"
            SELECT h.id, h.booking_id, h.flavor, h.strength, h.quantity, h.serve_at, h.price_cents
            FROM hookah_bookings h
            JOIN (SELECT id FROM bookings {page}) page ON page.id = h.booking_id
            ORDER BY h.booking_id, h.created_at, h.id
            "#
        );
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, values);
        let hookahs = HookahRow::find_by_statement(stmt).all(&self.db).await?;

        assemble(rows, hookahs)
    }

    async fn count(&self, filter: BookingFilter) -> BookingResult<u64> {
        #[derive(FromQueryResult)]
        struct CountRow {
            total: i64,
        }

        let (clause, values) = filter_clause(&filter);
        let sql = format!("SELECT COUNT(*) AS total FROM bookings {clause}");
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, values);

        let row = CountRow::find_by_statement(stmt).one(&self.db).await?;
        Ok(row.map(|r| r.total as u64).unwrap_or(0))
    }

    async fn update(&self, booking: Booking) -> BookingResult<Booking> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "UPDATE bookings SET status = $2, updated_at = $3 WHERE id = $1",
            [
                booking.id.into(),
                booking.status.to_string().into(),
                booking.updated_at.into(),
            ],
        );

        let result = self.db.execute_raw(stmt).await?;
        if result.rows_affected() == 0 {
            return Err(BookingError::NotFound(booking.id));
        }
        Ok(booking)
    }

    async fn count_overlapping(
        &self,
        zone: BookingZone,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
    ) -> BookingResult<u32> {
        #[derive(FromQueryResult)]
        struct CountRow {
            total: i64,
        }

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"
            SELECT COUNT(*) AS total FROM bookings
            WHERE zone = $1 AND status IN ($2, $3) AND starts_at < $4 AND ends_at > $5
            "#,
            [
                zone.to_string().into(),
                BookingStatus::Pending.to_string().into(),
                BookingStatus::Confirmed.to_string().into(),
                ends_at.into(),
                starts_at.into(),
            ],
        );

        let row = CountRow::find_by_statement(stmt).one(&self.db).await?;
        Ok(row.map(|r| r.total as u32).unwrap_or(0))
    }

    async fn add_hookah(&self, hookah: HookahBooking) -> BookingResult<HookahBooking> {
        self.db
            .execute_raw(hookah_insert(&hookah))
            .await
            .map_err(|e| {
                if e.to_string().contains("foreign key") {
                    BookingError::NotFound(hookah.booking_id)
                } else {
                    BookingError::Internal(format!("Database error: {}", e))
                }
            })?;
        Ok(hookah)
    }

    async fn remove_hookah(&self, booking_id: Uuid, hookah_id: Uuid) -> BookingResult<bool> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "DELETE FROM hookah_bookings WHERE id = $1 AND booking_id = $2",
            [hookah_id.into(), booking_id.into()],
        );

        let result = self.db.execute_raw(stmt).await?;
        Ok(result.rows_affected() > 0)
    }
}
