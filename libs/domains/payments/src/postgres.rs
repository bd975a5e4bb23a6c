use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, FromQueryResult, Statement, Value};
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{PaymentError, PaymentResult};
use crate::models::{Payment, PaymentFilter, PaymentStatus};
use crate::repository::PaymentRepository;

/// PostgreSQL implementation of PaymentRepository using SeaORM
#[derive(Clone)]
pub struct PgPaymentRepository {
    db: DatabaseConnection,
}

impl PgPaymentRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[derive(Debug, FromQueryResult)]
struct PaymentRow {
    id: Uuid,
    order_id: Uuid,
    user_id: Uuid,
    amount_cents: i64,
    currency: String,
    status: String,
    provider: String,
    provider_session_id: String,
    checkout_url: Option<String>,
    customer_email: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = PaymentError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        let status = PaymentStatus::from_str(&row.status).map_err(|_| {
            PaymentError::Internal(format!("Unknown payment status in database: {}", row.status))
        })?;

        Ok(Payment {
            id: row.id,
            order_id: row.order_id,
            user_id: row.user_id,
            amount_cents: row.amount_cents,
            currency: row.currency,
            status,
            provider: row.provider,
            provider_session_id: row.provider_session_id,
            checkout_url: row.checkout_url,
            customer_email: row.customer_email,
            created_at: row.created_at,
            updated_at: row.updated_at,
            completed_at: row.completed_at,
        })
    }
}

const COLUMNS: &str = "id, order_id, user_id, amount_cents, currency, status, provider, \
    provider_session_id, checkout_url, customer_email, created_at, updated_at, completed_at";

fn filter_clause(filter: &PaymentFilter) -> (String, Vec<Value>) {
    match filter.status {
        Some(status) => (
            "WHERE status = $1".to_string(),
            vec![status.to_string().into()],
        ),
        None => (String::new(), Vec::new()),
    }
}

impl PgPaymentRepository {
    async fn fetch_one(&self, sql: String, values: Vec<Value>) -> PaymentResult<Option<Payment>> {
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, values);
        PaymentRow::find_by_statement(stmt)
            .one(&self.db)
            .await?
            .map(Payment::try_from)
            .transpose()
    }
}

#[async_trait]
impl PaymentRepository for PgPaymentRepository {
    async fn create(&self, payment: Payment) -> PaymentResult<Payment> {
        let sql = format!(
            r#"
            INSERT INTO payments ({COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {COLUMNS}
            "#
        );
        let values = vec![
            payment.id.into(),
            payment.order_id.into(),
            payment.user_id.into(),
            payment.amount_cents.into(),
            payment.currency.clone().into(),
            payment.status.to_string().into(),
            payment.provider.clone().into(),
            payment.provider_session_id.clone().into(),
            payment.checkout_url.clone().into(),
            payment.customer_email.clone().into(),
            payment.created_at.into(),
            payment.updated_at.into(),
            payment.completed_at.into(),
        ];

        self.fetch_one(sql, values)
            .await?
            .ok_or_else(|| PaymentError::Internal("Failed to create payment".to_string()))
    }

    async fn get_by_id(&self, id: Uuid) -> PaymentResult<Option<Payment>> {
        let sql = format!("SELECT {COLUMNS} FROM payments WHERE id = $1");
        self.fetch_one(sql, vec![id.into()]).await
    }

    async fn find_by_order(&self, order_id: Uuid) -> PaymentResult<Option<Payment>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM payments WHERE order_id = $1 \
             ORDER BY created_at DESC, id DESC LIMIT 1"
        );
        self.fetch_one(sql, vec![order_id.into()]).await
    }

    async fn find_by_session(&self, session_id: &str) -> PaymentResult<Option<Payment>> {
        let sql = format!("SELECT {COLUMNS} FROM payments WHERE provider_session_id = $1");
        self.fetch_one(sql, vec![session_id.into()]).await
    }

    async fn list(&self, filter: PaymentFilter) -> PaymentResult<Vec<Payment>> {
        let (clause, mut values) = filter_clause(&filter);
        values.push((filter.limit as i64).into());
        values.push((filter.offset as i64).into());

        let sql = format!(
            "SELECT {COLUMNS} FROM payments {clause} ORDER BY created_at DESC, id DESC \
             LIMIT ${} OFFSET ${}",
            values.len() - 1,
            values.len()
        );
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, values);

        PaymentRow::find_by_statement(stmt)
            .all(&self.db)
            .await?
            .into_iter()
            .map(Payment::try_from)
            .collect()
    }

    async fn count(&self, filter: PaymentFilter) -> PaymentResult<u64> {
        #[derive(FromQueryResult)]
        struct CountRow {
            total: i64,
        }

        let (clause, values) = filter_clause(&filter);
        let sql = format!("SELECT COUNT(*) AS total FROM payments {clause}");
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, values);

        let row = CountRow::find_by_statement(stmt).one(&self.db).await?;
        Ok(row.map(|r| r.total as u64).unwrap_or(0))
    }

    async fn update(&self, payment: Payment) -> PaymentResult<Payment> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "UPDATE payments SET status = $2, updated_at = $3, completed_at = $4 WHERE id = $1",
            [
                payment.id.into(),
                payment.status.to_string().into(),
                payment.updated_at.into(),
                payment.completed_at.into(),
            ],
        );

        let result = self.db.execute_raw(stmt).await?;
        if result.rows_affected() == 0 {
            return Err(PaymentError::Internal(format!(
                "Payment {} vanished during update",
                payment.id
            )));
        }
        Ok(payment)
    }
}
