use async_trait::async_trait;
use chrono::{DateTime, Utc};
use contracts::OrderStatus;
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DbBackend, FromQueryResult, Statement, TransactionTrait,
    Value,
};
use std::collections::HashMap;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{OrderError, OrderResult};
use crate::models::{Order, OrderFilter, OrderItem};
use crate::repository::OrderRepository;

/// PostgreSQL implementation of OrderRepository using SeaORM.
/// Orders live in `orders`, their lines in `order_items` keyed by position.
#[derive(Clone)]
pub struct PgOrderRepository {
    db: DatabaseConnection,
}

impl PgOrderRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[derive(Debug, FromQueryResult)]
struct OrderRow {
    id: Uuid,
    user_id: Uuid,
    status: String,
    total_cents: i64,
    customer_name: String,
    customer_email: String,
    delivery_address: String,
    phone: String,
    comment: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    confirmed_at: Option<DateTime<Utc>>,
    paid_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    canceled_at: Option<DateTime<Utc>>,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> OrderResult<Order> {
        let status = OrderStatus::from_str(&self.status).map_err(|_| {
            OrderError::Internal(format!("Unknown order status in database: {}", self.status))
        })?;

        Ok(Order {
            id: self.id,
            user_id: self.user_id,
            status,
            items,
            total_cents: self.total_cents,
            customer_name: self.customer_name,
            customer_email: self.customer_email,
            delivery_address: self.delivery_address,
            phone: self.phone,
            comment: self.comment,
            created_at: self.created_at,
            updated_at: self.updated_at,
            confirmed_at: self.confirmed_at,
            paid_at: self.paid_at,
            completed_at: self.completed_at,
            canceled_at: self.canceled_at,
        })
    }
}

#[derive(Debug, FromQueryResult)]
struct ItemRow {
    order_id: Uuid,
    product_id: Uuid,
    name: String,
    unit_price_cents: i64,
    quantity: i32,
    line_total_cents: i64,
}

impl From<ItemRow> for OrderItem {
    fn from(row: ItemRow) -> Self {
        OrderItem {
            product_id: row.product_id,
            name: row.name,
            unit_price_cents: row.unit_price_cents,
            quantity: row.quantity.max(0) as u32,
            line_total_cents: row.line_total_cents,
        }
    }
}

const COLUMNS: &str = "id, user_id, status, total_cents, customer_name, customer_email, \
    delivery_address, phone, comment, created_at, updated_at, confirmed_at, paid_at, \
    completed_at, canceled_at";

const ITEM_COLUMNS: &str =
    "order_id, product_id, name, unit_price_cents, quantity, line_total_cents";

/// WHERE clause and bind values for order listing
fn filter_clause(filter: &OrderFilter) -> (String, Vec<Value>) {
    let mut conditions = Vec::new();
    let mut values: Vec<Value> = Vec::new();

    if let Some(status) = filter.status {
        values.push(status.to_string().into());
        conditions.push(format!("status = ${}", values.len()));
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

/// Attach items (already ordered by position) to their order rows.
fn assemble(rows: Vec<OrderRow>, items: Vec<ItemRow>) -> OrderResult<Vec<Order>> {
    let mut by_order: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
    for item in items {
        by_order.entry(item.order_id).or_default().push(item.into());
    }

    rows.into_iter()
        .map(|row| {
            let items = by_order.remove(&row.id).unwrap_or_default();
            row.into_order(items)
        })
        .collect()
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn create(&self, order: Order) -> OrderResult<Order> {
        let txn = self.db.begin().await?;

        let sql = format!(
            r#"
            INSERT INTO orders ({COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#
        );
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [
                order.id.into(),
                order.user_id.into(),
                order.status.to_string().into(),
                order.total_cents.into(),
                order.customer_name.clone().into(),
                order.customer_email.clone().into(),
                order.delivery_address.clone().into(),
                order.phone.clone().into(),
                order.comment.clone().into(),
                order.created_at.into(),
                order.updated_at.into(),
                order.confirmed_at.into(),
                order.paid_at.into(),
                order.completed_at.into(),
                order.canceled_at.into(),
            ],
        );
        txn.execute_raw(stmt).await?;

        for (position, item) in order.items.iter().enumerate() {
            let stmt = Statement::from_sql_and_values(
                DbBackend::Postgres,
                r#"
                INSERT INTO order_items
                    (id, order_id, position, product_id, name, unit_price_cents, quantity, line_total_cents)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
                [
                    Uuid::now_v7().into(),
                    order.id.into(),
                    (position as i32).into(),
                    item.product_id.into(),
                    item.name.clone().into(),
                    item.unit_price_cents.into(),
                    (item.quantity as i32).into(),
                    item.line_total_cents.into(),
                ],
            );
            txn.execute_raw(stmt).await?;
        }

        txn.commit().await?;
        Ok(order)
    }

    async fn get_by_id(&self, id: Uuid) -> OrderResult<Option<Order>> {
        let sql = format!("SELECT {COLUMNS} FROM orders WHERE id = $1");
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, [id.into()]);

        let Some(row) = OrderRow::find_by_statement(stmt).one(&self.db).await? else {
            return Ok(None);
        };

        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = $1 ORDER BY position"
        );
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, [id.into()]);
        let items = ItemRow::find_by_statement(stmt).all(&self.db).await?;

        row.into_order(items.into_iter().map(Into::into).collect())
            .map(Some)
    }

    async fn list(&self, filter: OrderFilter) -> OrderResult<Vec<Order>> {
        let (clause, mut values) = filter_clause(&filter);
        values.push((filter.limit as i64).into());
        values.push((filter.offset as i64).into());
        let page = format!(
            "{clause} ORDER BY created_at DESC, id DESC LIMIT ${} OFFSET ${}",
            values.len() - 1,
            values.len()
        );

        let sql = format!("SELECT {COLUMNS} FROM orders {page}");
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, values.clone());
        let rows = OrderRow::find_by_statement(stmt).all(&self.db).await?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        // Same page as a subquery, so the items come back in one round trip
        let sql = format!(
            r#"
            SELECT oi.order_id, oi.product_id, oi.name, oi.unit_price_cents, oi.quantity,
                   oi.line_total_cents
            FROM order_items oi
            JOIN (SELECT id FROM orders {page}) page ON page.id = oi.order_id
            ORDER BY oi.order_id, oi.position
            "#
        );
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, values);
        let items = ItemRow::find_by_statement(stmt).all(&self.db).await?;

        assemble(rows, items)
    }

    async fn count(&self, filter: OrderFilter) -> OrderResult<u64> {
        #[derive(FromQueryResult)]
        struct CountRow {
            total: i64,
        }

        let (clause, values) = filter_clause(&filter);
        let sql = format!("SELECT COUNT(*) AS total FROM orders {clause}");
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, values);

        let row = CountRow::find_by_statement(stmt).one(&self.db).await?;
        Ok(row.map(|r| r.total as u64).unwrap_or(0))
    }

    async fn update(&self, order: Order) -> OrderResult<Order> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"
            UPDATE orders
            SET status = $2, delivery_address = $3, phone = $4, comment = $5, updated_at = $6,
                confirmed_at = $7, paid_at = $8, completed_at = $9, canceled_at = $10
            WHERE id = $1
            "#,
            [
                order.id.into(),
                order.status.to_string().into(),
                order.delivery_address.clone().into(),
                order.phone.clone().into(),
                order.comment.clone().into(),
                order.updated_at.into(),
                order.confirmed_at.into(),
                order.paid_at.into(),
                order.completed_at.into(),
                order.canceled_at.into(),
            ],
        );

        let result = self.db.execute_raw(stmt).await?;
        if result.rows_affected() == 0 {
            return Err(OrderError::NotFound(order.id));
        }
        Ok(order)
    }

    async fn delete(&self, id: Uuid) -> OrderResult<bool> {
        // order_items go with it through ON DELETE CASCADE
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "DELETE FROM orders WHERE id = $1",
            [id.into()],
        );

        let result = self.db.execute_raw(stmt).await?;
        Ok(result.rows_affected() > 0)
    }
}
