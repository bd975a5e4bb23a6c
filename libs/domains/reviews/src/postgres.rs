use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DbBackend, DbErr, FromQueryResult, Statement, Value,
};
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{ReviewError, ReviewResult};
use crate::models::{RatingTotals, Review, ReviewFilter, ReviewTarget, ReviewType};
use crate::repository::ReviewRepository;

/// PostgreSQL implementation of ReviewRepository using SeaORM
#[derive(Clone)]
pub struct PgReviewRepository {
    db: DatabaseConnection,
}

impl PgReviewRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[derive(Debug, FromQueryResult)]
struct ReviewRow {
    id: Uuid,
    user_id: Uuid,
    author_name: String,
    review_type: String,
    target_id: Uuid,
    rating: i16,
    comment: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ReviewRow> for Review {
    type Error = ReviewError;

    fn try_from(row: ReviewRow) -> ReviewResult<Self> {
        let review_type = ReviewType::from_str(&row.review_type).map_err(|_| {
            ReviewError::Internal(format!("Unknown review type in database: {}", row.review_type))
        })?;

        Ok(Review {
            id: row.id,
            user_id: row.user_id,
            author_name: row.author_name,
            review_type,
            target_id: row.target_id,
            rating: row.rating.clamp(1, 5) as u8,
            comment: row.comment,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const COLUMNS: &str =
    "id, user_id, author_name, review_type, target_id, rating, comment, created_at, updated_at";

fn map_create_error(err: DbErr, review_type: ReviewType) -> ReviewError {
    let err_str = err.to_string();
    if err_str.contains("duplicate key") || err_str.contains("unique constraint") {
        ReviewError::Duplicate(review_type)
    } else {
        ReviewError::Internal(format!("Database error: {}", err))
    }
}

/// WHERE clause and bind values for review listing
fn filter_clause(filter: &ReviewFilter) -> (String, Vec<Value>) {
    let mut conditions = Vec::new();
    let mut values: Vec<Value> = Vec::new();

    if let Some(review_type) = filter.review_type {
        values.push(review_type.to_string().into());
        conditions.push(format!("review_type = ${}", values.len()));
    }
    if let Some(target_id) = filter.target_id {
        values.push(target_id.into());
        conditions.push(format!("target_id = ${}", values.len()));
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

#[async_trait]
impl ReviewRepository for PgReviewRepository {
    async fn create(&self, review: Review) -> ReviewResult<Review> {
        let sql = format!(
            r#"
            INSERT INTO reviews ({COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#
        );
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [
                review.id.into(),
                review.user_id.into(),
                review.author_name.clone().into(),
                review.review_type.to_string().into(),
                review.target_id.into(),
                i16::from(review.rating).into(),
                review.comment.clone().into(),
                review.created_at.into(),
                review.updated_at.into(),
            ],
        );

        self.db
            .execute_raw(stmt)
            .await
            .map_err(|e| map_create_error(e, review.review_type))?;
        Ok(review)
    }

    async fn get_by_id(&self, id: Uuid) -> ReviewResult<Option<Review>> {
        let sql = format!("SELECT {COLUMNS} FROM reviews WHERE id = $1");
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, [id.into()]);

        ReviewRow::find_by_statement(stmt)
            .one(&self.db)
            .await?
            .map(Review::try_from)
            .transpose()
    }

    async fn find_by_author(
        &self,
        user_id: Uuid,
        target: ReviewTarget,
    ) -> ReviewResult<Option<Review>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM reviews WHERE user_id = $1 AND review_type = $2 AND target_id = $3"
        );
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [
                user_id.into(),
                target.review_type.to_string().into(),
                target.target_id.into(),
            ],
        );

        ReviewRow::find_by_statement(stmt)
            .one(&self.db)
            .await?
            .map(Review::try_from)
            .transpose()
    }

    async fn list(&self, filter: ReviewFilter) -> ReviewResult<Vec<Review>> {
        let (clause, mut values) = filter_clause(&filter);
        values.push((filter.limit as i64).into());
        values.push((filter.offset as i64).into());

        let sql = format!(
            "SELECT {COLUMNS} FROM reviews {clause} ORDER BY created_at DESC, id DESC LIMIT ${} OFFSET ${}",
            values.len() - 1,
            values.len()
        );
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, values);

        ReviewRow::find_by_statement(stmt)
            .all(&self.db)
            .await?
            .into_iter()
            .map(Review::try_from)
            .collect()
    }

    async fn count(&self, filter: ReviewFilter) -> ReviewResult<u64> {
        #[derive(FromQueryResult)]
        struct CountRow {
            total: i64,
        }

        let (clause, values) = filter_clause(&filter);
        let sql = format!("SELECT COUNT(*) AS total FROM reviews {clause}");
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, values);

        let row = CountRow::find_by_statement(stmt).one(&self.db).await?;
        Ok(row.map(|r| r.total as u64).unwrap_or(0))
    }

    async fn totals(&self, target: ReviewTarget) -> ReviewResult<RatingTotals> {
        #[derive(FromQueryResult)]
        struct TotalsRow {
            count: i64,
            sum: i64,
        }

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"
            SELECT COUNT(*) AS count, COALESCE(SUM(rating), 0)::BIGINT AS sum
            FROM reviews WHERE review_type = $1 AND target_id = $2
            "#,
            [
                target.review_type.to_string().into(),
                target.target_id.into(),
            ],
        );

        let row = TotalsRow::find_by_statement(stmt).one(&self.db).await?;
        Ok(row
            .map(|r| RatingTotals {
                count: r.count.max(0) as u64,
                sum: r.sum.max(0) as u64,
            })
            .unwrap_or_default())
    }

    async fn update(&self, review: Review) -> ReviewResult<Review> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "UPDATE reviews SET rating = $2, comment = $3, updated_at = $4 WHERE id = $1",
            [
                review.id.into(),
                i16::from(review.rating).into(),
                review.comment.clone().into(),
                review.updated_at.into(),
            ],
        );

        let result = self.db.execute_raw(stmt).await?;
        if result.rows_affected() == 0 {
            return Err(ReviewError::NotFound(review.id));
        }
        Ok(review)
    }

    async fn delete(&self, id: Uuid) -> ReviewResult<bool> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "DELETE FROM reviews WHERE id = $1",
            [id.into()],
        );

        let result = self.db.execute_raw(stmt).await?;
        Ok(result.rows_affected() > 0)
    }
}
