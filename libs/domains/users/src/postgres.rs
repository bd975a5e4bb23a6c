use async_trait::async_trait;
use axum_helpers::Role;
use chrono::{DateTime, Utc};
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DbBackend, DbErr, FromQueryResult, Statement, Value,
};
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{User, UserFilter};
use crate::repository::UserRepository;

/// PostgreSQL implementation of UserRepository using SeaORM
#[derive(Clone)]
pub struct PgUserRepository {
    db: DatabaseConnection,
}

impl PgUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[derive(Debug, FromQueryResult)]
struct UserRow {
    id: Uuid,
    email: String,
    name: String,
    password_hash: String,
    role: String,
    is_active: bool,
    reset_token_hash: Option<String>,
    reset_token_expires_at: Option<DateTime<Utc>>,
    last_login_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            email: row.email,
            name: row.name,
            password_hash: row.password_hash,
            role: Role::from_str(&row.role).unwrap_or_default(),
            is_active: row.is_active,
            reset_token_hash: row.reset_token_hash,
            reset_token_expires_at: row.reset_token_expires_at,
            last_login_at: row.last_login_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const COLUMNS: &str = "id, email, name, password_hash, role, is_active, reset_token_hash, \
     reset_token_expires_at, last_login_at, created_at, updated_at";

fn map_write_error(err: DbErr, email: &str) -> UserError {
    let err_str = err.to_string();
    if err_str.contains("duplicate key") || err_str.contains("unique constraint") {
        UserError::DuplicateEmail(email.to_string())
    } else {
        UserError::Internal(format!("Database error: {}", err))
    }
}

/// WHERE clause and bind values shared by `list` and `count`
fn filter_clause(filter: &UserFilter) -> (String, Vec<Value>) {
    let mut conditions = Vec::new();
    let mut values: Vec<Value> = Vec::new();

    if let Some(role) = filter.role {
        values.push(role.to_string().into());
        conditions.push(format!("role = ${}", values.len()));
    }
    if let Some(search) = filter.search.as_deref() {
        values.push(format!("%{}%", search.to_lowercase()).into());
        conditions.push(format!(
            "(LOWER(name) LIKE ${n} OR email LIKE ${n})",
            n = values.len()
        ));
    }

    let clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };
    (clause, values)
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: User) -> UserResult<User> {
        let sql = format!(
            r#"
            INSERT INTO users ({COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {COLUMNS}
            "#
        );

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [
                user.id.into(),
                user.email.clone().into(),
                user.name.clone().into(),
                user.password_hash.clone().into(),
                user.role.to_string().into(),
                user.is_active.into(),
                user.reset_token_hash.clone().into(),
                user.reset_token_expires_at.into(),
                user.last_login_at.into(),
                user.created_at.into(),
                user.updated_at.into(),
            ],
        );

        let row = UserRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(|e| map_write_error(e, &user.email))?
            .ok_or_else(|| UserError::Internal("Failed to create user".to_string()))?;

        Ok(row.into())
    }

    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        let sql = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, [id.into()]);

        let row = UserRow::find_by_statement(stmt).one(&self.db).await?;
        Ok(row.map(Into::into))
    }

    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let sql = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, [email.into()]);

        let row = UserRow::find_by_statement(stmt).one(&self.db).await?;
        Ok(row.map(Into::into))
    }

    async fn get_by_reset_token_hash(&self, token_hash: &str) -> UserResult<Option<User>> {
        let sql = format!("SELECT {COLUMNS} FROM users WHERE reset_token_hash = $1");
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, [token_hash.into()]);

        let row = UserRow::find_by_statement(stmt).one(&self.db).await?;
        Ok(row.map(Into::into))
    }

    async fn list(&self, filter: UserFilter) -> UserResult<Vec<User>> {
        let (clause, mut values) = filter_clause(&filter);
        values.push((filter.limit as i64).into());
        values.push((filter.offset as i64).into());

        let sql = format!(
            "SELECT {COLUMNS} FROM users {clause} ORDER BY created_at DESC LIMIT ${} OFFSET ${}",
            values.len() - 1,
            values.len()
        );
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, values);

        let rows = UserRow::find_by_statement(stmt).all(&self.db).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count(&self, filter: UserFilter) -> UserResult<u64> {
        #[derive(FromQueryResult)]
        struct CountRow {
            total: i64,
        }

        let (clause, values) = filter_clause(&filter);
        let sql = format!("SELECT COUNT(*) AS total FROM users {clause}");
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, values);

        let row = CountRow::find_by_statement(stmt).one(&self.db).await?;
        Ok(row.map(|r| r.total as u64).unwrap_or(0))
    }

    async fn update(&self, user: User) -> UserResult<User> {
        let sql = format!(
            r#"
            UPDATE users
            SET email = $2, name = $3, password_hash = $4, role = $5, is_active = $6,
                reset_token_hash = $7, reset_token_expires_at = $8, last_login_at = $9,
                updated_at = $10
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        );

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [
                user.id.into(),
                user.email.clone().into(),
                user.name.clone().into(),
                user.password_hash.clone().into(),
                user.role.to_string().into(),
                user.is_active.into(),
                user.reset_token_hash.clone().into(),
                user.reset_token_expires_at.into(),
                user.last_login_at.into(),
                user.updated_at.into(),
            ],
        );

        UserRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(|e| map_write_error(e, &user.email))?
            .map(Into::into)
            .ok_or(UserError::NotFound(user.id))
    }

    async fn delete(&self, id: Uuid) -> UserResult<bool> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "DELETE FROM users WHERE id = $1",
            [id.into()],
        );

        let result = self.db.execute_raw(stmt).await?;
        Ok(result.rows_affected() > 0)
    }
}
