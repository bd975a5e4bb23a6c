use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DbBackend, DbErr, FromQueryResult, Statement, Value,
};
use uuid::Uuid;

use crate::error::{CatalogError, CatalogResult};
use crate::models::{Category, Product, ProductFilter};
use crate::repository::CatalogRepository;

/// PostgreSQL implementation of CatalogRepository using SeaORM
#[derive(Clone)]
pub struct PgCatalogRepository {
    db: DatabaseConnection,
}

impl PgCatalogRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[derive(Debug, FromQueryResult)]
struct CategoryRow {
    id: Uuid,
    name: String,
    description: String,
    sort_order: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            name: row.name,
            description: row.description,
            sort_order: row.sort_order,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromQueryResult)]
struct ProductRow {
    id: Uuid,
    category_id: Uuid,
    name: String,
    description: String,
    price_cents: i64,
    image_url: Option<String>,
    is_available: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            category_id: row.category_id,
            name: row.name,
            description: row.description,
            price_cents: row.price_cents,
            image_url: row.image_url,
            is_available: row.is_available,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const CATEGORY_COLUMNS: &str = "id, name, description, sort_order, created_at, updated_at";

const PRODUCT_COLUMNS: &str =
    "id, category_id, name, description, price_cents, image_url, is_available, created_at, updated_at";

fn map_category_error(err: DbErr, name: &str) -> CatalogError {
    let err_str = err.to_string();
    if err_str.contains("duplicate key") || err_str.contains("unique constraint") {
        CatalogError::DuplicateCategory(name.to_string())
    } else {
        CatalogError::Internal(format!("Database error: {}", err))
    }
}

fn map_product_error(err: DbErr, category_id: Uuid) -> CatalogError {
    let err_str = err.to_string();
    if err_str.contains("foreign key") {
        CatalogError::UnknownCategory(category_id)
    } else {
        CatalogError::Internal(format!("Database error: {}", err))
    }
}

/// WHERE clause and bind values for product listing
fn filter_clause(filter: &ProductFilter) -> (String, Vec<Value>) {
    let mut conditions = Vec::new();
    let mut values: Vec<Value> = Vec::new();

    if let Some(category_id) = filter.category_id {
        values.push(category_id.into());
        conditions.push(format!("category_id = ${}", values.len()));
    }
    if filter.available_only.unwrap_or(false) {
        conditions.push("is_available = TRUE".to_string());
    }
    if let Some(search) = filter.search.as_deref() {
        values.push(format!("%{}%", search.to_lowercase()).into());
        conditions.push(format!("LOWER(name) LIKE ${}", values.len()));
    }

    let clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };
    (clause, values)
}

#[async_trait]
impl CatalogRepository for PgCatalogRepository {
    async fn create_category(&self, category: Category) -> CatalogResult<Category> {
        let sql = format!(
            r#"
            INSERT INTO categories ({CATEGORY_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {CATEGORY_COLUMNS}
            "#
        );

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [
                category.id.into(),
                category.name.clone().into(),
                category.description.clone().into(),
                category.sort_order.into(),
                category.created_at.into(),
                category.updated_at.into(),
            ],
        );

        let row = CategoryRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(|e| map_category_error(e, &category.name))?
            .ok_or_else(|| CatalogError::Internal("Failed to create category".to_string()))?;

        Ok(row.into())
    }

    async fn get_category(&self, id: Uuid) -> CatalogResult<Option<Category>> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1");
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, [id.into()]);

        let row = CategoryRow::find_by_statement(stmt).one(&self.db).await?;
        Ok(row.map(Into::into))
    }

    async fn list_categories(&self) -> CatalogResult<Vec<Category>> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY sort_order, name");
        let stmt = Statement::from_string(DbBackend::Postgres, sql);

        let rows = CategoryRow::find_by_statement(stmt).all(&self.db).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update_category(&self, category: Category) -> CatalogResult<Category> {
        let sql = format!(
            r#"
            UPDATE categories
            SET name = $2, description = $3, sort_order = $4, updated_at = $5
            WHERE id = $1
            RETURNING {CATEGORY_COLUMNS}
            "#
        );

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [
                category.id.into(),
                category.name.clone().into(),
                category.description.clone().into(),
                category.sort_order.into(),
                category.updated_at.into(),
            ],
        );

        CategoryRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(|e| map_category_error(e, &category.name))?
            .map(Into::into)
            .ok_or(CatalogError::CategoryNotFound(category.id))
    }

    async fn delete_category(&self, id: Uuid) -> CatalogResult<bool> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "DELETE FROM categories WHERE id = $1",
            [id.into()],
        );

        let result = self.db.execute_raw(stmt).await.map_err(|e| {
            if e.to_string().contains("foreign key") {
                CatalogError::CategoryInUse(id)
            } else {
                CatalogError::Internal(format!("Database error: {}", e))
            }
        })?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_products_in_category(&self, category_id: Uuid) -> CatalogResult<u64> {
        #[derive(FromQueryResult)]
        struct CountRow {
            total: i64,
        }

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT COUNT(*) AS total FROM products WHERE category_id = $1",
            [category_id.into()],
        );

        let row = CountRow::find_by_statement(stmt).one(&self.db).await?;
        Ok(row.map(|r| r.total as u64).unwrap_or(0))
    }

    async fn create_product(&self, product: Product) -> CatalogResult<Product> {
        let sql = format!(
            r#"
            INSERT INTO products ({PRODUCT_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {PRODUCT_COLUMNS}
            "#
        );

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [
                product.id.into(),
                product.category_id.into(),
                product.name.clone().into(),
                product.description.clone().into(),
                product.price_cents.into(),
                product.image_url.clone().into(),
                product.is_available.into(),
                product.created_at.into(),
                product.updated_at.into(),
            ],
        );

        let row = ProductRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(|e| map_product_error(e, product.category_id))?
            .ok_or_else(|| CatalogError::Internal("Failed to create product".to_string()))?;

        Ok(row.into())
    }

    async fn get_product(&self, id: Uuid) -> CatalogResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, [id.into()]);

        let row = ProductRow::find_by_statement(stmt).one(&self.db).await?;
        Ok(row.map(Into::into))
    }

    async fn list_products(&self, filter: ProductFilter) -> CatalogResult<Vec<Product>> {
        let (clause, mut values) = filter_clause(&filter);
        values.push((filter.limit as i64).into());
        values.push((filter.offset as i64).into());

        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products {clause} ORDER BY name LIMIT ${} OFFSET ${}",
            values.len() - 1,
            values.len()
        );
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, values);

        let rows = ProductRow::find_by_statement(stmt).all(&self.db).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update_product(&self, product: Product) -> CatalogResult<Product> {
        let sql = format!(
            r#"
            UPDATE products
            SET category_id = $2, name = $3, description = $4, price_cents = $5,
                image_url = $6, is_available = $7, updated_at = $8
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "#
        );

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [
                product.id.into(),
                product.category_id.into(),
                product.name.clone().into(),
                product.description.clone().into(),
                product.price_cents.into(),
                product.image_url.clone().into(),
                product.is_available.into(),
                product.updated_at.into(),
            ],
        );

        ProductRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(|e| map_product_error(e, product.category_id))?
            .map(Into::into)
            .ok_or(CatalogError::ProductNotFound(product.id))
    }

    async fn delete_product(&self, id: Uuid) -> CatalogResult<bool> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "DELETE FROM products WHERE id = $1",
            [id.into()],
        );

        let result = self.db.execute_raw(stmt).await?;
        Ok(result.rows_affected() > 0)
    }
}
