use std::sync::Arc;
use uuid::Uuid;

use crate::error::{CatalogError, CatalogResult};
use crate::models::{
    Category, CreateCategory, CreateProduct, Product, ProductFilter, UpdateCategory, UpdateProduct,
};
use crate::repository::CatalogRepository;

/// Service layer for menu management
#[derive(Clone)]
pub struct CatalogService<R: CatalogRepository> {
    repository: Arc<R>,
}

impl<R: CatalogRepository> CatalogService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    pub async fn list_categories(&self) -> CatalogResult<Vec<Category>> {
        self.repository.list_categories().await
    }

    pub async fn create_category(&self, input: CreateCategory) -> CatalogResult<Category> {
        let category = self.repository.create_category(Category::new(input)).await?;
        tracing::info!(category_id = %category.id, name = %category.name, "Category created");
        Ok(category)
    }

    pub async fn update_category(
        &self,
        id: Uuid,
        input: UpdateCategory,
    ) -> CatalogResult<Category> {
        let mut category = self
            .repository
            .get_category(id)
            .await?
            .ok_or(CatalogError::CategoryNotFound(id))?;

        category.apply_update(input);
        self.repository.update_category(category).await
    }

    /// Refuses while any product still references the category.
    pub async fn delete_category(&self, id: Uuid) -> CatalogResult<()> {
        if self.repository.get_category(id).await?.is_none() {
            return Err(CatalogError::CategoryNotFound(id));
        }
        if self.repository.count_products_in_category(id).await? > 0 {
            return Err(CatalogError::CategoryInUse(id));
        }

        self.repository.delete_category(id).await?;
        tracing::info!(category_id = %id, "Category deleted");
        Ok(())
    }

    pub async fn list_products(&self, filter: ProductFilter) -> CatalogResult<Vec<Product>> {
        self.repository.list_products(filter).await
    }

    pub async fn get_product(&self, id: Uuid) -> CatalogResult<Product> {
        self.repository
            .get_product(id)
            .await?
            .ok_or(CatalogError::ProductNotFound(id))
    }

    pub async fn create_product(&self, input: CreateProduct) -> CatalogResult<Product> {
        self.ensure_category(input.category_id).await?;

        let product = self.repository.create_product(Product::new(input)).await?;
        tracing::info!(product_id = %product.id, price_cents = product.price_cents, "Product created");
        Ok(product)
    }

    pub async fn update_product(&self, id: Uuid, input: UpdateProduct) -> CatalogResult<Product> {
        let mut product = self.get_product(id).await?;

        if let Some(category_id) = input.category_id
            && category_id != product.category_id
        {
            self.ensure_category(category_id).await?;
        }

        product.apply_update(input);
        self.repository.update_product(product).await
    }

    pub async fn set_availability(&self, id: Uuid, is_available: bool) -> CatalogResult<Product> {
        self.update_product(
            id,
            UpdateProduct {
                is_available: Some(is_available),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn delete_product(&self, id: Uuid) -> CatalogResult<()> {
        if !self.repository.delete_product(id).await? {
            return Err(CatalogError::ProductNotFound(id));
        }
        tracing::info!(product_id = %id, "Product deleted");
        Ok(())
    }

    async fn ensure_category(&self, id: Uuid) -> CatalogResult<()> {
        match self.repository.get_category(id).await? {
            Some(_) => Ok(()),
            None => Err(CatalogError::UnknownCategory(id)),
        }
    }
}
