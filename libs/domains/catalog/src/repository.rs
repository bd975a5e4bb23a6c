use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{CatalogError, CatalogResult};
use crate::models::{Category, Product, ProductFilter};

/// Repository trait for categories and products
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Fails with `DuplicateCategory` on a taken name
    async fn create_category(&self, category: Category) -> CatalogResult<Category>;

    async fn get_category(&self, id: Uuid) -> CatalogResult<Option<Category>>;

    /// Ordered by sort_order, then name
    async fn list_categories(&self) -> CatalogResult<Vec<Category>>;

    async fn update_category(&self, category: Category) -> CatalogResult<Category>;

    async fn delete_category(&self, id: Uuid) -> CatalogResult<bool>;

    /// Number of products referencing the category
    async fn count_products_in_category(&self, category_id: Uuid) -> CatalogResult<u64>;

    async fn create_product(&self, product: Product) -> CatalogResult<Product>;

    async fn get_product(&self, id: Uuid) -> CatalogResult<Option<Product>>;

    /// Ordered by name, paginated
    async fn list_products(&self, filter: ProductFilter) -> CatalogResult<Vec<Product>>;

    async fn update_product(&self, product: Product) -> CatalogResult<Product>;

    async fn delete_product(&self, id: Uuid) -> CatalogResult<bool>;
}

/// In-memory implementation of CatalogRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryCatalogRepository {
    categories: Arc<RwLock<HashMap<Uuid, Category>>>,
    products: Arc<RwLock<HashMap<Uuid, Product>>>,
}

impl InMemoryCatalogRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogRepository for InMemoryCatalogRepository {
    async fn create_category(&self, category: Category) -> CatalogResult<Category> {
        let mut categories = self.categories.write().await;

        if categories.values().any(|c| c.name == category.name) {
            return Err(CatalogError::DuplicateCategory(category.name));
        }

        categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn get_category(&self, id: Uuid) -> CatalogResult<Option<Category>> {
        Ok(self.categories.read().await.get(&id).cloned())
    }

    async fn list_categories(&self) -> CatalogResult<Vec<Category>> {
        let mut result: Vec<Category> = self.categories.read().await.values().cloned().collect();
        result.sort_by(|a, b| {
            a.sort_order
                .cmp(&b.sort_order)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(result)
    }

    async fn update_category(&self, category: Category) -> CatalogResult<Category> {
        let mut categories = self.categories.write().await;

        if !categories.contains_key(&category.id) {
            return Err(CatalogError::CategoryNotFound(category.id));
        }
        if categories
            .values()
            .any(|c| c.id != category.id && c.name == category.name)
        {
            return Err(CatalogError::DuplicateCategory(category.name));
        }

        categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn delete_category(&self, id: Uuid) -> CatalogResult<bool> {
        Ok(self.categories.write().await.remove(&id).is_some())
    }

    async fn count_products_in_category(&self, category_id: Uuid) -> CatalogResult<u64> {
        let products = self.products.read().await;
        Ok(products
            .values()
            .filter(|p| p.category_id == category_id)
            .count() as u64)
    }

    async fn create_product(&self, product: Product) -> CatalogResult<Product> {
        self.products
            .write()
            .await
            .insert(product.id, product.clone());
        Ok(product)
    }

    async fn get_product(&self, id: Uuid) -> CatalogResult<Option<Product>> {
        Ok(self.products.read().await.get(&id).cloned())
    }

    async fn list_products(&self, filter: ProductFilter) -> CatalogResult<Vec<Product>> {
        let products = self.products.read().await;

        let mut result: Vec<Product> = products
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(result
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .collect())
    }

    async fn update_product(&self, product: Product) -> CatalogResult<Product> {
        let mut products = self.products.write().await;

        if !products.contains_key(&product.id) {
            return Err(CatalogError::ProductNotFound(product.id));
        }

        products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn delete_product(&self, id: Uuid) -> CatalogResult<bool> {
        Ok(self.products.write().await.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CreateCategory, CreateProduct};

    fn category(name: &str, sort_order: i32) -> Category {
        Category::new(CreateCategory {
            name: name.to_string(),
            description: String::new(),
            sort_order,
        })
    }

    fn product(category_id: Uuid, name: &str) -> Product {
        Product::new(CreateProduct {
            category_id,
            name: name.to_string(),
            description: String::new(),
            price_cents: 900,
            image_url: None,
            is_available: None,
        })
    }

    #[tokio::test]
    async fn test_categories_are_ordered() {
        let repo = InMemoryCatalogRepository::new();
        repo.create_category(category("Soups", 2)).await.unwrap();
        repo.create_category(category("Drinks", 1)).await.unwrap();
        repo.create_category(category("Desserts", 2)).await.unwrap();

        let names: Vec<String> = repo
            .list_categories()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Drinks", "Desserts", "Soups"]);
    }

    #[tokio::test]
    async fn test_duplicate_category_name() {
        let repo = InMemoryCatalogRepository::new();
        repo.create_category(category("Soups", 0)).await.unwrap();

        let result = repo.create_category(category("Soups", 1)).await;
        assert!(matches!(result, Err(CatalogError::DuplicateCategory(_))));
    }

    #[tokio::test]
    async fn test_products_in_category_are_counted() {
        let repo = InMemoryCatalogRepository::new();
        let soups = repo.create_category(category("Soups", 0)).await.unwrap();
        let drinks = repo.create_category(category("Drinks", 0)).await.unwrap();

        repo.create_product(product(soups.id, "Borscht")).await.unwrap();
        repo.create_product(product(soups.id, "Ramen")).await.unwrap();
        repo.create_product(product(drinks.id, "Lemonade")).await.unwrap();

        assert_eq!(repo.count_products_in_category(soups.id).await.unwrap(), 2);
        assert_eq!(repo.count_products_in_category(drinks.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_list_products_paginates_by_name() {
        let repo = InMemoryCatalogRepository::new();
        let category_id = Uuid::now_v7();
        for name in ["Cola", "Ayran", "Beer"] {
            repo.create_product(product(category_id, name)).await.unwrap();
        }

        let page = repo
            .list_products(ProductFilter {
                limit: 2,
                offset: 1,
                ..Default::default()
            })
            .await
            .unwrap();
        let names: Vec<&str> = page.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Beer", "Cola"]);
    }
}
