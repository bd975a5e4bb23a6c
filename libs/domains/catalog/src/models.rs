use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// A menu section, e.g. "Soups"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    /// Lower values are listed first
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    pub fn new(input: CreateCategory) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: input.name.trim().to_string(),
            description: input.description,
            sort_order: input.sort_order,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_update(&mut self, update: UpdateCategory) {
        if let Some(name) = update.name {
            self.name = name.trim().to_string();
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(sort_order) = update.sort_order {
            self.sort_order = sort_order;
        }
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCategory {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub description: String,
    #[serde(default)]
    pub sort_order: i32,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCategory {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    pub sort_order: Option<i32>,
}

/// A dish or drink on the menu
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    pub description: String,
    /// Price in cents, always positive
    pub price_cents: i64,
    pub image_url: Option<String>,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(input: CreateProduct) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            category_id: input.category_id,
            name: input.name.trim().to_string(),
            description: input.description,
            price_cents: input.price_cents,
            image_url: input.image_url,
            is_available: input.is_available.unwrap_or(true),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_update(&mut self, update: UpdateProduct) {
        if let Some(category_id) = update.category_id {
            self.category_id = category_id;
        }
        if let Some(name) = update.name {
            self.name = name.trim().to_string();
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(price_cents) = update.price_cents {
            self.price_cents = price_cents;
        }
        if let Some(image_url) = update.image_url {
            self.image_url = Some(image_url);
        }
        if let Some(is_available) = update.is_available {
            self.is_available = is_available;
        }
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateProduct {
    pub category_id: Uuid,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub description: String,
    #[validate(range(min = 1))]
    pub price_cents: i64,
    #[validate(url)]
    pub image_url: Option<String>,
    pub is_available: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProduct {
    pub category_id: Option<Uuid>,
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(range(min = 1))]
    pub price_cents: Option<i64>,
    #[validate(url)]
    pub image_url: Option<String>,
    pub is_available: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SetAvailability {
    pub is_available: bool,
}

/// Query filters for listing products
#[derive(Debug, Clone, Deserialize, Validate, ToSchema, IntoParams)]
pub struct ProductFilter {
    pub category_id: Option<Uuid>,
    /// Case-insensitive match on the product name
    pub search: Option<String>,
    /// Hide products marked unavailable
    pub available_only: Option<bool>,
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 200))]
    pub limit: u64,
    #[serde(default)]
    #[validate(range(max = 1_000_000))]
    pub offset: u64,
}

impl Default for ProductFilter {
    fn default() -> Self {
        Self {
            category_id: None,
            search: None,
            available_only: None,
            limit: default_limit(),
            offset: 0,
        }
    }
}

fn default_limit() -> u64 {
    50
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(category_id) = self.category_id
            && product.category_id != category_id
        {
            return false;
        }
        if self.available_only.unwrap_or(false) && !product.is_available {
            return false;
        }
        if let Some(search) = self.search.as_deref()
            && !product
                .name
                .to_lowercase()
                .contains(&search.to_lowercase())
        {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn soup(category_id: Uuid) -> Product {
        Product::new(CreateProduct {
            category_id,
            name: "  Borscht ".into(),
            description: String::new(),
            price_cents: 1250,
            image_url: None,
            is_available: None,
        })
    }

    #[test]
    fn test_new_product_defaults_to_available() {
        let product = soup(Uuid::now_v7());
        assert_eq!(product.name, "Borscht");
        assert!(product.is_available);
    }

    #[test]
    fn test_filter_matches() {
        let category_id = Uuid::now_v7();
        let mut product = soup(category_id);

        assert!(ProductFilter::default().matches(&product));

        let by_search = ProductFilter {
            search: Some("BORS".into()),
            ..Default::default()
        };
        assert!(by_search.matches(&product));

        let other_category = ProductFilter {
            category_id: Some(Uuid::now_v7()),
            ..Default::default()
        };
        assert!(!other_category.matches(&product));

        product.is_available = false;
        let available_only = ProductFilter {
            available_only: Some(true),
            ..Default::default()
        };
        assert!(!available_only.matches(&product));
    }

    #[test]
    fn test_price_must_be_positive() {
        let input = CreateProduct {
            category_id: Uuid::now_v7(),
            name: "Free lunch".into(),
            description: String::new(),
            price_cents: 0,
            image_url: None,
            is_available: None,
        };
        assert!(input.validate().is_err());
    }
}
