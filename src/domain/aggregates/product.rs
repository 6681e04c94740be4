//! Product Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::store::Entity;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub compare_at_price: Option<Decimal>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub brand_id: Option<String>,
    #[serde(default)]
    pub stock: i32,
    #[serde(default)]
    pub variants: Vec<VariantOption>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default = "active_by_default")]
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A selectable product option, e.g. `Size` with `S`, `M`, `L`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantOption {
    pub name: String,
    pub values: Vec<String>,
}

/// Storefront listing filters. Every field left as `None` matches all products.
#[derive(Clone, Debug, Default)]
pub struct ProductFilter {
    pub category_id: Option<String>,
    pub brand_id: Option<String>,
    pub search: Option<String>,
    pub featured: Option<bool>,
    pub include_inactive: bool,
}

fn active_by_default() -> bool { true }

impl Product {
    pub fn create(name: impl Into<String>, price: Decimal) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::now_v7().to_string(), name: name.into(), description: None, price,
            compare_at_price: None, image_url: None, images: vec![], category_id: None, brand_id: None,
            stock: 0, variants: vec![], featured: false, active: true, created_at: now, updated_at: now,
        }
    }

    pub fn matches(&self, filter: &ProductFilter) -> bool {
        if !filter.include_inactive && !self.active { return false; }
        if filter.category_id.is_some() && filter.category_id != self.category_id { return false; }
        if filter.brand_id.is_some() && filter.brand_id != self.brand_id { return false; }
        if let Some(featured) = filter.featured {
            if featured != self.featured { return false; }
        }
        match filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(term) => {
                let term = term.to_lowercase();
                self.name.to_lowercase().contains(&term)
                    || self.description.as_deref().is_some_and(|d| d.to_lowercase().contains(&term))
            }
            None => true,
        }
    }

    pub fn touch(&mut self) { self.updated_at = Utc::now(); }
}

impl Entity for Product {
    const COLLECTION: &'static str = "products";
    const NAME: &'static str = "Product";
    fn id(&self) -> &str { &self.id }
}
