//! Back-office CRUD for the catalog: products, categories, brands,
//! promotions, shipping rates and coupons.
//!
//! Each entity has one input type implementing [`CatalogInput`]. Create
//! assigns the id and timestamps, update replaces the editable fields of an
//! existing entity and keeps `createdAt`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::domain::aggregates::{
    promotion, shipping, Brand, Category, Coupon, DiscountType, Product, ProductFilter, Promotion, ShippingQuote,
    ShippingRate, VariantOption,
};
use crate::domain::value_objects::CouponCode;
use crate::services::{PaginatedResponse, Pagination};
use crate::store::{PgTable, Repository, Store};
use crate::{Result, ShopError};

/// Request body for creating or replacing a catalog entity.
pub trait CatalogInput<T>: Validate + Send + Sync {
    /// Set when the input carries a business key that must be unique within
    /// its collection. The stored collection is then scanned before saving.
    const HAS_UNIQUE_KEY: bool = false;

    fn create(self) -> Result<T>;

    fn apply(self, existing: &mut T) -> Result<()>;

    /// A message describing the clash when this input would duplicate the
    /// unique key of `other`.
    fn conflict(&self, _other: &T) -> Option<String> { None }
}

/// Money columns hold two decimal places.
const MONEY_SCALE: u32 = 2;

fn money_scale(value: &Decimal) -> std::result::Result<(), ValidationError> {
    if value.normalize().scale() > MONEY_SCALE {
        return Err(ValidationError::new("too_many_decimals"));
    }
    Ok(())
}

fn non_negative(value: &Decimal) -> std::result::Result<(), ValidationError> {
    if *value < Decimal::ZERO {
        return Err(ValidationError::new("negative"));
    }
    money_scale(value)
}

fn positive(value: &Decimal) -> std::result::Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        return Err(ValidationError::new("not_positive"));
    }
    money_scale(value)
}

// =============================================================================
// Inputs
// =============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[validate(custom = "non_negative")]
    pub price: Decimal,
    #[serde(default)]
    #[validate(custom = "non_negative")]
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
    #[validate(range(min = 0))]
    pub stock: i32,
    #[serde(default)]
    pub variants: Vec<VariantOption>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub active: Option<bool>,
}

impl CatalogInput<Product> for ProductInput {
    fn create(self) -> Result<Product> {
        let mut product = Product::create(self.name.clone(), self.price);
        self.apply(&mut product)?;
        Ok(product)
    }

    fn apply(self, p: &mut Product) -> Result<()> {
        p.name = self.name;
        p.description = self.description;
        p.price = self.price;
        p.compare_at_price = self.compare_at_price;
        p.image_url = self.image_url;
        p.images = self.images;
        p.category_id = self.category_id;
        p.brand_id = self.brand_id;
        p.stock = self.stock;
        p.variants = self.variants;
        p.featured = self.featured;
        p.active = self.active.unwrap_or(p.active);
        p.touch();
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl CatalogInput<Category> for CategoryInput {
    fn create(self) -> Result<Category> {
        let mut category = Category::create(self.name);
        category.image_url = self.image_url;
        Ok(category)
    }

    fn apply(self, c: &mut Category) -> Result<()> {
        c.rename(self.name);
        c.image_url = self.image_url;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BrandInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(default)]
    pub logo_url: Option<String>,
}

impl CatalogInput<Brand> for BrandInput {
    fn create(self) -> Result<Brand> {
        let mut brand = Brand::create(self.name);
        brand.logo_url = self.logo_url;
        Ok(brand)
    }

    fn apply(self, b: &mut Brand) -> Result<()> {
        b.rename(self.name);
        b.logo_url = self.logo_url;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PromotionInput {
    #[validate(length(min = 1))]
    pub image_url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub position: i32,
    #[serde(default)]
    pub active: Option<bool>,
}

impl CatalogInput<Promotion> for PromotionInput {
    fn create(self) -> Result<Promotion> {
        let mut promotion = Promotion::create(self.image_url.clone());
        self.apply(&mut promotion)?;
        Ok(promotion)
    }

    fn apply(self, p: &mut Promotion) -> Result<()> {
        p.image_url = self.image_url;
        p.title = self.title;
        p.description = self.description;
        p.link = self.link;
        p.position = self.position;
        p.active = self.active.unwrap_or(p.active);
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ShippingRateInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[validate(custom = "non_negative")]
    pub price: Decimal,
    #[serde(default)]
    #[validate(custom = "non_negative")]
    pub free_over: Option<Decimal>,
    #[serde(default)]
    pub estimated_days: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
}

impl CatalogInput<ShippingRate> for ShippingRateInput {
    fn create(self) -> Result<ShippingRate> {
        let mut rate = ShippingRate::create(self.name.clone(), self.price);
        self.apply(&mut rate)?;
        Ok(rate)
    }

    fn apply(self, r: &mut ShippingRate) -> Result<()> {
        r.name = self.name;
        r.description = self.description;
        r.price = self.price;
        r.free_over = self.free_over;
        r.estimated_days = self.estimated_days;
        r.active = self.active.unwrap_or(r.active);
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CouponInput {
    #[validate(length(min = 1, max = 40))]
    pub code: String,
    pub discount_type: DiscountType,
    #[validate(custom = "positive")]
    pub value: Decimal,
    #[serde(default)]
    #[validate(custom = "non_negative")]
    pub min_purchase: Option<Decimal>,
    #[serde(default)]
    #[validate(range(min = 1))]
    pub usage_limit: Option<i32>,
    #[serde(default)]
    pub expiration_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub active: Option<bool>,
}

impl CouponInput {
    fn code(&self) -> Result<CouponCode> {
        CouponCode::new(self.code.as_str()).map_err(|e| ShopError::Validation(e.to_string()))
    }

    fn check_value(&self) -> Result<()> {
        if self.discount_type == DiscountType::Percentage && self.value > Decimal::ONE_HUNDRED {
            return Err(ShopError::Validation("Percentage discount cannot exceed 100".to_string()));
        }
        Ok(())
    }
}

impl CatalogInput<Coupon> for CouponInput {
    const HAS_UNIQUE_KEY: bool = true;

    fn conflict(&self, other: &Coupon) -> Option<String> {
        let code = CouponCode::new(self.code.as_str()).ok()?;
        (code == other.code).then(|| format!("Coupon code {code} already exists"))
    }

    fn create(self) -> Result<Coupon> {
        let mut coupon = Coupon::create(self.code()?, self.discount_type, self.value);
        self.apply(&mut coupon)?;
        Ok(coupon)
    }

    fn apply(self, c: &mut Coupon) -> Result<()> {
        self.check_value()?;
        c.code = self.code()?;
        c.discount_type = self.discount_type;
        c.value = self.value;
        c.min_purchase = self.min_purchase;
        c.usage_limit = self.usage_limit;
        c.expiration_date = self.expiration_date;
        c.active = self.active.unwrap_or(c.active);
        Ok(())
    }
}

// =============================================================================
// Service
// =============================================================================

/// Storefront product listing parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductQuery {
    pub category: Option<String>,
    pub brand: Option<String>,
    pub search: Option<String>,
    pub featured: Option<bool>,
    #[serde(default)]
    pub include_inactive: bool,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ProductQuery {
    pub fn filter(&self) -> ProductFilter {
        ProductFilter {
            category_id: self.category.clone(),
            brand_id: self.brand.clone(),
            search: self.search.clone(),
            featured: self.featured,
            include_inactive: self.include_inactive,
        }
    }

    pub fn pagination(&self) -> Pagination { Pagination { page: self.page, per_page: self.per_page } }
}

#[derive(Clone)]
pub struct CatalogService {
    store: Store,
}

impl CatalogService {
    pub fn new(store: Store) -> Self { Self { store } }

    pub async fn list<T: PgTable>(&self) -> Result<Vec<T>> {
        Ok(Repository::<T>::list(&self.store).await?)
    }

    pub async fn get<T: PgTable>(&self, id: &str) -> Result<T> {
        Repository::<T>::get(&self.store, id).await?.ok_or_else(|| ShopError::not_found(T::NAME, id))
    }

    #[tracing::instrument(skip_all, fields(collection = T::COLLECTION))]
    pub async fn create<T: PgTable, I: CatalogInput<T>>(&self, input: I) -> Result<T> {
        input.validate()?;
        self.ensure_unique(&input, None).await?;
        let entity = input.create()?;
        self.store.save(&entity).await?;
        tracing::info!(id = entity.id(), "Created");
        Ok(entity)
    }

    #[tracing::instrument(skip(self, input), fields(collection = T::COLLECTION))]
    pub async fn update<T: PgTable, I: CatalogInput<T>>(&self, id: &str, input: I) -> Result<T> {
        input.validate()?;
        let mut entity: T = self.get(id).await?;
        self.ensure_unique(&input, Some(id)).await?;
        input.apply(&mut entity)?;
        self.store.save(&entity).await?;
        Ok(entity)
    }

    #[tracing::instrument(skip(self), fields(collection = T::COLLECTION))]
    pub async fn delete<T: PgTable>(&self, id: &str) -> Result<()> {
        if !Repository::<T>::delete(&self.store, id).await? {
            return Err(ShopError::not_found(T::NAME, id));
        }
        tracing::info!("Deleted");
        Ok(())
    }

    /// Rejects an input whose unique key is already held by another entity.
    /// `id` is the entity being updated, which may keep its own key.
    async fn ensure_unique<T: PgTable, I: CatalogInput<T>>(&self, input: &I, id: Option<&str>) -> Result<()> {
        if !I::HAS_UNIQUE_KEY {
            return Ok(());
        }
        let existing: Vec<T> = self.list().await?;
        match existing.iter().filter(|other| Some(other.id()) != id).find_map(|other| input.conflict(other)) {
            Some(message) => Err(ShopError::Validation(message)),
            None => Ok(()),
        }
    }

    pub async fn products(&self, query: &ProductQuery) -> Result<PaginatedResponse<Product>> {
        let filter = query.filter();
        let products: Vec<Product> = self.list().await?;
        let matching = products.into_iter().filter(|p| p.matches(&filter)).collect();
        Ok(query.pagination().apply(matching))
    }

    pub async fn active_promotions(&self) -> Result<Vec<Promotion>> {
        Ok(promotion::carousel(self.list().await?))
    }

    pub async fn shipping_quote(&self, subtotal: Decimal) -> Result<Vec<ShippingQuote>> {
        if subtotal < Decimal::ZERO {
            return Err(ShopError::Validation("Subtotal cannot be negative".to_string()));
        }
        let rates: Vec<ShippingRate> = self.list().await?;
        Ok(shipping::quote(&rates, subtotal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn service() -> CatalogService { CatalogService::new(Store::in_memory()) }

    fn product_input(name: &str, price: Decimal) -> ProductInput {
        ProductInput {
            name: name.into(), description: None, price, compare_at_price: None, image_url: None, images: vec![],
            category_id: None, brand_id: None, stock: 3, variants: vec![], featured: false, active: None,
        }
    }

    #[tokio::test]
    async fn test_update_preserves_created_at() {
        let catalog = service();
        let created: Product = catalog.create(product_input("Mate", dec!(5000))).await.unwrap();
        let updated: Product = catalog.update(&created.id, product_input("Mate Imperial", dec!(9000))).await.unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.name, "Mate Imperial");
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn test_missing_entities_are_not_found() {
        let catalog = service();
        let update = catalog.update::<Product, _>("nope", product_input("X", dec!(1))).await;
        assert!(matches!(update, Err(ShopError::NotFound { entity: "Product", .. })));
        assert!(matches!(catalog.delete::<Brand>("nope").await, Err(ShopError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_negative_price_is_rejected() {
        let result = service().create::<Product, _>(product_input("Roto", dec!(-1))).await;
        assert!(matches!(result, Err(ShopError::Validation(msg)) if msg.contains("price")));
    }

    #[tokio::test]
    async fn test_amounts_beyond_cents_are_rejected() {
        let result = service().create::<Product, _>(product_input("Vela", dec!(19.999))).await;
        assert!(matches!(result, Err(ShopError::Validation(msg)) if msg.contains("price")));

        let rate = ShippingRateInput {
            name: "Moto".into(), description: None, price: dec!(500), free_over: Some(dec!(1000.005)),
            estimated_days: None, active: None,
        };
        assert!(matches!(service().create::<ShippingRate, _>(rate).await, Err(ShopError::Validation(_))));

        let trailing_zeros: Product = service().create(product_input("Vela", dec!(19.990))).await.unwrap();
        assert_eq!(trailing_zeros.price, dec!(19.99));
    }

    #[tokio::test]
    async fn test_category_slug_follows_name() {
        let catalog = service();
        let category: Category = catalog.create(CategoryInput { name: "Hogar & Deco".into(), image_url: None }).await.unwrap();
        assert_eq!(category.slug.as_str(), "hogar-deco");
    }

    #[tokio::test]
    async fn test_coupon_code_is_normalized() {
        let input = CouponInput {
            code: "  verano10 ".into(), discount_type: DiscountType::Percentage, value: dec!(10),
            min_purchase: None, usage_limit: None, expiration_date: None, active: None,
        };
        let coupon: Coupon = service().create(input).await.unwrap();
        assert_eq!(coupon.code.as_str(), "VERANO10");
    }

    fn coupon_input(code: &str, value: Decimal) -> CouponInput {
        CouponInput {
            code: code.into(), discount_type: DiscountType::Percentage, value,
            min_purchase: None, usage_limit: None, expiration_date: None, active: None,
        }
    }

    #[tokio::test]
    async fn test_duplicate_coupon_code_is_rejected() {
        let catalog = service();
        let first: Coupon = catalog.create(coupon_input("dup", dec!(10))).await.unwrap();
        let duplicate = catalog.create::<Coupon, _>(coupon_input(" DUP ", dec!(50))).await;
        assert!(matches!(duplicate, Err(ShopError::Validation(msg)) if msg.contains("DUP")));

        let other: Coupon = catalog.create(coupon_input("OTRO", dec!(5))).await.unwrap();
        let renamed = catalog.update::<Coupon, _>(&other.id, coupon_input("dup", dec!(5))).await;
        assert!(matches!(renamed, Err(ShopError::Validation(_))));

        let kept: Coupon = catalog.update(&first.id, coupon_input("DUP", dec!(15))).await.unwrap();
        assert_eq!(kept.value, dec!(15));
        assert_eq!(catalog.list::<Coupon>().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_percentage_over_hundred_is_rejected() {
        let input = CouponInput {
            code: "MUCHO".into(), discount_type: DiscountType::Percentage, value: dec!(150),
            min_purchase: None, usage_limit: None, expiration_date: None, active: None,
        };
        assert!(matches!(service().create::<Coupon, _>(input).await, Err(ShopError::Validation(_))));
    }

    #[tokio::test]
    async fn test_product_listing_filters_and_paginates() {
        let catalog = service();
        for name in ["Taza Blanca", "Taza Negra", "Plato"] {
            catalog.create::<Product, _>(product_input(name, dec!(100))).await.unwrap();
        }
        let query = ProductQuery { search: Some("taza".into()), per_page: Some(1), ..Default::default() };
        let page = catalog.products(&query).await.unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.data.len(), 1);
    }
}
