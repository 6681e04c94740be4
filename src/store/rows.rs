//! Postgres row adapters.
//!
//! One row struct per entity, mirroring the table in `migrations/`. The
//! entity ↔ row conversion lives here and nowhere else; nested lists are
//! JSONB columns holding the entity's own JSON.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;

use super::postgres::{PgQuery, PgTable, TableRow};
use super::{Entity, StoreError};
use crate::domain::aggregates::{
    Brand, Cart, CartItem, CartStatus, Category, Coupon, DiscountType, IntegrationSettings, Order,
    OrderStatus, Product, Promotion, ShippingRate, VariantOption,
};
use crate::domain::value_objects::{CouponCode, Slug};

fn corrupt<T: Entity>(id: &str, reason: impl Into<String>) -> StoreError {
    StoreError::DataCorruption { collection: T::COLLECTION, id: id.to_string(), reason: reason.into() }
}

// =============================================================================
// Catalog
// =============================================================================

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub compare_at_price: Option<Decimal>,
    pub image_url: Option<String>,
    pub images: Json<Vec<String>>,
    pub category_id: Option<String>,
    pub brand_id: Option<String>,
    pub stock: i32,
    pub variants: Json<Vec<VariantOption>>,
    pub featured: bool,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TableRow for ProductRow {
    const COLUMNS: &'static [&'static str] = &[
        "id", "name", "description", "price", "compare_at_price", "image_url", "images", "category_id",
        "brand_id", "stock", "variants", "featured", "active", "created_at", "updated_at",
    ];

    fn bind<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(&self.id).bind(&self.name).bind(&self.description).bind(self.price)
            .bind(self.compare_at_price).bind(&self.image_url).bind(&self.images).bind(&self.category_id)
            .bind(&self.brand_id).bind(self.stock).bind(&self.variants).bind(self.featured)
            .bind(self.active).bind(self.created_at).bind(self.updated_at)
    }
}

impl PgTable for Product {
    type Row = ProductRow;

    fn to_row(&self) -> ProductRow {
        ProductRow {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            price: self.price,
            compare_at_price: self.compare_at_price,
            image_url: self.image_url.clone(),
            images: Json(self.images.clone()),
            category_id: self.category_id.clone(),
            brand_id: self.brand_id.clone(),
            stock: self.stock,
            variants: Json(self.variants.clone()),
            featured: self.featured,
            active: self.active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    fn from_row(row: ProductRow) -> Result<Self, StoreError> {
        Ok(Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            compare_at_price: row.compare_at_price,
            image_url: row.image_url,
            images: row.images.0,
            category_id: row.category_id,
            brand_id: row.brand_id,
            stock: row.stock,
            variants: row.variants.0,
            featured: row.featured,
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CategoryRow {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TableRow for CategoryRow {
    const COLUMNS: &'static [&'static str] = &["id", "name", "slug", "image_url", "created_at"];

    fn bind<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query.bind(&self.id).bind(&self.name).bind(&self.slug).bind(&self.image_url).bind(self.created_at)
    }
}

impl PgTable for Category {
    type Row = CategoryRow;

    fn to_row(&self) -> CategoryRow {
        CategoryRow {
            id: self.id.clone(),
            name: self.name.clone(),
            slug: self.slug.to_string(),
            image_url: self.image_url.clone(),
            created_at: self.created_at,
        }
    }

    fn from_row(row: CategoryRow) -> Result<Self, StoreError> {
        Ok(Self { id: row.id, name: row.name, slug: Slug::from(row.slug), image_url: row.image_url, created_at: row.created_at })
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BrandRow {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub logo_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TableRow for BrandRow {
    const COLUMNS: &'static [&'static str] = &["id", "name", "slug", "logo_url", "created_at"];

    fn bind<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query.bind(&self.id).bind(&self.name).bind(&self.slug).bind(&self.logo_url).bind(self.created_at)
    }
}

impl PgTable for Brand {
    type Row = BrandRow;

    fn to_row(&self) -> BrandRow {
        BrandRow {
            id: self.id.clone(),
            name: self.name.clone(),
            slug: self.slug.to_string(),
            logo_url: self.logo_url.clone(),
            created_at: self.created_at,
        }
    }

    fn from_row(row: BrandRow) -> Result<Self, StoreError> {
        Ok(Self { id: row.id, name: row.name, slug: Slug::from(row.slug), logo_url: row.logo_url, created_at: row.created_at })
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PromotionRow {
    pub id: String,
    pub image_url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
    pub position: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl TableRow for PromotionRow {
    const COLUMNS: &'static [&'static str] =
        &["id", "image_url", "title", "description", "link", "position", "active", "created_at"];

    fn bind<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(&self.id).bind(&self.image_url).bind(&self.title).bind(&self.description)
            .bind(&self.link).bind(self.position).bind(self.active).bind(self.created_at)
    }
}

impl PgTable for Promotion {
    type Row = PromotionRow;

    fn to_row(&self) -> PromotionRow {
        PromotionRow {
            id: self.id.clone(),
            image_url: self.image_url.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            link: self.link.clone(),
            position: self.position,
            active: self.active,
            created_at: self.created_at,
        }
    }

    fn from_row(row: PromotionRow) -> Result<Self, StoreError> {
        Ok(Self {
            id: row.id,
            image_url: row.image_url,
            title: row.title,
            description: row.description,
            link: row.link,
            position: row.position,
            active: row.active,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ShippingRateRow {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub free_over: Option<Decimal>,
    pub estimated_days: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl TableRow for ShippingRateRow {
    const COLUMNS: &'static [&'static str] =
        &["id", "name", "description", "price", "free_over", "estimated_days", "active", "created_at"];

    fn bind<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(&self.id).bind(&self.name).bind(&self.description).bind(self.price)
            .bind(self.free_over).bind(&self.estimated_days).bind(self.active).bind(self.created_at)
    }
}

impl PgTable for ShippingRate {
    type Row = ShippingRateRow;

    fn to_row(&self) -> ShippingRateRow {
        ShippingRateRow {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            price: self.price,
            free_over: self.free_over,
            estimated_days: self.estimated_days.clone(),
            active: self.active,
            created_at: self.created_at,
        }
    }

    fn from_row(row: ShippingRateRow) -> Result<Self, StoreError> {
        Ok(Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            free_over: row.free_over,
            estimated_days: row.estimated_days,
            active: row.active,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CouponRow {
    pub id: String,
    pub code: String,
    pub discount_type: String,
    pub value: Decimal,
    pub min_purchase: Option<Decimal>,
    pub usage_limit: Option<i32>,
    pub usage_count: i32,
    pub expiration_date: Option<DateTime<Utc>>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl TableRow for CouponRow {
    const COLUMNS: &'static [&'static str] = &[
        "id", "code", "discount_type", "value", "min_purchase", "usage_limit", "usage_count",
        "expiration_date", "active", "created_at",
    ];

    fn bind<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(&self.id).bind(&self.code).bind(&self.discount_type).bind(self.value)
            .bind(self.min_purchase).bind(self.usage_limit).bind(self.usage_count)
            .bind(self.expiration_date).bind(self.active).bind(self.created_at)
    }
}

impl PgTable for Coupon {
    type Row = CouponRow;

    fn to_row(&self) -> CouponRow {
        CouponRow {
            id: self.id.clone(),
            code: self.code.to_string(),
            discount_type: self.discount_type.as_str().to_string(),
            value: self.value,
            min_purchase: self.min_purchase,
            usage_limit: self.usage_limit,
            usage_count: self.usage_count,
            expiration_date: self.expiration_date,
            active: self.active,
            created_at: self.created_at,
        }
    }

    fn from_row(row: CouponRow) -> Result<Self, StoreError> {
        let code = CouponCode::new(row.code).map_err(|e| corrupt::<Self>(&row.id, e.to_string()))?;
        let discount_type = DiscountType::parse(&row.discount_type)
            .ok_or_else(|| corrupt::<Self>(&row.id, format!("unknown discount type {:?}", row.discount_type)))?;
        Ok(Self {
            id: row.id,
            code,
            discount_type,
            value: row.value,
            min_purchase: row.min_purchase,
            usage_limit: row.usage_limit,
            usage_count: row.usage_count,
            expiration_date: row.expiration_date,
            active: row.active,
            created_at: row.created_at,
        })
    }
}

// =============================================================================
// Carts and orders
// =============================================================================

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CartRow {
    pub id: String,
    pub items: Json<Vec<CartItem>>,
    pub total: Decimal,
    pub user_id: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub status: String,
    pub abandoned_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TableRow for CartRow {
    const COLUMNS: &'static [&'static str] = &[
        "id", "items", "total", "user_id", "customer_email", "customer_phone", "status", "abandoned_at",
        "created_at", "updated_at",
    ];

    fn bind<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(&self.id).bind(&self.items).bind(self.total).bind(&self.user_id)
            .bind(&self.customer_email).bind(&self.customer_phone).bind(&self.status)
            .bind(self.abandoned_at).bind(self.created_at).bind(self.updated_at)
    }
}

impl PgTable for Cart {
    type Row = CartRow;

    fn to_row(&self) -> CartRow {
        CartRow {
            id: self.id.clone(),
            items: Json(self.items.clone()),
            total: self.total,
            user_id: self.user_id.clone(),
            customer_email: self.customer_email.clone(),
            customer_phone: self.customer_phone.clone(),
            status: self.status.as_str().to_string(),
            abandoned_at: self.abandoned_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    fn from_row(row: CartRow) -> Result<Self, StoreError> {
        let status = CartStatus::parse(&row.status)
            .ok_or_else(|| corrupt::<Self>(&row.id, format!("unknown cart status {:?}", row.status)))?;
        Ok(Self {
            id: row.id,
            items: row.items.0,
            total: row.total,
            user_id: row.user_id,
            customer_email: row.customer_email,
            customer_phone: row.customer_phone,
            status,
            abandoned_at: row.abandoned_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderRow {
    pub id: String,
    pub items: Json<Vec<CartItem>>,
    pub total: Decimal,
    pub status: String,
    pub user_id: Option<String>,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub shipping_method: String,
    pub shipping_address: Option<String>,
    pub shipping_fee: Decimal,
    pub payment_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TableRow for OrderRow {
    const COLUMNS: &'static [&'static str] = &[
        "id", "items", "total", "status", "user_id", "customer_email", "customer_phone", "shipping_method",
        "shipping_address", "shipping_fee", "payment_id", "created_at", "updated_at",
    ];

    fn bind<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(&self.id).bind(&self.items).bind(self.total).bind(&self.status).bind(&self.user_id)
            .bind(&self.customer_email).bind(&self.customer_phone).bind(&self.shipping_method)
            .bind(&self.shipping_address).bind(self.shipping_fee).bind(&self.payment_id)
            .bind(self.created_at).bind(self.updated_at)
    }
}

impl PgTable for Order {
    type Row = OrderRow;

    fn to_row(&self) -> OrderRow {
        OrderRow {
            id: self.id.clone(),
            items: Json(self.items.clone()),
            total: self.total,
            status: self.status.as_str().to_string(),
            user_id: self.user_id.clone(),
            customer_email: self.customer_email.clone(),
            customer_phone: self.customer_phone.clone(),
            shipping_method: self.shipping_method.clone(),
            shipping_address: self.shipping_address.clone(),
            shipping_fee: self.shipping_fee,
            payment_id: self.payment_id.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    fn from_row(row: OrderRow) -> Result<Self, StoreError> {
        let status = OrderStatus::parse(&row.status)
            .ok_or_else(|| corrupt::<Self>(&row.id, format!("unknown order status {:?}", row.status)))?;
        Ok(Self {
            id: row.id,
            items: row.items.0,
            total: row.total,
            status,
            user_id: row.user_id,
            customer_email: row.customer_email,
            customer_phone: row.customer_phone,
            shipping_method: row.shipping_method,
            shipping_address: row.shipping_address,
            shipping_fee: row.shipping_fee,
            payment_id: row.payment_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
            events: Vec::new(),
        })
    }
}

// =============================================================================
// Settings
// =============================================================================

#[derive(Clone, sqlx::FromRow)]
pub struct IntegrationSettingsRow {
    pub id: String,
    pub order_webhook_url: Option<String>,
    pub order_webhook_enabled: bool,
    pub abandoned_cart_webhook_url: Option<String>,
    pub abandoned_cart_webhook_enabled: bool,
    pub webhook_token: Option<String>,
    pub payment_access_token: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl TableRow for IntegrationSettingsRow {
    const COLUMNS: &'static [&'static str] = &[
        "id", "order_webhook_url", "order_webhook_enabled", "abandoned_cart_webhook_url",
        "abandoned_cart_webhook_enabled", "webhook_token", "payment_access_token", "updated_at",
    ];

    fn bind<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(&self.id).bind(&self.order_webhook_url).bind(self.order_webhook_enabled)
            .bind(&self.abandoned_cart_webhook_url).bind(self.abandoned_cart_webhook_enabled)
            .bind(&self.webhook_token).bind(&self.payment_access_token).bind(self.updated_at)
    }
}

impl PgTable for IntegrationSettings {
    type Row = IntegrationSettingsRow;

    fn to_row(&self) -> IntegrationSettingsRow {
        IntegrationSettingsRow {
            id: self.id.clone(),
            order_webhook_url: self.order_webhook_url.clone(),
            order_webhook_enabled: self.order_webhook_enabled,
            abandoned_cart_webhook_url: self.abandoned_cart_webhook_url.clone(),
            abandoned_cart_webhook_enabled: self.abandoned_cart_webhook_enabled,
            webhook_token: self.webhook_token.clone(),
            payment_access_token: self.payment_access_token.clone(),
            updated_at: self.updated_at,
        }
    }

    fn from_row(row: IntegrationSettingsRow) -> Result<Self, StoreError> {
        Ok(Self {
            id: row.id,
            order_webhook_url: row.order_webhook_url,
            order_webhook_enabled: row.order_webhook_enabled,
            abandoned_cart_webhook_url: row.abandoned_cart_webhook_url,
            abandoned_cart_webhook_enabled: row.abandoned_cart_webhook_enabled,
            webhook_token: row.webhook_token,
            payment_access_token: row.payment_access_token,
            updated_at: row.updated_at,
        })
    }
}
