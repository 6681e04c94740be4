//! Shopfront Commerce Service
//!
//! Storefront and merchant back office for a small online shop.
//!
//! ## Features
//! - Product catalog with categories, brands and homepage banners
//! - Cart sync and abandoned-cart automations
//! - Coupons and shipping rates
//! - Checkout through Mercado Pago
//! - Outbound webhooks for WhatsApp automations
//! - Postgres or schema-less record storage

use thiserror::Error;

pub mod api;
pub mod config;
pub mod domain;
pub mod services;
pub mod state;
pub mod store;

pub use config::ShopConfig;
pub use state::AppState;
pub use store::{Repository, Store};

use domain::aggregates::{CartError, CouponError, OrderError};
use services::payments::PaymentError;
use store::StoreError;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum ShopError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Coupon(#[from] CouponError),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Payment error: {0}")]
    Payment(#[from] PaymentError),
}

impl ShopError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound { entity, id: id.into() }
    }
}

impl From<validator::ValidationErrors> for ShopError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors.field_errors().keys().map(|k| k.to_string()).collect();
        fields.sort_unstable();
        Self::Validation(format!("Invalid fields: {}", fields.join(", ")))
    }
}

pub type Result<T> = std::result::Result<T, ShopError>;
