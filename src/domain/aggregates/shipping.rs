//! Shipping rates

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::store::Entity;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingRate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    /// Orders whose subtotal reaches this amount ship for free.
    #[serde(default)]
    pub free_over: Option<Decimal>,
    #[serde(default)]
    pub estimated_days: Option<String>,
    #[serde(default = "active_by_default")]
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// A rate priced for a particular cart.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingQuote {
    pub rate_id: String,
    pub name: String,
    pub fee: Decimal,
    pub estimated_days: Option<String>,
}

fn active_by_default() -> bool { true }

impl ShippingRate {
    pub fn create(name: impl Into<String>, price: Decimal) -> Self {
        Self {
            id: uuid::Uuid::now_v7().to_string(), name: name.into(), description: None, price,
            free_over: None, estimated_days: None, active: true, created_at: Utc::now(),
        }
    }

    pub fn fee_for(&self, subtotal: Decimal) -> Decimal {
        match self.free_over {
            Some(threshold) if subtotal >= threshold => Decimal::ZERO,
            _ => self.price,
        }
    }
}

pub fn quote(rates: &[ShippingRate], subtotal: Decimal) -> Vec<ShippingQuote> {
    rates
        .iter()
        .filter(|r| r.active)
        .map(|r| ShippingQuote { rate_id: r.id.clone(), name: r.name.clone(), fee: r.fee_for(subtotal), estimated_days: r.estimated_days.clone() })
        .collect()
}

impl Entity for ShippingRate {
    const COLLECTION: &'static str = "shipping_rates";
    const NAME: &'static str = "Shipping rate";
    fn id(&self) -> &str { &self.id }
}
