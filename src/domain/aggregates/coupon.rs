//! Coupon Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::CouponCode;
use crate::store::Entity;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub id: String,
    pub code: CouponCode,
    pub discount_type: DiscountType,
    pub value: Decimal,
    #[serde(default)]
    pub min_purchase: Option<Decimal>,
    #[serde(default)]
    pub usage_limit: Option<i32>,
    #[serde(default)]
    pub usage_count: i32,
    #[serde(default)]
    pub expiration_date: Option<DateTime<Utc>>,
    #[serde(default = "active_by_default")]
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    Percentage,
    Fixed,
}

impl DiscountType {
    pub fn as_str(&self) -> &'static str {
        match self { Self::Percentage => "percentage", Self::Fixed => "fixed" }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "percentage" => Some(Self::Percentage),
            "fixed" => Some(Self::Fixed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CouponError {
    #[error("Coupon not found")]
    NotFound,
    #[error("Coupon is not active")]
    Inactive,
    #[error("Coupon has expired")]
    Expired,
    #[error("Coupon usage limit reached")]
    UsageLimitReached,
    #[error("Minimum purchase of {minimum} not reached")]
    MinimumNotMet { minimum: Decimal },
    #[error("Subtotal is out of range")]
    AmountOutOfRange,
}

fn active_by_default() -> bool { true }

impl Coupon {
    pub fn create(code: CouponCode, discount_type: DiscountType, value: Decimal) -> Self {
        Self {
            id: uuid::Uuid::now_v7().to_string(), code, discount_type, value, min_purchase: None,
            usage_limit: None, usage_count: 0, expiration_date: None, active: true, created_at: Utc::now(),
        }
    }

    /// Checks the coupon against a cart subtotal and returns the discount it grants.
    pub fn evaluate(&self, subtotal: Decimal, now: DateTime<Utc>) -> Result<Decimal, CouponError> {
        if !self.active { return Err(CouponError::Inactive); }
        if self.expiration_date.is_some_and(|expires| now > expires) { return Err(CouponError::Expired); }
        if self.usage_limit.is_some_and(|limit| self.usage_count >= limit) { return Err(CouponError::UsageLimitReached); }
        if let Some(minimum) = self.min_purchase {
            if subtotal < minimum { return Err(CouponError::MinimumNotMet { minimum }); }
        }
        let discount = match self.discount_type {
            DiscountType::Percentage => subtotal
                .checked_mul(self.value)
                .and_then(|amount| amount.checked_div(Decimal::ONE_HUNDRED))
                .ok_or(CouponError::AmountOutOfRange)?
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
            DiscountType::Fixed => self.value,
        };
        Ok(discount.min(subtotal).max(Decimal::ZERO))
    }

    pub fn record_use(&mut self) { self.usage_count = self.usage_count.saturating_add(1); }
}

impl Entity for Coupon {
    const COLLECTION: &'static str = "coupons";
    const NAME: &'static str = "Coupon";
    fn id(&self) -> &str { &self.id }
}
