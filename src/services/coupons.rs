//! Coupon validation and redemption.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::aggregates::{Coupon, CouponError};
use crate::domain::value_objects::CouponCode;
use crate::store::{Repository, Store};
use crate::{Result, ShopError};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponCheck {
    pub code: String,
    pub subtotal: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponDiscount {
    pub code: String,
    pub discount: Decimal,
    pub total: Decimal,
}

#[derive(Clone)]
pub struct CouponService {
    store: Store,
}

impl CouponService {
    pub fn new(store: Store) -> Self { Self { store } }

    /// Looks a coupon up by its normalized code.
    pub async fn find(&self, code: &str) -> Result<Coupon> {
        let code = CouponCode::new(code).map_err(|_| CouponError::NotFound)?;
        let coupons: Vec<Coupon> = Repository::<Coupon>::list(&self.store).await?;
        coupons.into_iter().find(|c| c.code == code).ok_or(ShopError::Coupon(CouponError::NotFound))
    }

    pub async fn validate(&self, check: &CouponCheck) -> Result<CouponDiscount> {
        let coupon = self.find(&check.code).await?;
        Self::discount(&coupon, check.subtotal)
    }

    /// Re-validates and counts one use of the coupon.
    #[tracing::instrument(skip(self, check), fields(code = %check.code))]
    pub async fn redeem(&self, check: &CouponCheck) -> Result<CouponDiscount> {
        let mut coupon = self.find(&check.code).await?;
        let discount = Self::discount(&coupon, check.subtotal)?;
        coupon.record_use();
        self.store.save(&coupon).await?;
        tracing::info!(usage_count = coupon.usage_count, "Coupon redeemed");
        Ok(discount)
    }

    fn discount(coupon: &Coupon, subtotal: Decimal) -> Result<CouponDiscount> {
        if subtotal.is_sign_negative() && !subtotal.is_zero() {
            return Err(ShopError::Validation("Subtotal cannot be negative".to_string()));
        }
        let discount = coupon.evaluate(subtotal, Utc::now())?;
        Ok(CouponDiscount { code: coupon.code.to_string(), discount, total: subtotal - discount })
    }
}
