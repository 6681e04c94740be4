//! Checkout orchestration.
//!
//! 1. Validate the request
//! 2. Persist the order as `pending`
//! 3. Build the payment preference and ask the provider for a checkout URL
//! 4. Convert the originating cart (best effort)
//! 5. Publish `order_placed`
//!
//! A failure after step 2 leaves the order pending; nothing is rolled back.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::config::ShopConfig;
use crate::domain::aggregates::{Buyer, CartItem, Order, ShippingSelection};
use crate::services::payments::{build_preference, PaymentError, PaymentGateway};
use crate::services::settings::SettingsService;
use crate::services::{CartService, EventBus};
use crate::store::{Repository, Store};
use crate::{Result, ShopError};

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[validate(length(min = 1))]
    pub items: Vec<CartItem>,
    pub total: Decimal,
    #[serde(default)]
    pub user_id: Option<String>,
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub shipping: ShippingSelection,
    #[serde(default)]
    pub cart_id: Option<String>,
}

impl CheckoutRequest {
    fn check(&self) -> Result<()> {
        self.validate()?;
        if self.items.iter().any(|i| i.quantity == 0) {
            return Err(ShopError::Validation("Item quantity must be at least 1".to_string()));
        }
        if self.items.iter().any(|i| i.price < Decimal::ZERO) {
            return Err(ShopError::Validation("Item price cannot be negative".to_string()));
        }
        if self.shipping.fee < Decimal::ZERO || self.total < Decimal::ZERO {
            return Err(ShopError::Validation("Amounts cannot be negative".to_string()));
        }
        if self.shipping.method.trim().is_empty() {
            return Err(ShopError::Validation("Shipping method is required".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSession {
    pub order_id: String,
    pub url: String,
}

#[derive(Clone)]
pub struct CheckoutService {
    store: Store,
    gateway: Arc<dyn PaymentGateway>,
    settings: SettingsService,
    carts: CartService,
    events: EventBus,
    config: Arc<ShopConfig>,
}

impl CheckoutService {
    pub fn new(
        store: Store,
        gateway: Arc<dyn PaymentGateway>,
        carts: CartService,
        events: EventBus,
        config: Arc<ShopConfig>,
    ) -> Self {
        let settings = SettingsService::new(store.clone());
        Self { store, gateway, settings, carts, events, config }
    }

    #[tracing::instrument(skip_all, fields(items = request.items.len(), cart_id = ?request.cart_id))]
    pub async fn checkout(&self, request: CheckoutRequest) -> Result<CheckoutSession> {
        request.check()?;

        let buyer = Buyer { user_id: request.user_id, email: request.email.trim().to_string(), phone: request.phone };
        let mut order = Order::place(request.items, request.total, buyer, request.shipping);
        self.store.save(&order).await?;
        tracing::info!(order_id = %order.id, total = %order.total, "Order placed");

        let token = self
            .settings
            .payment_token(self.config.payments.access_token.as_ref())
            .await?
            .ok_or(PaymentError::MissingCredentials)?;
        let preference = build_preference(&order, &self.config.currency, &self.config.public_base_url);
        let link = self.gateway.create_preference(&token, &preference).await.map_err(|e| {
            tracing::error!(order_id = %order.id, error = %e, "Payment preference failed, order left pending");
            e
        })?;
        let url = link.redirect_url(self.config.payments.sandbox).ok_or(PaymentError::MissingRedirect)?.to_string();

        if let Some(cart_id) = request.cart_id.as_deref().filter(|id| !id.trim().is_empty()) {
            self.carts.convert(cart_id).await;
        }
        self.events.publish_all(order.take_events()).await;

        Ok(CheckoutSession { order_id: order.id, url })
    }
}
