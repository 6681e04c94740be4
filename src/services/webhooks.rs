//! Outbound webhooks feeding the WhatsApp automations.
//!
//! Every dispatch re-reads the global settings row. Delivery is a single
//! POST: failures are logged and reported as [`DispatchOutcome::Failed`],
//! never retried and never surfaced to the caller as an error.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::domain::aggregates::{
    Buyer, Cart, CartItem, CartOwner, IntegrationSettings, Order, ShippingSelection, WebhookKind, GLOBAL_SETTINGS_ID,
};
use crate::store::{Repository, Store};

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid webhook request: {0}")]
    Request(String),
}

/// Sends one JSON POST and reports the response status.
#[async_trait]
pub trait WebhookTransport: Send + Sync {
    async fn post_json(&self, url: &str, bearer: Option<&str>, body: &serde_json::Value) -> Result<u16, WebhookError>;
}

#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, WebhookError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl WebhookTransport for HttpTransport {
    async fn post_json(&self, url: &str, bearer: Option<&str>, body: &serde_json::Value) -> Result<u16, WebhookError> {
        let mut request = self.client.post(url).json(body);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        Ok(response.status().as_u16())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Toggle off or no destination configured; no request was made.
    Skipped,
    Delivered { status: u16 },
    Failed { reason: String },
}

// =============================================================================
// Payloads
// =============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookCustomer {
    pub user_id: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookItem {
    pub product_id: String,
    pub title: String,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookShipping {
    pub method: String,
    pub address: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub fee: Decimal,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreatedPayload {
    pub event: &'static str,
    pub order_id: String,
    pub status: &'static str,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub customer: WebhookCustomer,
    pub shipping: WebhookShipping,
    pub items: Vec<WebhookItem>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AbandonedCartPayload {
    pub event: &'static str,
    pub cart_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub customer: WebhookCustomer,
    pub items: Vec<WebhookItem>,
    pub last_activity: DateTime<Utc>,
}

impl From<CartOwner> for WebhookCustomer {
    fn from(owner: CartOwner) -> Self { Self { user_id: owner.user_id, email: owner.email, phone: owner.phone } }
}

impl From<Buyer> for WebhookCustomer {
    fn from(buyer: Buyer) -> Self { Self { user_id: buyer.user_id, email: Some(buyer.email), phone: buyer.phone } }
}

impl From<ShippingSelection> for WebhookShipping {
    fn from(shipping: ShippingSelection) -> Self {
        Self { method: shipping.method, address: shipping.address, fee: shipping.fee }
    }
}

fn webhook_items(items: &[CartItem]) -> Vec<WebhookItem> {
    items
        .iter()
        .map(|i| WebhookItem { product_id: i.product_id.clone(), title: i.title(), quantity: i.quantity, unit_price: i.price })
        .collect()
}

impl From<&Order> for OrderCreatedPayload {
    fn from(order: &Order) -> Self {
        Self {
            event: WebhookKind::OrderCreated.event_name(),
            order_id: order.id.clone(),
            status: order.status.as_str(),
            total: order.total,
            customer: order.buyer().into(),
            shipping: order.shipping().into(),
            items: webhook_items(&order.items),
            created_at: order.created_at,
        }
    }
}

impl From<&Cart> for AbandonedCartPayload {
    fn from(cart: &Cart) -> Self {
        Self {
            event: WebhookKind::AbandonedCart.event_name(),
            cart_id: cart.id.clone(),
            total: cart.total,
            customer: cart.owner().into(),
            items: webhook_items(&cart.items),
            last_activity: cart.updated_at,
        }
    }
}

// =============================================================================
// Dispatcher
// =============================================================================

#[derive(Clone)]
pub struct WebhookDispatcher {
    store: Store,
    transport: Arc<dyn WebhookTransport>,
}

impl WebhookDispatcher {
    pub fn new(store: Store, transport: Arc<dyn WebhookTransport>) -> Self { Self { store, transport } }

    #[tracing::instrument(skip_all, fields(order_id = %order.id))]
    pub async fn order_created(&self, order: &Order) -> DispatchOutcome {
        self.dispatch(WebhookKind::OrderCreated, OrderCreatedPayload::from(order)).await
    }

    #[tracing::instrument(skip_all, fields(cart_id = %cart.id))]
    pub async fn abandoned_cart(&self, cart: &Cart) -> DispatchOutcome {
        self.dispatch(WebhookKind::AbandonedCart, AbandonedCartPayload::from(cart)).await
    }

    async fn dispatch<P: Serialize>(&self, kind: WebhookKind, payload: P) -> DispatchOutcome {
        let settings = match Repository::<IntegrationSettings>::get(&self.store, GLOBAL_SETTINGS_ID).await {
            Ok(settings) => settings.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, event = kind.event_name(), "Could not load integration settings");
                return DispatchOutcome::Failed { reason: e.to_string() };
            }
        };

        let Some(url) = settings.webhook_target(kind) else {
            tracing::debug!(event = kind.event_name(), "Webhook disabled, skipping");
            return DispatchOutcome::Skipped;
        };

        let body = match serde_json::to_value(&payload) {
            Ok(body) => body,
            Err(e) => return DispatchOutcome::Failed { reason: e.to_string() },
        };

        match self.transport.post_json(url, settings.bearer_token(), &body).await {
            Ok(status) if (200..300).contains(&status) => {
                tracing::info!(event = kind.event_name(), status, "Webhook delivered");
                DispatchOutcome::Delivered { status }
            }
            Ok(status) => {
                tracing::warn!(event = kind.event_name(), status, "Webhook rejected");
                DispatchOutcome::Failed { reason: format!("receiver answered {status}") }
            }
            Err(e) => {
                tracing::warn!(event = kind.event_name(), error = %e, "Webhook delivery failed");
                DispatchOutcome::Failed { reason: e.to_string() }
            }
        }
    }
}
