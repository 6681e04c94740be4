//! Payment notifications from the provider.
//!
//! The notification only carries a payment id; the payment itself is fetched
//! from the provider before anything changes. An approved payment moves its
//! order from `pending` to `paid` and fires the `order_created` webhook.
//! Notifications are retried by the provider, so a repeat is acknowledged
//! without side effects.

use std::sync::Arc;

use serde::Deserialize;

use crate::config::ShopConfig;
use crate::domain::aggregates::Order;
use crate::services::payments::{id_as_string, PaymentError, PaymentGateway};
use crate::services::settings::SettingsService;
use crate::services::{DispatchOutcome, EventBus, WebhookDispatcher};
use crate::store::{Repository, Store};
use crate::Result;

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentNotification {
    #[serde(rename = "type", alias = "topic", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub data: Option<NotificationData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationData {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
}

impl PaymentNotification {
    fn payment_id(&self) -> Option<&str> {
        if self.kind.as_deref() != Some("payment") {
            return None;
        }
        self.data.as_ref().map(|d| d.id.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationOutcome {
    /// Not a payment notification.
    Ignored,
    NotApproved { status: String },
    UnknownOrder,
    /// The order already left `pending`.
    AlreadyProcessed { order_id: String },
    Paid { order_id: String, webhook: DispatchOutcome },
}

#[derive(Clone)]
pub struct NotificationService {
    store: Store,
    gateway: Arc<dyn PaymentGateway>,
    settings: SettingsService,
    webhooks: WebhookDispatcher,
    events: EventBus,
    config: Arc<ShopConfig>,
}

impl NotificationService {
    pub fn new(
        store: Store,
        gateway: Arc<dyn PaymentGateway>,
        webhooks: WebhookDispatcher,
        events: EventBus,
        config: Arc<ShopConfig>,
    ) -> Self {
        let settings = SettingsService::new(store.clone());
        Self { store, gateway, settings, webhooks, events, config }
    }

    #[tracing::instrument(skip_all, fields(kind = ?notification.kind))]
    pub async fn handle(&self, notification: &PaymentNotification) -> Result<NotificationOutcome> {
        let Some(payment_id) = notification.payment_id() else {
            tracing::debug!("Ignoring non-payment notification");
            return Ok(NotificationOutcome::Ignored);
        };

        let token = self
            .settings
            .payment_token(self.config.payments.access_token.as_ref())
            .await?
            .ok_or(PaymentError::MissingCredentials)?;
        let payment = self.gateway.payment(&token, payment_id).await?;
        if !payment.is_approved() {
            tracing::info!(payment_id, status = %payment.status, "Payment not approved yet");
            return Ok(NotificationOutcome::NotApproved { status: payment.status });
        }

        let order_id = payment.external_reference.as_deref().unwrap_or_default();
        let Some(mut order) = Repository::<Order>::get(&self.store, order_id).await? else {
            tracing::warn!(payment_id, order_id, "Approved payment references no known order");
            return Ok(NotificationOutcome::UnknownOrder);
        };
        if !order.is_pending() {
            tracing::debug!(order_id, status = order.status.as_str(), "Order already processed");
            return Ok(NotificationOutcome::AlreadyProcessed { order_id: order.id });
        }

        order.mark_paid(payment.id.as_str())?;
        self.store.save(&order).await?;
        tracing::info!(order_id, payment_id = %payment.id, "Order paid");

        let webhook = self.webhooks.order_created(&order).await;
        self.events.publish_all(order.take_events()).await;
        Ok(NotificationOutcome::Paid { order_id: order.id, webhook })
    }
}
