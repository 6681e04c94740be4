//! Integration settings

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::Entity;

/// The single settings row used by every webhook dispatch.
pub const GLOBAL_SETTINGS_ID: &str = "global";

/// Implements `Debug` manually to redact tokens.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationSettings {
    pub id: String,
    #[serde(default)]
    pub order_webhook_url: Option<String>,
    #[serde(default)]
    pub order_webhook_enabled: bool,
    #[serde(default)]
    pub abandoned_cart_webhook_url: Option<String>,
    #[serde(default)]
    pub abandoned_cart_webhook_enabled: bool,
    #[serde(default)]
    pub webhook_token: Option<String>,
    #[serde(default)]
    pub payment_access_token: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Which automation a webhook feeds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WebhookKind {
    OrderCreated,
    AbandonedCart,
}

impl WebhookKind {
    pub fn event_name(&self) -> &'static str {
        match self { Self::OrderCreated => "order_created", Self::AbandonedCart => "abandoned_cart" }
    }
}

impl Default for IntegrationSettings {
    fn default() -> Self {
        Self {
            id: GLOBAL_SETTINGS_ID.to_string(), order_webhook_url: None, order_webhook_enabled: false,
            abandoned_cart_webhook_url: None, abandoned_cart_webhook_enabled: false, webhook_token: None,
            payment_access_token: None, updated_at: Utc::now(),
        }
    }
}

impl IntegrationSettings {
    /// The destination for a webhook kind, or `None` when the toggle is off
    /// or the URL is blank.
    pub fn webhook_target(&self, kind: WebhookKind) -> Option<&str> {
        let (enabled, url) = match kind {
            WebhookKind::OrderCreated => (self.order_webhook_enabled, &self.order_webhook_url),
            WebhookKind::AbandonedCart => (self.abandoned_cart_webhook_enabled, &self.abandoned_cart_webhook_url),
        };
        if !enabled { return None; }
        url.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }

    pub fn bearer_token(&self) -> Option<&str> {
        self.webhook_token.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}

impl std::fmt::Debug for IntegrationSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntegrationSettings")
            .field("order_webhook_url", &self.order_webhook_url)
            .field("order_webhook_enabled", &self.order_webhook_enabled)
            .field("abandoned_cart_webhook_url", &self.abandoned_cart_webhook_url)
            .field("abandoned_cart_webhook_enabled", &self.abandoned_cart_webhook_enabled)
            .field("webhook_token", &self.webhook_token.as_ref().map(|_| "[REDACTED]"))
            .field("payment_access_token", &self.payment_access_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Entity for IntegrationSettings {
    const COLLECTION: &'static str = "integration_settings";
    const NAME: &'static str = "Integration settings";
    fn id(&self) -> &str { &self.id }
}
