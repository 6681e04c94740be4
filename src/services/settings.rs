//! Integration settings: webhook destinations and the payment token.

use chrono::Utc;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::domain::aggregates::{IntegrationSettings, GLOBAL_SETTINGS_ID};
use crate::store::{Repository, Store};
use crate::{Result, ShopError};

/// What the back office sees. Tokens are reported only as set or unset.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsView {
    pub order_webhook_url: Option<String>,
    pub order_webhook_enabled: bool,
    pub abandoned_cart_webhook_url: Option<String>,
    pub abandoned_cart_webhook_enabled: bool,
    pub webhook_token_set: bool,
    pub payment_access_token_set: bool,
}

impl From<&IntegrationSettings> for SettingsView {
    fn from(s: &IntegrationSettings) -> Self {
        Self {
            order_webhook_url: s.order_webhook_url.clone(),
            order_webhook_enabled: s.order_webhook_enabled,
            abandoned_cart_webhook_url: s.abandoned_cart_webhook_url.clone(),
            abandoned_cart_webhook_enabled: s.abandoned_cart_webhook_enabled,
            webhook_token_set: s.bearer_token().is_some(),
            payment_access_token_set: non_blank(s.payment_access_token.as_deref()).is_some(),
        }
    }
}

/// Settings update. Token fields left out keep their stored value; an
/// empty string clears them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
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
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn webhook_url(field: &str, value: Option<&str>) -> Result<Option<String>> {
    let Some(url) = non_blank(value) else { return Ok(None) };
    match reqwest::Url::parse(url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(Some(url.to_string())),
        _ => Err(ShopError::Validation(format!("{field} must be an http(s) URL"))),
    }
}

#[derive(Clone)]
pub struct SettingsService {
    store: Store,
}

impl SettingsService {
    pub fn new(store: Store) -> Self { Self { store } }

    /// The stored row, or defaults (everything off) when none exists yet.
    pub async fn load(&self) -> Result<IntegrationSettings> {
        let stored = Repository::<IntegrationSettings>::get(&self.store, GLOBAL_SETTINGS_ID).await?;
        Ok(stored.unwrap_or_default())
    }

    #[tracing::instrument(skip_all)]
    pub async fn update(&self, update: SettingsUpdate) -> Result<IntegrationSettings> {
        let order_url = webhook_url("orderWebhookUrl", update.order_webhook_url.as_deref())?;
        let cart_url = webhook_url("abandonedCartWebhookUrl", update.abandoned_cart_webhook_url.as_deref())?;
        let mut settings = self.load().await?;
        settings.order_webhook_url = order_url;
        settings.order_webhook_enabled = update.order_webhook_enabled;
        settings.abandoned_cart_webhook_url = cart_url;
        settings.abandoned_cart_webhook_enabled = update.abandoned_cart_webhook_enabled;
        if let Some(token) = update.webhook_token {
            settings.webhook_token = non_blank(Some(&token)).map(str::to_string);
        }
        if let Some(token) = update.payment_access_token {
            settings.payment_access_token = non_blank(Some(&token)).map(str::to_string);
        }
        settings.updated_at = Utc::now();
        self.store.save(&settings).await?;
        tracing::info!(?settings, "Integration settings updated");
        Ok(settings)
    }

    /// The payment token: the settings row wins, the environment is the fallback.
    pub async fn payment_token(&self, fallback: Option<&SecretString>) -> Result<Option<SecretString>> {
        let settings = self.load().await?;
        let stored = non_blank(settings.payment_access_token.as_deref()).map(|t| SecretString::from(t.to_string()));
        Ok(stored.or_else(|| fallback.cloned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[tokio::test]
    async fn test_missing_row_means_defaults() {
        let settings = SettingsService::new(Store::in_memory()).load().await.unwrap();
        assert!(!settings.order_webhook_enabled);
        assert!(!settings.abandoned_cart_webhook_enabled);
        assert_eq!(settings.id, GLOBAL_SETTINGS_ID);
    }

    #[tokio::test]
    async fn test_update_keeps_omitted_tokens() {
        let service = SettingsService::new(Store::in_memory());
        service.update(SettingsUpdate { webhook_token: Some("secret".into()), ..Default::default() }).await.unwrap();
        let updated = service
            .update(SettingsUpdate { order_webhook_url: Some("https://hooks.test/orders".into()), order_webhook_enabled: true, ..Default::default() })
            .await
            .unwrap();
        assert_eq!(updated.bearer_token(), Some("secret"));

        let view = SettingsView::from(&updated);
        assert!(view.webhook_token_set);
        assert!(!view.payment_access_token_set);
        let json = serde_json::to_string(&view).unwrap();
        assert!(!json.contains("secret"));
    }

    #[tokio::test]
    async fn test_invalid_url_is_rejected() {
        let service = SettingsService::new(Store::in_memory());
        let result = service.update(SettingsUpdate { order_webhook_url: Some("not a url".into()), ..Default::default() }).await;
        assert!(matches!(result, Err(ShopError::Validation(_))));
    }

    #[tokio::test]
    async fn test_payment_token_prefers_settings() {
        let service = SettingsService::new(Store::in_memory());
        let env = SecretString::from("env-token".to_string());
        let token = service.payment_token(Some(&env)).await.unwrap().unwrap();
        assert_eq!(token.expose_secret(), "env-token");

        service.update(SettingsUpdate { payment_access_token: Some("db-token".into()), ..Default::default() }).await.unwrap();
        let token = service.payment_token(Some(&env)).await.unwrap().unwrap();
        assert_eq!(token.expose_secret(), "db-token");
    }
}
