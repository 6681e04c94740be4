//! Payment provider integration (Mercado Pago Checkout Pro).
//!
//! Checkout builds a [`Preference`] for a pending order and sends the buyer
//! to the redirect URL the provider returns. The provider later notifies us
//! about the payment, which we look up with [`PaymentGateway::payment`].

use async_trait::async_trait;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::PaymentConfig;
use crate::domain::aggregates::Order;

/// Line id of the synthetic shipping item.
pub const SHIPPING_LINE_ID: &str = "shipping";

#[derive(Debug, Error)]
pub enum PaymentError {
    /// Neither the settings row nor the environment provides a token.
    #[error("payment provider is not configured")]
    MissingCredentials,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("payment provider returned no checkout URL")]
    MissingRedirect,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Preference {
    pub items: Vec<PreferenceItem>,
    pub payer: Payer,
    pub external_reference: String,
    pub back_urls: BackUrls,
    pub auto_return: &'static str,
    pub notification_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreferenceItem {
    pub id: String,
    pub title: String,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    pub currency_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Payer {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<Phone>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Phone {
    pub number: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackUrls {
    pub success: String,
    pub failure: String,
    pub pending: String,
}

/// Where the buyer is sent to pay.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PreferenceLink {
    pub id: String,
    pub init_point: Option<String>,
    pub sandbox_init_point: Option<String>,
}

impl PreferenceLink {
    pub fn redirect_url(&self, sandbox: bool) -> Option<&str> {
        let preferred = if sandbox { &self.sandbox_init_point } else { &self.init_point };
        preferred.as_deref().or(self.init_point.as_deref())
    }
}

/// The subset of a provider payment the storefront acts on.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PaymentInfo {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub external_reference: Option<String>,
}

impl PaymentInfo {
    pub fn is_approved(&self) -> bool { self.status == "approved" }
}

pub(crate) fn id_as_string<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("unexpected payment id {other}"))),
    }
}

/// Builds the provider preference for a freshly placed order.
///
/// One line per cart item, titled with the chosen variants, plus a single
/// shipping line when the order carries a shipping fee.
pub fn build_preference(order: &Order, currency: &str, public_base_url: &str) -> Preference {
    let mut items: Vec<PreferenceItem> = order
        .items
        .iter()
        .map(|item| PreferenceItem {
            id: item.product_id.clone(),
            title: item.title(),
            quantity: item.quantity,
            unit_price: item.price,
            currency_id: currency.to_string(),
        })
        .collect();

    if order.shipping_fee > Decimal::ZERO {
        items.push(PreferenceItem {
            id: SHIPPING_LINE_ID.to_string(),
            title: format!("Shipping ({})", order.shipping_method),
            quantity: 1,
            unit_price: order.shipping_fee,
            currency_id: currency.to_string(),
        });
    }

    Preference {
        items,
        payer: Payer {
            email: order.customer_email.clone(),
            phone: order.customer_phone.clone().map(|number| Phone { number }),
        },
        external_reference: order.id.clone(),
        back_urls: BackUrls {
            success: format!("{public_base_url}/checkout/success"),
            failure: format!("{public_base_url}/checkout/failure"),
            pending: format!("{public_base_url}/checkout/pending"),
        },
        auto_return: "approved",
        notification_url: format!("{public_base_url}/api/payments/notifications"),
    }
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_preference(&self, access_token: &SecretString, preference: &Preference) -> Result<PreferenceLink, PaymentError>;

    async fn payment(&self, access_token: &SecretString, payment_id: &str) -> Result<PaymentInfo, PaymentError>;
}

/// Mercado Pago REST client.
#[derive(Clone)]
pub struct MercadoPagoClient {
    client: reqwest::Client,
    api_url: String,
}

impl MercadoPagoClient {
    pub fn new(config: &PaymentConfig) -> Result<Self, PaymentError> {
        let client = reqwest::Client::builder().timeout(std::time::Duration::from_secs(15)).build()?;
        Ok(Self { client, api_url: config.api_url.trim_end_matches('/').to_string() })
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, PaymentError> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PaymentError::Api { status: status.as_u16(), message });
        }
        Ok(response)
    }
}

#[async_trait]
impl PaymentGateway for MercadoPagoClient {
    #[tracing::instrument(skip_all, fields(order_id = %preference.external_reference))]
    async fn create_preference(&self, access_token: &SecretString, preference: &Preference) -> Result<PreferenceLink, PaymentError> {
        let response = self
            .client
            .post(format!("{}/checkout/preferences", self.api_url))
            .bearer_auth(access_token.expose_secret())
            .json(preference)
            .send()
            .await?;
        let link = Self::check(response).await?.json::<PreferenceLink>().await?;
        tracing::debug!(preference_id = %link.id, "Payment preference created");
        Ok(link)
    }

    #[tracing::instrument(skip(self, access_token))]
    async fn payment(&self, access_token: &SecretString, payment_id: &str) -> Result<PaymentInfo, PaymentError> {
        let response = self
            .client
            .get(format!("{}/v1/payments/{payment_id}", self.api_url))
            .bearer_auth(access_token.expose_secret())
            .send()
            .await?;
        Ok(Self::check(response).await?.json::<PaymentInfo>().await?)
    }
}
