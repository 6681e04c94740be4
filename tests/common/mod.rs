//! Shared test fixtures: in-memory storage plus recording fakes for the
//! payment provider and the webhook transport.
#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::net::{IpAddr, Ipv4Addr};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use shopfront::config::{BackendKind, PaymentConfig};
use shopfront::domain::aggregates::{CartItem, IntegrationSettings};
use shopfront::services::payments::{PaymentError, PaymentInfo, Preference, PreferenceLink};
use shopfront::services::webhooks::WebhookError;
use shopfront::services::{EventBus, PaymentGateway, WebhookTransport};
use shopfront::{AppState, Repository, ShopConfig, Store};

pub const BASE_URL: &str = "https://shop.test";

pub fn test_config() -> ShopConfig {
    ShopConfig {
        backend: BackendKind::Records,
        database_url: None,
        records_path: None,
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        public_base_url: BASE_URL.to_string(),
        currency: "ARS".to_string(),
        payments: PaymentConfig {
            access_token: Some(SecretString::from("env-token".to_string())),
            api_url: "https://payments.test".to_string(),
            sandbox: false,
        },
        webhook_timeout: Duration::from_secs(1),
        nats_url: None,
    }
}

pub fn item(product_id: &str, name: &str, price: Decimal, quantity: u32) -> CartItem {
    CartItem {
        product_id: product_id.to_string(),
        name: name.to_string(),
        price,
        quantity,
        image_url: None,
        selected_variants: BTreeMap::new(),
    }
}

// =============================================================================
// Webhook transport
// =============================================================================

#[derive(Debug, Clone)]
pub struct WebhookCall {
    pub url: String,
    pub bearer: Option<String>,
    pub body: Value,
}

/// Records every POST and answers with a fixed status, or a transport error
/// when `status` is `None`.
pub struct RecordingTransport {
    status: Option<u16>,
    calls: Mutex<Vec<WebhookCall>>,
}

impl RecordingTransport {
    pub fn answering(status: u16) -> Arc<Self> { Arc::new(Self { status: Some(status), calls: Mutex::new(vec![]) }) }

    pub fn unreachable() -> Arc<Self> { Arc::new(Self { status: None, calls: Mutex::new(vec![]) }) }

    pub fn calls(&self) -> Vec<WebhookCall> { self.calls.lock().unwrap().clone() }
}

#[async_trait]
impl WebhookTransport for RecordingTransport {
    async fn post_json(&self, url: &str, bearer: Option<&str>, body: &Value) -> Result<u16, WebhookError> {
        self.calls.lock().unwrap().push(WebhookCall {
            url: url.to_string(),
            bearer: bearer.map(str::to_string),
            body: body.clone(),
        });
        self.status.ok_or_else(|| WebhookError::Request("connection refused".to_string()))
    }
}

// =============================================================================
// Payment gateway
// =============================================================================

#[derive(Default)]
pub struct FakeGateway {
    pub fail: bool,
    preferences: Mutex<Vec<(String, Preference)>>,
    payments: Mutex<HashMap<String, PaymentInfo>>,
}

impl FakeGateway {
    pub fn new() -> Arc<Self> { Arc::new(Self::default()) }

    pub fn failing() -> Arc<Self> { Arc::new(Self { fail: true, ..Default::default() }) }

    /// Preferences created so far, with the token each was created with.
    pub fn preferences(&self) -> Vec<(String, Preference)> { self.preferences.lock().unwrap().clone() }

    pub fn add_payment(&self, id: &str, status: &str, order_id: &str) {
        self.payments.lock().unwrap().insert(
            id.to_string(),
            PaymentInfo { id: id.to_string(), status: status.to_string(), external_reference: Some(order_id.to_string()) },
        );
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_preference(&self, access_token: &SecretString, preference: &Preference) -> Result<PreferenceLink, PaymentError> {
        if self.fail {
            return Err(PaymentError::Api { status: 500, message: "provider down".to_string() });
        }
        self.preferences.lock().unwrap().push((access_token.expose_secret().to_string(), preference.clone()));
        Ok(PreferenceLink {
            id: format!("pref-{}", preference.external_reference),
            init_point: Some(format!("https://pay.test/{}", preference.external_reference)),
            sandbox_init_point: Some(format!("https://sandbox.pay.test/{}", preference.external_reference)),
        })
    }

    async fn payment(&self, _access_token: &SecretString, payment_id: &str) -> Result<PaymentInfo, PaymentError> {
        self.payments
            .lock()
            .unwrap()
            .get(payment_id)
            .cloned()
            .ok_or(PaymentError::Api { status: 404, message: "payment not found".to_string() })
    }
}

// =============================================================================
// App
// =============================================================================

pub struct TestApp {
    pub state: AppState,
    pub store: Store,
    pub gateway: Arc<FakeGateway>,
    pub transport: Arc<RecordingTransport>,
}

impl TestApp {
    pub fn new() -> Self { Self::with(FakeGateway::new(), RecordingTransport::answering(200)) }

    pub fn with(gateway: Arc<FakeGateway>, transport: Arc<RecordingTransport>) -> Self {
        Self::with_config(test_config(), gateway, transport)
    }

    pub fn with_config(config: ShopConfig, gateway: Arc<FakeGateway>, transport: Arc<RecordingTransport>) -> Self {
        let store = Store::in_memory();
        let state = AppState::new(config, store.clone(), gateway.clone(), transport.clone(), EventBus::disabled());
        Self { state, store, gateway, transport }
    }

    pub async fn save_settings(&self, settings: IntegrationSettings) {
        self.store.save(&settings).await.unwrap();
    }
}
