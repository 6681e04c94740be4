mod common;

use std::sync::Arc;

use rust_decimal_macros::dec;

use common::{item, FakeGateway, RecordingTransport, TestApp};
use shopfront::domain::aggregates::{Buyer, Cart, CartStatus, IntegrationSettings, Order, ShippingSelection};
use shopfront::services::carts::CartSync;
use shopfront::services::{DispatchOutcome, WebhookDispatcher};
use shopfront::{Repository, Store};

fn enabled(token: Option<&str>) -> IntegrationSettings {
    IntegrationSettings {
        order_webhook_url: Some("https://hooks.test/orders".into()),
        order_webhook_enabled: true,
        abandoned_cart_webhook_url: Some("https://hooks.test/carts".into()),
        abandoned_cart_webhook_enabled: true,
        webhook_token: token.map(str::to_string),
        ..Default::default()
    }
}

fn order() -> Order {
    Order::place(
        vec![item("p1", "Vela", dec!(1250), 2)],
        dec!(2500),
        Buyer { email: "c@d.com".into(), phone: Some("+54911".into()), user_id: None },
        ShippingSelection { method: "pickup".into(), address: None, fee: dec!(0) },
    )
}

async fn dispatcher(settings: Option<IntegrationSettings>, transport: Arc<RecordingTransport>) -> WebhookDispatcher {
    let store = Store::in_memory();
    if let Some(settings) = settings {
        store.save(&settings).await.unwrap();
    }
    WebhookDispatcher::new(store, transport)
}

#[tokio::test]
async fn test_toggle_off_makes_no_call() {
    let transport = RecordingTransport::answering(200);
    let mut settings = enabled(Some("t"));
    settings.order_webhook_enabled = false;
    let webhooks = dispatcher(Some(settings), transport.clone()).await;

    assert_eq!(webhooks.order_created(&order()).await, DispatchOutcome::Skipped);
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn test_missing_settings_row_makes_no_call() {
    let transport = RecordingTransport::answering(200);
    let webhooks = dispatcher(None, transport.clone()).await;
    assert_eq!(webhooks.order_created(&order()).await, DispatchOutcome::Skipped);
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn test_blank_url_makes_no_call() {
    let transport = RecordingTransport::answering(200);
    let mut settings = enabled(None);
    settings.order_webhook_url = Some("   ".into());
    let webhooks = dispatcher(Some(settings), transport.clone()).await;
    assert_eq!(webhooks.order_created(&order()).await, DispatchOutcome::Skipped);
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn test_bearer_header_only_when_token_set() {
    let transport = RecordingTransport::answering(200);
    let webhooks = dispatcher(Some(enabled(None)), transport.clone()).await;
    webhooks.order_created(&order()).await;

    let with_token = RecordingTransport::answering(200);
    let webhooks = dispatcher(Some(enabled(Some("s3cret"))), with_token.clone()).await;
    webhooks.order_created(&order()).await;

    assert_eq!(transport.calls()[0].bearer, None);
    assert_eq!(with_token.calls()[0].bearer.as_deref(), Some("s3cret"));
}

#[tokio::test]
async fn test_order_created_payload() {
    let transport = RecordingTransport::answering(204);
    let webhooks = dispatcher(Some(enabled(None)), transport.clone()).await;
    let order = order();

    assert_eq!(webhooks.order_created(&order).await, DispatchOutcome::Delivered { status: 204 });
    let calls = transport.calls();
    let call = &calls[0];
    assert_eq!(call.url, "https://hooks.test/orders");
    assert_eq!(call.body["event"], "order_created");
    assert_eq!(call.body["orderId"], order.id.as_str());
    assert_eq!(call.body["customer"]["email"], "c@d.com");
    assert_eq!(call.body["items"][0]["quantity"], 2);
    assert_eq!(call.body["shipping"]["method"], "pickup");
}

#[tokio::test]
async fn test_rejection_is_reported_not_propagated() {
    let transport = RecordingTransport::answering(500);
    let webhooks = dispatcher(Some(enabled(None)), transport.clone()).await;
    assert!(matches!(webhooks.order_created(&order()).await, DispatchOutcome::Failed { .. }));
    assert_eq!(transport.calls().len(), 1);

    let unreachable = RecordingTransport::unreachable();
    let webhooks = dispatcher(Some(enabled(None)), unreachable.clone()).await;
    assert!(matches!(webhooks.order_created(&order()).await, DispatchOutcome::Failed { .. }));
    assert_eq!(unreachable.calls().len(), 1);
}

#[tokio::test]
async fn test_settings_are_read_on_every_dispatch() {
    let transport = RecordingTransport::answering(200);
    let store = Store::in_memory();
    let webhooks = WebhookDispatcher::new(store.clone(), transport.clone());

    webhooks.order_created(&order()).await;
    store.save(&enabled(None)).await.unwrap();
    webhooks.order_created(&order()).await;

    assert_eq!(transport.calls().len(), 1);
}

#[tokio::test]
async fn test_abandoned_cart_flow() {
    let app = TestApp::with(FakeGateway::new(), RecordingTransport::answering(500));
    app.save_settings(enabled(Some("tok"))).await;
    app.state
        .carts()
        .sync(
            "cart-7",
            CartSync {
                items: vec![item("p1", "Vela", dec!(1250), 1)],
                total: dec!(1250),
                user_id: None,
                customer_email: Some("c@d.com".into()),
                customer_phone: Some("+54911".into()),
            },
        )
        .await
        .unwrap();

    let (cart, outcome) = app.state.carts().mark_abandoned("cart-7").await.unwrap();
    assert!(matches!(outcome, DispatchOutcome::Failed { .. }));
    assert_eq!(cart.status, CartStatus::Abandoned);

    let stored: Cart = app.store.get("cart-7").await.unwrap().unwrap();
    assert_eq!(stored.status, CartStatus::Abandoned);
    assert!(stored.abandoned_at.is_some());

    let calls = app.transport.calls();
    let call = &calls[0];
    assert_eq!(call.url, "https://hooks.test/carts");
    assert_eq!(call.bearer.as_deref(), Some("tok"));
    assert_eq!(call.body["event"], "abandoned_cart");
    assert_eq!(call.body["cartId"], "cart-7");
    assert_eq!(call.body["customer"]["phone"], "+54911");
}
