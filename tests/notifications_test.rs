mod common;

use rust_decimal_macros::dec;
use serde_json::json;

use common::{item, FakeGateway, RecordingTransport, TestApp};
use shopfront::domain::aggregates::{Buyer, IntegrationSettings, Order, OrderStatus, ShippingSelection};
use shopfront::services::notifications::{NotificationOutcome, PaymentNotification};
use shopfront::services::payments::PaymentError;
use shopfront::services::DispatchOutcome;
use shopfront::{Repository, ShopError};

async fn pending_order(app: &TestApp) -> Order {
    let order = Order::place(
        vec![item("p1", "Mate", dec!(4000), 1)],
        dec!(4000),
        Buyer { email: "c@d.com".into(), phone: None, user_id: None },
        ShippingSelection { method: "pickup".into(), address: None, fee: dec!(0) },
    );
    app.store.save(&order).await.unwrap();
    order
}

fn notification(payment_id: &str) -> PaymentNotification {
    serde_json::from_value(json!({ "type": "payment", "data": { "id": payment_id } })).unwrap()
}

fn webhook_app() -> TestApp {
    TestApp::with(FakeGateway::new(), RecordingTransport::answering(200))
}

async fn enable_order_webhook(app: &TestApp) {
    app.save_settings(IntegrationSettings {
        order_webhook_url: Some("https://hooks.test/orders".into()),
        order_webhook_enabled: true,
        ..Default::default()
    })
    .await;
}

#[tokio::test]
async fn test_approved_payment_marks_order_paid() {
    let app = webhook_app();
    enable_order_webhook(&app).await;
    let order = pending_order(&app).await;
    app.gateway.add_payment("pay-1", "approved", &order.id);

    let outcome = app.state.notifications().handle(&notification("pay-1")).await.unwrap();
    assert_eq!(
        outcome,
        NotificationOutcome::Paid { order_id: order.id.clone(), webhook: DispatchOutcome::Delivered { status: 200 } }
    );

    let stored: Order = app.store.get(&order.id).await.unwrap().unwrap();
    assert_eq!(stored.status, OrderStatus::Paid);
    assert_eq!(stored.payment_id.as_deref(), Some("pay-1"));

    let calls = app.transport.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].body["event"], "order_created");
    assert_eq!(calls[0].body["orderId"], order.id.as_str());
}

#[tokio::test]
async fn test_repeat_notification_has_no_side_effects() {
    let app = webhook_app();
    enable_order_webhook(&app).await;
    let order = pending_order(&app).await;
    app.gateway.add_payment("pay-1", "approved", &order.id);

    app.state.notifications().handle(&notification("pay-1")).await.unwrap();
    let repeat = app.state.notifications().handle(&notification("pay-1")).await.unwrap();

    assert_eq!(repeat, NotificationOutcome::AlreadyProcessed { order_id: order.id });
    assert_eq!(app.transport.calls().len(), 1);
}

#[tokio::test]
async fn test_pending_payment_leaves_order_pending() {
    let app = webhook_app();
    enable_order_webhook(&app).await;
    let order = pending_order(&app).await;
    app.gateway.add_payment("pay-2", "in_process", &order.id);

    let outcome = app.state.notifications().handle(&notification("pay-2")).await.unwrap();
    assert_eq!(outcome, NotificationOutcome::NotApproved { status: "in_process".into() });

    let stored: Order = app.store.get(&order.id).await.unwrap().unwrap();
    assert_eq!(stored.status, OrderStatus::Pending);
    assert!(app.transport.calls().is_empty());
}

#[tokio::test]
async fn test_approved_payment_for_unknown_order() {
    let app = webhook_app();
    app.gateway.add_payment("pay-3", "approved", "no-such-order");
    let outcome = app.state.notifications().handle(&notification("pay-3")).await.unwrap();
    assert_eq!(outcome, NotificationOutcome::UnknownOrder);
}

#[tokio::test]
async fn test_non_payment_notification_is_ignored() {
    let app = webhook_app();
    let merchant_order: PaymentNotification =
        serde_json::from_value(json!({ "type": "merchant_order", "data": { "id": "9" } })).unwrap();
    let outcome = app.state.notifications().handle(&merchant_order).await.unwrap();
    assert_eq!(outcome, NotificationOutcome::Ignored);
}

#[tokio::test]
async fn test_unknown_payment_is_a_provider_error() {
    let app = webhook_app();
    let result = app.state.notifications().handle(&notification("missing")).await;
    assert!(matches!(result, Err(ShopError::Payment(PaymentError::Api { status: 404, .. }))));
}
