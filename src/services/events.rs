//! Domain-event publishing over NATS.

use crate::domain::events::DomainEvent;

/// Publishes domain events when a NATS connection is configured and does
/// nothing otherwise. Publish failures are logged, never returned.
#[derive(Clone, Default)]
pub struct EventBus {
    client: Option<async_nats::Client>,
}

impl EventBus {
    pub fn new(client: Option<async_nats::Client>) -> Self { Self { client } }

    pub fn disabled() -> Self { Self::default() }

    pub fn is_enabled(&self) -> bool { self.client.is_some() }

    pub async fn publish(&self, event: &DomainEvent) {
        let Some(client) = &self.client else { return };
        let payload = match serde_json::to_vec(event) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(kind = event.kind(), error = %e, "Could not encode domain event");
                return;
            }
        };
        if let Err(e) = client.publish(event.subject(), payload.into()).await {
            tracing::warn!(kind = event.kind(), error = %e, "Could not publish domain event");
        }
    }

    pub async fn publish_all(&self, events: Vec<DomainEvent>) {
        for event in &events {
            self.publish(event).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_disabled_bus_is_a_no_op() {
        let bus = EventBus::disabled();
        assert!(!bus.is_enabled());
        bus.publish(&DomainEvent::CartAbandoned { cart_id: "c1".into(), total: dec!(10) }).await;
    }

    #[test]
    fn test_event_subject_and_payload() {
        let event = DomainEvent::OrderPaid { order_id: "o1".into(), payment_id: "p1".into() };
        assert_eq!(event.subject(), "shop.events.order_paid");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "order_paid");
        assert_eq!(json["orderId"], "o1");
    }
}
