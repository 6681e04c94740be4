//! Domain events
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DomainEvent {
    #[serde(rename_all = "camelCase")]
    OrderPlaced { order_id: String, total: Decimal },
    #[serde(rename_all = "camelCase")]
    OrderPaid { order_id: String, payment_id: String },
    #[serde(rename_all = "camelCase")]
    CartAbandoned { cart_id: String, total: Decimal },
}

impl DomainEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::OrderPlaced { .. } => "order_placed",
            Self::OrderPaid { .. } => "order_paid",
            Self::CartAbandoned { .. } => "cart_abandoned",
        }
    }

    /// NATS subject the event is published on.
    pub fn subject(&self) -> String { format!("shop.events.{}", self.kind()) }
}
