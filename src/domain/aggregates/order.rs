//! Order Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::aggregates::cart::CartItem;
use crate::domain::events::DomainEvent;
use crate::store::Entity;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub items: Vec<CartItem>,
    pub total: Decimal,
    pub status: OrderStatus,
    #[serde(default)]
    pub user_id: Option<String>,
    pub customer_email: String,
    #[serde(default)]
    pub customer_phone: Option<String>,
    pub shipping_method: String,
    #[serde(default)]
    pub shipping_address: Option<String>,
    #[serde(default)]
    pub shipping_fee: Decimal,
    #[serde(default)]
    pub payment_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    pub(crate) events: Vec<DomainEvent>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Buyer {
    #[serde(default)]
    pub user_id: Option<String>,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingSelection {
    pub method: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub fee: Decimal,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus { #[default] Pending, Paid, Shipped, Delivered, Cancelled }

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "paid" => Some(Self::Paid),
            "shipped" => Some(Self::Shipped),
            "delivered" => Some(Self::Delivered),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

impl Order {
    /// A new order awaiting payment.
    pub fn place(items: Vec<CartItem>, total: Decimal, buyer: Buyer, shipping: ShippingSelection) -> Self {
        let now = Utc::now();
        let mut order = Self {
            id: Uuid::now_v7().to_string(), items, total, status: OrderStatus::Pending,
            user_id: buyer.user_id, customer_email: buyer.email, customer_phone: buyer.phone,
            shipping_method: shipping.method, shipping_address: shipping.address, shipping_fee: shipping.fee,
            payment_id: None, created_at: now, updated_at: now, events: vec![],
        };
        order.raise_event(DomainEvent::OrderPlaced { order_id: order.id.clone(), total: order.total });
        order
    }

    pub fn buyer(&self) -> Buyer {
        Buyer { user_id: self.user_id.clone(), email: self.customer_email.clone(), phone: self.customer_phone.clone() }
    }

    pub fn shipping(&self) -> ShippingSelection {
        ShippingSelection { method: self.shipping_method.clone(), address: self.shipping_address.clone(), fee: self.shipping_fee }
    }

    pub fn is_pending(&self) -> bool { self.status == OrderStatus::Pending }

    /// Records an approved payment. Only pending orders can be paid.
    pub fn mark_paid(&mut self, payment_id: impl Into<String>) -> Result<(), OrderError> {
        if !self.is_pending() { return Err(OrderError::NotPending(self.status)); }
        let payment_id = payment_id.into();
        self.status = OrderStatus::Paid;
        self.payment_id = Some(payment_id.clone());
        self.touch();
        self.raise_event(DomainEvent::OrderPaid { order_id: self.id.clone(), payment_id });
        Ok(())
    }

    /// Merchant-driven status change from the back office.
    pub fn transition(&mut self, to: OrderStatus) -> Result<(), OrderError> {
        let allowed = match (self.status, to) {
            (from, to) if from == to => true,
            (OrderStatus::Cancelled, _) => false,
            (OrderStatus::Delivered, OrderStatus::Cancelled) => false,
            (_, OrderStatus::Pending) => false,
            _ => true,
        };
        if !allowed { return Err(OrderError::InvalidTransition { from: self.status, to }); }
        self.status = to;
        self.touch();
        Ok(())
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
    fn touch(&mut self) { self.updated_at = Utc::now(); }
}

impl Entity for Order {
    const COLLECTION: &'static str = "orders";
    const NAME: &'static str = "Order";
    fn id(&self) -> &str { &self.id }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderError {
    #[error("Order is {} and cannot be paid", .0.as_str())]
    NotPending(OrderStatus),
    #[error("Order cannot move from {} to {}", .from.as_str(), .to.as_str())]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
}
