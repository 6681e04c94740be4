//! Cart Aggregate

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::store::Entity;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: String,
    #[serde(default)]
    pub items: Vec<CartItem>,
    pub total: Decimal,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub status: CartStatus,
    #[serde(default)]
    pub abandoned_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: String,
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Variant label to chosen value, e.g. `Size -> M`.
    #[serde(default)]
    pub selected_variants: BTreeMap<String, String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CartStatus {
    #[default]
    Active,
    Abandoned,
    Converted,
}

/// Who the cart belongs to, as far as the storefront knows.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartOwner {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl CartItem {
    pub fn line_total(&self) -> Decimal { self.price * Decimal::from(self.quantity) }

    /// Display title: the product name followed by the chosen variants,
    /// e.g. `Remera (Color: Rojo, Talle: M)`.
    pub fn title(&self) -> String {
        if self.selected_variants.is_empty() { return self.name.clone(); }
        let labels: Vec<String> = self.selected_variants.iter().map(|(label, value)| format!("{label}: {value}")).collect();
        format!("{} ({})", self.name, labels.join(", "))
    }
}

impl CartStatus {
    pub fn as_str(&self) -> &'static str {
        match self { Self::Active => "active", Self::Abandoned => "abandoned", Self::Converted => "converted" }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(Self::Active),
            "abandoned" => Some(Self::Abandoned),
            "converted" => Some(Self::Converted),
            _ => None,
        }
    }
}

impl Cart {
    pub fn new(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(), items: vec![], total: Decimal::ZERO, user_id: None, customer_email: None,
            customer_phone: None, status: CartStatus::Active, abandoned_at: None, created_at: now, updated_at: now,
        }
    }

    pub fn is_empty(&self) -> bool { self.items.is_empty() }

    /// Replaces the contents with what the storefront reports. Owner fields
    /// only overwrite when present so an anonymous sync does not erase a
    /// known email.
    pub fn sync(&mut self, items: Vec<CartItem>, total: Decimal, owner: CartOwner) {
        self.items = items;
        self.total = total;
        if owner.user_id.is_some() { self.user_id = owner.user_id; }
        if owner.email.is_some() { self.customer_email = owner.email; }
        if owner.phone.is_some() { self.customer_phone = owner.phone; }
        self.status = CartStatus::Active;
        self.abandoned_at = None;
        self.touch();
    }

    pub fn abandon(&mut self) -> Result<(), CartError> {
        if self.is_empty() { return Err(CartError::Empty); }
        if self.status == CartStatus::Converted { return Err(CartError::AlreadyConverted); }
        self.status = CartStatus::Abandoned;
        self.abandoned_at = Some(Utc::now());
        Ok(())
    }

    pub fn convert(&mut self) { self.status = CartStatus::Converted; self.touch(); }

    pub fn owner(&self) -> CartOwner {
        CartOwner { user_id: self.user_id.clone(), email: self.customer_email.clone(), phone: self.customer_phone.clone() }
    }

    fn touch(&mut self) { self.updated_at = Utc::now(); }
}

impl Entity for Cart {
    const COLLECTION: &'static str = "carts";
    const NAME: &'static str = "Cart";
    fn id(&self) -> &str { &self.id }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CartError {
    #[error("Cart is empty")]
    Empty,
    #[error("Cart was already checked out")]
    AlreadyConverted,
}
