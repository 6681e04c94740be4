//! Cart sync from the storefront and the abandoned-cart trigger.

use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

use crate::domain::aggregates::{Cart, CartItem, CartOwner};
use crate::domain::events::DomainEvent;
use crate::services::{DispatchOutcome, EventBus, WebhookDispatcher};
use crate::store::{Repository, Store};
use crate::{Result, ShopError};

/// What the storefront reports about a cart after every change.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CartSync {
    #[serde(default)]
    pub items: Vec<CartItem>,
    pub total: Decimal,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    #[validate(email)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
}

impl CartSync {
    fn owner(&self) -> CartOwner {
        CartOwner { user_id: self.user_id.clone(), email: self.customer_email.clone(), phone: self.customer_phone.clone() }
    }
}

#[derive(Clone)]
pub struct CartService {
    store: Store,
    webhooks: WebhookDispatcher,
    events: EventBus,
}

impl CartService {
    pub fn new(store: Store, webhooks: WebhookDispatcher, events: EventBus) -> Self { Self { store, webhooks, events } }

    pub async fn get(&self, cart_id: &str) -> Result<Cart> {
        Repository::<Cart>::get(&self.store, cart_id).await?.ok_or_else(|| ShopError::not_found("Cart", cart_id))
    }

    /// Upserts the cart by id. Repeated syncs keep a single row and the
    /// original `createdAt`.
    #[tracing::instrument(skip(self, sync), fields(items = sync.items.len()))]
    pub async fn sync(&self, cart_id: &str, sync: CartSync) -> Result<Cart> {
        sync.validate()?;
        if cart_id.trim().is_empty() {
            return Err(ShopError::Validation("Cart id is required".to_string()));
        }
        if sync.items.iter().any(|i| i.quantity == 0) {
            return Err(ShopError::Validation("Item quantity must be at least 1".to_string()));
        }

        let mut cart = Repository::<Cart>::get(&self.store, cart_id).await?.unwrap_or_else(|| Cart::new(cart_id));
        let owner = sync.owner();
        cart.sync(sync.items, sync.total, owner);
        self.store.save(&cart).await?;
        Ok(cart)
    }

    /// Marks the cart abandoned and notifies the abandoned-cart automation.
    /// An external scheduler decides when a cart is idle enough to call this.
    #[tracing::instrument(skip(self))]
    pub async fn mark_abandoned(&self, cart_id: &str) -> Result<(Cart, DispatchOutcome)> {
        let mut cart = self.get(cart_id).await?;
        cart.abandon()?;
        self.store.save(&cart).await?;
        tracing::info!(total = %cart.total, "Cart marked abandoned");

        let outcome = self.webhooks.abandoned_cart(&cart).await;
        self.events.publish(&DomainEvent::CartAbandoned { cart_id: cart.id.clone(), total: cart.total }).await;
        Ok((cart, outcome))
    }

    /// Best-effort conversion after checkout. Failures are logged only.
    pub async fn convert(&self, cart_id: &str) {
        let result = async {
            let mut cart = self.get(cart_id).await?;
            cart.convert();
            self.store.save(&cart).await?;
            Ok::<_, ShopError>(())
        }
        .await;
        if let Err(e) = result {
            tracing::warn!(cart_id, error = %e, "Could not mark cart converted");
        }
    }
}
