//! Back-office order management.

use serde::Deserialize;

use crate::domain::aggregates::{Order, OrderStatus};
use crate::services::{PaginatedResponse, Pagination};
use crate::store::{Repository, Store};
use crate::{Result, ShopError};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderQuery {
    pub status: Option<OrderStatus>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdate {
    pub status: OrderStatus,
}

#[derive(Clone)]
pub struct OrderService {
    store: Store,
}

impl OrderService {
    pub fn new(store: Store) -> Self { Self { store } }

    /// Newest orders first.
    pub async fn list(&self, query: &OrderQuery) -> Result<PaginatedResponse<Order>> {
        let mut orders: Vec<Order> = Repository::<Order>::list(&self.store).await?;
        if let Some(status) = query.status {
            orders.retain(|o| o.status == status);
        }
        orders.reverse();
        Ok(Pagination { page: query.page, per_page: query.per_page }.apply(orders))
    }

    pub async fn get(&self, order_id: &str) -> Result<Order> {
        Repository::<Order>::get(&self.store, order_id).await?.ok_or_else(|| ShopError::not_found("Order", order_id))
    }

    #[tracing::instrument(skip(self))]
    pub async fn update_status(&self, order_id: &str, status: OrderStatus) -> Result<Order> {
        let mut order = self.get(order_id).await?;
        let from = order.status;
        order.transition(status)?;
        self.store.save(&order).await?;
        tracing::info!(from = from.as_str(), to = status.as_str(), "Order status changed");
        Ok(order)
    }
}
