//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ShopConfig;
use crate::services::{
    CartService, CatalogService, CheckoutService, CouponService, EventBus, NotificationService, OrderService,
    PaymentGateway, SettingsService, WebhookDispatcher, WebhookTransport,
};
use crate::store::Store;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. External collaborators (payment provider,
/// webhook transport) are injected so tests can substitute fakes.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Store,
    catalog: CatalogService,
    carts: CartService,
    coupons: CouponService,
    checkout: CheckoutService,
    notifications: NotificationService,
    orders: OrderService,
    settings: SettingsService,
}

impl AppState {
    pub fn new(
        config: ShopConfig,
        store: Store,
        gateway: Arc<dyn PaymentGateway>,
        transport: Arc<dyn WebhookTransport>,
        events: EventBus,
    ) -> Self {
        let config = Arc::new(config);
        let webhooks = WebhookDispatcher::new(store.clone(), transport);
        let carts = CartService::new(store.clone(), webhooks.clone(), events.clone());
        let checkout = CheckoutService::new(store.clone(), gateway.clone(), carts.clone(), events.clone(), config.clone());
        let notifications = NotificationService::new(store.clone(), gateway, webhooks, events, config);

        Self {
            inner: Arc::new(AppStateInner {
                catalog: CatalogService::new(store.clone()),
                coupons: CouponService::new(store.clone()),
                orders: OrderService::new(store.clone()),
                settings: SettingsService::new(store.clone()),
                carts,
                checkout,
                notifications,
                store,
            }),
        }
    }

    #[must_use]
    pub fn store(&self) -> &Store { &self.inner.store }

    pub fn catalog(&self) -> &CatalogService { &self.inner.catalog }

    pub fn carts(&self) -> &CartService { &self.inner.carts }

    pub fn coupons(&self) -> &CouponService { &self.inner.coupons }

    pub fn checkout(&self) -> &CheckoutService { &self.inner.checkout }

    pub fn notifications(&self) -> &NotificationService { &self.inner.notifications }

    pub fn orders(&self) -> &OrderService { &self.inner.orders }

    pub fn settings(&self) -> &SettingsService { &self.inner.settings }
}
