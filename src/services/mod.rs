//! Application services. Handlers call into these; they own the
//! orchestration between the store and the external collaborators.

pub mod carts;
pub mod catalog;
pub mod checkout;
pub mod coupons;
pub mod events;
pub mod notifications;
pub mod orders;
pub mod payments;
pub mod settings;
pub mod webhooks;

use serde::{Deserialize, Serialize};

pub use carts::CartService;
pub use catalog::CatalogService;
pub use checkout::{CheckoutRequest, CheckoutService, CheckoutSession};
pub use coupons::CouponService;
pub use events::EventBus;
pub use notifications::NotificationService;
pub use orders::OrderService;
pub use payments::{MercadoPagoClient, PaymentGateway};
pub use settings::SettingsService;
pub use webhooks::{DispatchOutcome, HttpTransport, WebhookDispatcher, WebhookTransport};

pub const DEFAULT_PER_PAGE: u32 = 20;
pub const MAX_PER_PAGE: u32 = 100;

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Pagination {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl Pagination {
    pub fn page(&self) -> u32 { self.page.unwrap_or(1).max(1) }

    pub fn per_page(&self) -> u32 { self.per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE) }

    /// Cuts one page out of an already filtered and ordered list.
    pub fn apply<T>(&self, items: Vec<T>) -> PaginatedResponse<T> {
        let (page, per_page) = (self.page(), self.per_page());
        let total = items.len();
        let skip = (page as usize - 1).saturating_mul(per_page as usize);
        let data = items.into_iter().skip(skip).take(per_page as usize).collect();
        PaginatedResponse { data, total, page, per_page }
    }
}

#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub total: usize,
    pub page: u32,
    pub per_page: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_bounds() {
        let p = Pagination { page: Some(0), per_page: Some(500) };
        assert_eq!(p.page(), 1);
        assert_eq!(p.per_page(), MAX_PER_PAGE);
        assert_eq!(Pagination::default().per_page(), DEFAULT_PER_PAGE);
    }

    #[test]
    fn test_pagination_slices() {
        let p = Pagination { page: Some(2), per_page: Some(2) };
        let page = p.apply((1..=5).collect::<Vec<_>>());
        assert_eq!(page.data, vec![3, 4]);
        assert_eq!(page.total, 5);

        let past_end = Pagination { page: Some(9), per_page: Some(2) }.apply(vec![1, 2]);
        assert!(past_end.data.is_empty());
    }
}
