//! Aggregates module
pub mod product;
pub mod taxonomy;
pub mod promotion;
pub mod shipping;
pub mod coupon;
pub mod cart;
pub mod order;
pub mod settings;

pub use product::{Product, ProductFilter, VariantOption};
pub use taxonomy::{Brand, Category};
pub use promotion::Promotion;
pub use shipping::{ShippingQuote, ShippingRate};
pub use coupon::{Coupon, CouponError, DiscountType};
pub use cart::{Cart, CartError, CartItem, CartOwner, CartStatus};
pub use order::{Buyer, Order, OrderError, OrderStatus, ShippingSelection};
pub use settings::{IntegrationSettings, WebhookKind, GLOBAL_SETTINGS_ID};
