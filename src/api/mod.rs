//! HTTP API.
//!
//! ```text
//! GET  /health                          - Liveness
//! GET  /ready                           - Storage readiness
//! *    /api/products[/:id]              - Products (storefront listing + CRUD)
//! *    /api/categories[/:id]            - Categories
//! *    /api/brands[/:id]                - Brands
//! *    /api/promotions[/:id]            - Homepage banners
//! GET  /api/promotions/active           - Carousel
//! *    /api/shipping-rates[/:id]        - Shipping rates
//! GET  /api/shipping/quote              - Fees for a subtotal
//! *    /api/coupons[/:id]               - Coupons
//! POST /api/coupons/{validate,redeem}   - Coupon checks
//! GET  /api/carts/:id                   - Cart
//! PUT  /api/carts/:id                   - Cart sync
//! POST /api/carts/:id/abandoned         - Abandoned-cart trigger
//! POST /api/checkout                    - Checkout
//! GET  /api/orders[/:id]                - Orders
//! PUT  /api/orders/:id/status           - Order status
//! POST /api/payments/notifications      - Payment provider notifications
//! GET  /api/settings/integrations       - Integration settings (redacted)
//! PUT  /api/settings/integrations       - Update integration settings
//! ```

use axum::extract::{FromRequest, FromRequestParts, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub mod carts;
pub mod catalog;
pub mod checkout;
pub mod error;
pub mod orders;
pub mod settings;

pub use error::{ApiResult, AppError};

/// JSON body extractor answering malformed bodies with the API error shape.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Query string extractor answering bad parameters with the API error shape.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(readiness))
        .merge(catalog::routes())
        .merge(carts::routes())
        .merge(checkout::routes())
        .merge(orders::routes())
        .merge(settings::routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy", "service": "shopfront" }))
}

async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let backend = state.store().backend_name();
    match state.store().ping().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ready", "backend": backend }))),
        Err(e) => {
            tracing::warn!(error = %e, backend, "Readiness check failed");
            (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "status": "unavailable", "backend": backend })))
        }
    }
}
