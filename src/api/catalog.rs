//! Catalog routes. Every collection gets the same list/create and
//! read/update/delete pair; products add filtering and pagination.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::api::{ApiJson, ApiQuery, ApiResult};
use crate::domain::aggregates::{Brand, Category, Coupon, Product, Promotion, ShippingQuote, ShippingRate};
use crate::services::catalog::{
    BrandInput, CatalogInput, CategoryInput, CouponInput, ProductInput, ProductQuery, PromotionInput,
    ShippingRateInput,
};
use crate::services::coupons::{CouponCheck, CouponDiscount};
use crate::services::PaginatedResponse;
use crate::state::AppState;
use crate::store::PgTable;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(list_products).post(create::<Product, ProductInput>))
        .route("/api/products/:id", get(read::<Product>).put(update::<Product, ProductInput>).delete(remove::<Product>))
        .route("/api/categories", get(list::<Category>).post(create::<Category, CategoryInput>))
        .route("/api/categories/:id", get(read::<Category>).put(update::<Category, CategoryInput>).delete(remove::<Category>))
        .route("/api/brands", get(list::<Brand>).post(create::<Brand, BrandInput>))
        .route("/api/brands/:id", get(read::<Brand>).put(update::<Brand, BrandInput>).delete(remove::<Brand>))
        .route("/api/promotions", get(list::<Promotion>).post(create::<Promotion, PromotionInput>))
        .route("/api/promotions/active", get(active_promotions))
        .route("/api/promotions/:id", get(read::<Promotion>).put(update::<Promotion, PromotionInput>).delete(remove::<Promotion>))
        .route("/api/shipping-rates", get(list::<ShippingRate>).post(create::<ShippingRate, ShippingRateInput>))
        .route(
            "/api/shipping-rates/:id",
            get(read::<ShippingRate>).put(update::<ShippingRate, ShippingRateInput>).delete(remove::<ShippingRate>),
        )
        .route("/api/shipping/quote", get(shipping_quote))
        .route("/api/coupons", get(list::<Coupon>).post(create::<Coupon, CouponInput>))
        .route("/api/coupons/validate", post(validate_coupon))
        .route("/api/coupons/redeem", post(redeem_coupon))
        .route("/api/coupons/:id", get(read::<Coupon>).put(update::<Coupon, CouponInput>).delete(remove::<Coupon>))
}

async fn list<T: PgTable>(State(state): State<AppState>) -> ApiResult<Json<Vec<T>>> {
    Ok(Json(state.catalog().list::<T>().await?))
}

async fn read<T: PgTable>(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<T>> {
    Ok(Json(state.catalog().get::<T>(&id).await?))
}

async fn create<T, I>(State(state): State<AppState>, ApiJson(input): ApiJson<I>) -> ApiResult<(StatusCode, Json<T>)>
where
    T: PgTable,
    I: CatalogInput<T> + DeserializeOwned + 'static,
{
    let entity = state.catalog().create::<T, I>(input).await?;
    Ok((StatusCode::CREATED, Json(entity)))
}

async fn update<T, I>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<I>,
) -> ApiResult<Json<T>>
where
    T: PgTable,
    I: CatalogInput<T> + DeserializeOwned + 'static,
{
    Ok(Json(state.catalog().update::<T, I>(&id, input).await?))
}

async fn remove<T: PgTable>(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    state.catalog().delete::<T>(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_products(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ProductQuery>,
) -> ApiResult<Json<PaginatedResponse<Product>>> {
    Ok(Json(state.catalog().products(&query).await?))
}

async fn active_promotions(State(state): State<AppState>) -> ApiResult<Json<Vec<Promotion>>> {
    Ok(Json(state.catalog().active_promotions().await?))
}

#[derive(Debug, Deserialize)]
struct QuoteParams {
    subtotal: Decimal,
}

async fn shipping_quote(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<QuoteParams>,
) -> ApiResult<Json<Vec<ShippingQuote>>> {
    Ok(Json(state.catalog().shipping_quote(params.subtotal).await?))
}

async fn validate_coupon(State(state): State<AppState>, ApiJson(check): ApiJson<CouponCheck>) -> ApiResult<Json<CouponDiscount>> {
    Ok(Json(state.coupons().validate(&check).await?))
}

async fn redeem_coupon(State(state): State<AppState>, ApiJson(check): ApiJson<CouponCheck>) -> ApiResult<Json<CouponDiscount>> {
    Ok(Json(state.coupons().redeem(&check).await?))
}
