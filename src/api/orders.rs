use axum::extract::{Path, State};
use axum::routing::{get, put};
use axum::{Json, Router};

use crate::api::{ApiJson, ApiQuery, ApiResult};
use crate::domain::aggregates::Order;
use crate::services::orders::{OrderQuery, StatusUpdate};
use crate::services::PaginatedResponse;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/orders", get(list_orders))
        .route("/api/orders/:id", get(get_order))
        .route("/api/orders/:id/status", put(update_status))
}

async fn list_orders(State(state): State<AppState>, ApiQuery(query): ApiQuery<OrderQuery>) -> ApiResult<Json<PaginatedResponse<Order>>> {
    Ok(Json(state.orders().list(&query).await?))
}

async fn get_order(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Order>> {
    Ok(Json(state.orders().get(&id).await?))
}

async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<StatusUpdate>,
) -> ApiResult<Json<Order>> {
    Ok(Json(state.orders().update_status(&id, update.status).await?))
}
