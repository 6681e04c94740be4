use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use crate::api::{ApiJson, ApiResult};
use crate::domain::aggregates::Cart;
use crate::services::carts::CartSync;
use crate::services::DispatchOutcome;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/carts/:id", get(get_cart).put(sync_cart))
        .route("/api/carts/:id/abandoned", post(mark_abandoned))
}

async fn get_cart(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Cart>> {
    Ok(Json(state.carts().get(&id).await?))
}

async fn sync_cart(State(state): State<AppState>, Path(id): Path<String>, ApiJson(sync): ApiJson<CartSync>) -> ApiResult<Json<Cart>> {
    Ok(Json(state.carts().sync(&id, sync).await?))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AbandonedResponse {
    success: bool,
    cart: Cart,
    webhook: &'static str,
}

async fn mark_abandoned(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<AbandonedResponse>> {
    let (cart, outcome) = state.carts().mark_abandoned(&id).await?;
    let webhook = match outcome {
        DispatchOutcome::Skipped => "skipped",
        DispatchOutcome::Delivered { .. } => "delivered",
        DispatchOutcome::Failed { .. } => "failed",
    };
    Ok(Json(AbandonedResponse { success: true, cart, webhook }))
}
