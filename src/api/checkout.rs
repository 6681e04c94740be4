use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::api::{ApiJson, ApiResult};
use crate::services::checkout::CheckoutRequest;
use crate::services::notifications::{NotificationOutcome, PaymentNotification};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/checkout", post(checkout))
        .route("/api/payments/notifications", post(payment_notification))
}

async fn checkout(State(state): State<AppState>, ApiJson(request): ApiJson<CheckoutRequest>) -> ApiResult<Json<Value>> {
    let session = state.checkout().checkout(request).await?;
    Ok(Json(json!({ "success": true, "orderId": session.order_id, "url": session.url })))
}

/// Answers 200 once processed, whatever the payment status. Provider and
/// storage failures answer with an error status.
async fn payment_notification(
    State(state): State<AppState>,
    ApiJson(notification): ApiJson<PaymentNotification>,
) -> ApiResult<Json<Value>> {
    let outcome = state.notifications().handle(&notification).await?;
    let result = match outcome {
        NotificationOutcome::Ignored => "ignored",
        NotificationOutcome::NotApproved { .. } => "not_approved",
        NotificationOutcome::UnknownOrder => "unknown_order",
        NotificationOutcome::AlreadyProcessed { .. } => "already_processed",
        NotificationOutcome::Paid { .. } => "paid",
    };
    Ok(Json(json!({ "success": true, "result": result })))
}
