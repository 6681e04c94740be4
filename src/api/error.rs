//! HTTP error responses.
//!
//! Every failure is answered with `{"success": false, "message": "..."}`.
//! Storage details stay in the logs.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::services::payments::PaymentError;
use crate::ShopError;

#[derive(Debug)]
pub struct AppError(pub ShopError);

impl<E: Into<ShopError>> From<E> for AppError {
    fn from(err: E) -> Self { Self(err.into()) }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ShopError::NotFound { .. } => StatusCode::NOT_FOUND,
            ShopError::Validation(_) | ShopError::Coupon(_) | ShopError::Cart(_) | ShopError::Order(_) => {
                StatusCode::BAD_REQUEST
            }
            ShopError::Payment(PaymentError::MissingCredentials) => StatusCode::SERVICE_UNAVAILABLE,
            ShopError::Payment(_) => StatusCode::BAD_GATEWAY,
            ShopError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match &self.0 {
            ShopError::Store(_) => "Internal server error".to_string(),
            ShopError::Payment(PaymentError::MissingCredentials) => "Payments are not configured".to_string(),
            ShopError::Payment(_) => "Payment provider error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request error");
        }
        (status, Json(json!({ "success": false, "message": self.message() }))).into_response()
    }
}

impl From<JsonRejection> for ShopError {
    fn from(rejection: JsonRejection) -> Self { Self::Validation(rejection.body_text()) }
}

impl From<QueryRejection> for ShopError {
    fn from(rejection: QueryRejection) -> Self { Self::Validation(rejection.body_text()) }
}

pub type ApiResult<T> = std::result::Result<T, AppError>;
