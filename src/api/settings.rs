use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::{ApiJson, ApiResult};
use crate::services::settings::{SettingsUpdate, SettingsView};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/settings/integrations", get(get_settings).put(update_settings))
}

async fn get_settings(State(state): State<AppState>) -> ApiResult<Json<SettingsView>> {
    let settings = state.settings().load().await?;
    Ok(Json(SettingsView::from(&settings)))
}

async fn update_settings(State(state): State<AppState>, ApiJson(update): ApiJson<SettingsUpdate>) -> ApiResult<Json<SettingsView>> {
    let settings = state.settings().update(update).await?;
    Ok(Json(SettingsView::from(&settings)))
}
