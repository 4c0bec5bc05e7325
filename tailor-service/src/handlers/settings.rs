//! HTTP handlers for the settings endpoints.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use service_core::error::AppError;
use validator::Validate;

use crate::dtos::{UpdateUpiRequest, UpiResponse};
use crate::models::UPI_KEY;
use crate::startup::AppState;

pub async fn get_upi(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let setting = state.store.get_setting(UPI_KEY).await?;
    let upi = setting.map(|s| s.value).unwrap_or_default();
    Ok(Json(UpiResponse { upi }))
}

pub async fn update_upi(
    State(state): State<AppState>,
    Json(req): Json<UpdateUpiRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let upi = req.upi.unwrap_or_default();
    state.store.upsert_setting(UPI_KEY, &upi).await?;

    tracing::info!("UPI payment address updated");
    Ok(Json(UpiResponse { upi }))
}
