//! HTTP handler for the dashboard endpoint.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use service_core::error::AppError;

use crate::dtos::DashboardResponse;
use crate::startup::AppState;

pub async fn dashboard_summary(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let summary = state.stats.collect().await?;
    Ok(Json(DashboardResponse::from(summary)))
}
