//! HTTP handlers for the workflow endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use service_core::error::AppError;
use validator::Validate;

use crate::dtos::{
    CreateJobRequest, JobListParams, JobListResponse, JobResponse, JobWithBillResponse,
    StageOverrideRequest, UpdateJobRequest,
};
use crate::startup::AppState;

pub async fn create_job(
    State(state): State<AppState>,
    Json(req): Json<CreateJobRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let job = state.orders.create_job(req.into_new_job()).await?;
    Ok((StatusCode::CREATED, Json(JobResponse::from(job))))
}

pub async fn list_jobs(
    State(state): State<AppState>,
    Query(params): Query<JobListParams>,
) -> Result<impl IntoResponse, AppError> {
    let jobs = state.orders.list_jobs_with_bills(params.stage).await?;

    Ok(Json(JobListResponse {
        workflows: jobs.into_iter().map(JobWithBillResponse::from).collect(),
    }))
}

pub async fn update_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateJobRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let job = state.orders.update_job(&id, req.into_patch()).await?;
    Ok(Json(JobResponse::from(job)))
}

pub async fn mark_completed(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let job = state.orders.mark_job_completed(&id).await?;
    Ok(Json(JobResponse::from(job)))
}

pub async fn advance_stage(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let job = state.orders.advance_stage(&id).await?;
    Ok(Json(JobResponse::from(job)))
}

pub async fn regress_stage(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let job = state.orders.regress_stage(&id).await?;
    Ok(Json(JobResponse::from(job)))
}

pub async fn override_stage(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<StageOverrideRequest>,
) -> Result<impl IntoResponse, AppError> {
    let job = state.orders.override_stage(&id, req.stage).await?;
    Ok(Json(JobResponse::from(job)))
}

pub async fn delete_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.orders.delete_job(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
