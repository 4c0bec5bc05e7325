//! HTTP handlers for the bill endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use service_core::error::AppError;
use validator::Validate;

use crate::dtos::{
    BillListParams, BillListResponse, BillResponse, CreateBillRequest, Pagination,
    UpdateBillRequest,
};
use crate::services::store::BillFilter;
use crate::startup::AppState;

pub async fn create_bill(
    State(state): State<AppState>,
    Json(req): Json<CreateBillRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let bill = state.orders.create_bill(req.into_new_bill()).await?;

    tracing::info!(bill_id = %bill.id, bill_no = %bill.bill_no, "Bill created");
    Ok((StatusCode::CREATED, Json(BillResponse::from(bill))))
}

pub async fn list_bills(
    State(state): State<AppState>,
    Query(params): Query<BillListParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(10).clamp(1, 100);

    let filter = BillFilter {
        search: params.search.filter(|s| !s.is_empty()),
        ..BillFilter::default()
    };

    let result = state.orders.list_bills(&filter, page, limit).await?;
    let pages = (result.total as f64 / limit as f64).ceil() as u64;

    Ok(Json(BillListResponse {
        bills: result.bills.into_iter().map(BillResponse::from).collect(),
        pagination: Pagination {
            page,
            limit,
            total: result.total,
            pages,
        },
    }))
}

pub async fn get_bill(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let bill = state.orders.get_bill(&id).await?;
    Ok(Json(BillResponse::from(bill)))
}

pub async fn update_bill(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateBillRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let bill = state.orders.update_bill(&id, req.into_patch()).await?;
    Ok(Json(BillResponse::from(bill)))
}

pub async fn delete_bill(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.orders.delete_bill(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
