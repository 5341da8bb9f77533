//! Loan handlers

use axum::{extract::State, Json};

use core_kernel::LoanId;

use crate::dto::loan::{LoanResponse, ReturnRequest};
use crate::error::ApiError;
use crate::extract::{ApiPath, OptionalJson};
use crate::AppState;

/// Lists all loans with status and the fine owed as of now
pub async fn list_loans(State(state): State<AppState>) -> Result<Json<Vec<LoanResponse>>, ApiError> {
    let loans = state.service.list_loans().await?;
    Ok(Json(loans.into_iter().map(LoanResponse::from).collect()))
}

pub async fn get_loan(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<LoanId>,
) -> Result<Json<LoanResponse>, ApiError> {
    Ok(Json(state.service.get_loan(id).await?.into()))
}

/// Closes a loan; the body is optional
pub async fn return_book(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<LoanId>,
    OptionalJson(request): OptionalJson<ReturnRequest>,
) -> Result<Json<LoanResponse>, ApiError> {
    let loan = state.service.return_book(id, request.fine_per_day).await?;
    Ok(Json(state.service.view(loan).into()))
}
