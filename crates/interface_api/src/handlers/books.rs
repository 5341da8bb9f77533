//! Catalog handlers

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use core_kernel::BookId;

use crate::dto::book::{BookResponse, CreateBookRequest, UpdateBookRequest};
use crate::dto::loan::{BorrowRequest, LoanResponse};
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath};
use crate::AppState;

/// Adds a book to the catalog
pub async fn create_book(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateBookRequest>,
) -> Result<(StatusCode, Json<BookResponse>), ApiError> {
    request.validate()?;
    let book = state.service.add_book(request.into()).await?;
    Ok((StatusCode::CREATED, Json(book.into())))
}

pub async fn list_books(State(state): State<AppState>) -> Result<Json<Vec<BookResponse>>, ApiError> {
    let books = state.service.list_books().await?;
    Ok(Json(books.into_iter().map(BookResponse::from).collect()))
}

pub async fn get_book(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<BookId>,
) -> Result<Json<BookResponse>, ApiError> {
    Ok(Json(state.service.get_book(id).await?.into()))
}

pub async fn update_book(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<BookId>,
    ApiJson(request): ApiJson<UpdateBookRequest>,
) -> Result<Json<BookResponse>, ApiError> {
    request.validate()?;
    let book = state.service.update_book(id, request.into()).await?;
    Ok(Json(book.into()))
}

pub async fn delete_book(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<BookId>,
) -> Result<StatusCode, ApiError> {
    state.service.delete_book(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Lends one copy of the book to a member
pub async fn borrow_book(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<BookId>,
    ApiJson(request): ApiJson<BorrowRequest>,
) -> Result<(StatusCode, Json<LoanResponse>), ApiError> {
    let loan = state
        .service
        .borrow_book(id, request.member_id, request.due_days)
        .await?;
    Ok((StatusCode::CREATED, Json(state.service.view(loan).into())))
}
