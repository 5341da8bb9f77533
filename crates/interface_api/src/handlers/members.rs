//! Membership handlers

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use core_kernel::MemberId;

use crate::dto::member::{CreateMemberRequest, MemberResponse, UpdateMemberRequest};
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath};
use crate::AppState;

pub async fn create_member(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateMemberRequest>,
) -> Result<(StatusCode, Json<MemberResponse>), ApiError> {
    request.validate()?;
    let member = state.service.add_member(request.into()).await?;
    Ok((StatusCode::CREATED, Json(member.into())))
}

pub async fn list_members(
    State(state): State<AppState>,
) -> Result<Json<Vec<MemberResponse>>, ApiError> {
    let members = state.service.list_members().await?;
    Ok(Json(members.into_iter().map(MemberResponse::from).collect()))
}

pub async fn get_member(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<MemberId>,
) -> Result<Json<MemberResponse>, ApiError> {
    Ok(Json(state.service.get_member(id).await?.into()))
}

pub async fn update_member(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<MemberId>,
    ApiJson(request): ApiJson<UpdateMemberRequest>,
) -> Result<Json<MemberResponse>, ApiError> {
    request.validate()?;
    let member = state.service.update_member(id, request.into()).await?;
    Ok(Json(member.into()))
}

pub async fn delete_member(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<MemberId>,
) -> Result<StatusCode, ApiError> {
    state.service.delete_member(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
