use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::{
    dto::requirement_dto::{
        CreateRequirementPayload, RequirementListQuery, RequirementStatusPayload,
        UpdateRequirementPayload,
    },
    error::Result,
    models::session::SessionContext,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/requirements",
    request_body = CreateRequirementPayload,
    responses(
        (status = 201, description = "Requirement created", body = Json<Requirement>),
        (status = 400, description = "Invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn create_requirement(
    State(state): State<AppState>,
    ctx: SessionContext,
    Json(payload): Json<CreateRequirementPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let requirement = state
        .requirement_service
        .create_requirement(&ctx, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(requirement)))
}

#[utoipa::path(
    get,
    path = "/api/requirements",
    params(
        ("status" = Option<String>, Query, description = "Requirement status")
    ),
    responses(
        (status = 200, description = "Requirements, newest first", body = Json<Vec<Requirement>>)
    )
)]
#[axum::debug_handler]
pub async fn list_requirements(
    State(state): State<AppState>,
    Query(query): Query<RequirementListQuery>,
) -> Result<impl IntoResponse> {
    let requirements = state
        .requirement_service
        .list_requirements(query.status()?)
        .await?;
    Ok(Json(requirements))
}

#[utoipa::path(
    get,
    path = "/api/requirements/{id}",
    params(
        ("id" = String, Path, description = "Requirement ID")
    ),
    responses(
        (status = 200, description = "Requirement", body = Json<Requirement>),
        (status = 404, description = "Requirement not found")
    )
)]
#[axum::debug_handler]
pub async fn get_requirement(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let requirement = state.requirement_service.get_requirement(&id).await?;
    Ok(Json(requirement))
}

#[utoipa::path(
    patch,
    path = "/api/requirements/{id}",
    params(
        ("id" = String, Path, description = "Requirement ID")
    ),
    request_body = UpdateRequirementPayload,
    responses(
        (status = 200, description = "Requirement updated", body = Json<Requirement>),
        (status = 404, description = "Requirement not found")
    )
)]
#[axum::debug_handler]
pub async fn update_requirement(
    State(state): State<AppState>,
    ctx: SessionContext,
    Path(id): Path<String>,
    Json(payload): Json<UpdateRequirementPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let requirement = state
        .requirement_service
        .update_requirement(&ctx, &id, payload.into())
        .await?;
    Ok(Json(requirement))
}

#[utoipa::path(
    post,
    path = "/api/requirements/{id}/status",
    params(
        ("id" = String, Path, description = "Requirement ID")
    ),
    request_body = RequirementStatusPayload,
    responses(
        (status = 200, description = "Status changed", body = Json<Requirement>),
        (status = 409, description = "Transition not allowed")
    )
)]
#[axum::debug_handler]
pub async fn update_requirement_status(
    State(state): State<AppState>,
    ctx: SessionContext,
    Path(id): Path<String>,
    Json(payload): Json<RequirementStatusPayload>,
) -> Result<impl IntoResponse> {
    let requirement = state
        .requirement_service
        .update_requirement_status(&ctx, &id, payload.status)
        .await?;
    Ok(Json(requirement))
}

#[utoipa::path(
    post,
    path = "/api/requirements/{id}/close",
    params(
        ("id" = String, Path, description = "Requirement ID")
    ),
    request_body = RequirementStatusPayload,
    responses(
        (status = 200, description = "Requirement closed", body = Json<Requirement>),
        (status = 400, description = "Status is not Fulfilled or Canceled"),
        (status = 409, description = "Transition not allowed")
    )
)]
#[axum::debug_handler]
pub async fn close_requirement(
    State(state): State<AppState>,
    ctx: SessionContext,
    Path(id): Path<String>,
    Json(payload): Json<RequirementStatusPayload>,
) -> Result<impl IntoResponse> {
    let requirement = state
        .requirement_service
        .close_requirement(&ctx, &id, payload.status)
        .await?;
    Ok(Json(requirement))
}

#[utoipa::path(
    get,
    path = "/api/requirements/{id}/candidates",
    params(
        ("id" = String, Path, description = "Requirement ID")
    ),
    responses(
        (status = 200, description = "Candidates for the requirement, newest first", body = Json<Vec<Candidate>>)
    )
)]
#[axum::debug_handler]
pub async fn list_requirement_candidates(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let candidates = state.candidate_service.list_candidates(Some(&id)).await?;
    Ok(Json(candidates))
}
