use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json},
};

use crate::{error::Result, AppState};

#[utoipa::path(
    get,
    path = "/api/dashboard/admin",
    responses(
        (status = 200, description = "Counts across interviews, requirements and candidates", body = Json<AdminSummary>)
    )
)]
#[axum::debug_handler]
pub async fn admin_summary(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let summary = state.dashboard_service.admin_summary().await?;
    Ok(Json(summary))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/interviewers/{id}",
    params(
        ("id" = String, Path, description = "Interviewer ID")
    ),
    responses(
        (status = 200, description = "Interview counts and average rating", body = Json<InterviewerSummary>)
    )
)]
#[axum::debug_handler]
pub async fn interviewer_summary(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let summary = state.dashboard_service.interviewer_summary(&id).await?;
    Ok(Json(summary))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/requirements/{id}",
    params(
        ("id" = String, Path, description = "Requirement ID")
    ),
    responses(
        (status = 200, description = "Candidate funnel and interview counts", body = Json<RequirementSummary>),
        (status = 404, description = "Requirement not found")
    )
)]
#[axum::debug_handler]
pub async fn requirement_summary(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let summary = state.dashboard_service.requirement_summary(&id).await?;
    Ok(Json(summary))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/organizations/{id}",
    params(
        ("id" = String, Path, description = "Company ID")
    ),
    responses(
        (status = 200, description = "Requirements, candidates, interviews and tickets of one company", body = Json<OrganizationSummary>)
    )
)]
#[axum::debug_handler]
pub async fn organization_summary(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let summary = state.dashboard_service.organization_summary(&id).await?;
    Ok(Json(summary))
}
