use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::{dto::interviewer_dto::CreateInterviewerPayload, error::Result, AppState};

#[utoipa::path(
    post,
    path = "/api/interviewers",
    request_body = CreateInterviewerPayload,
    responses(
        (status = 201, description = "Interviewer added", body = Json<Interviewer>),
        (status = 400, description = "Invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn create_interviewer(
    State(state): State<AppState>,
    Json(payload): Json<CreateInterviewerPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let interviewer = state.interviewer_service.create_interviewer(payload).await?;
    Ok((StatusCode::CREATED, Json(interviewer)))
}

#[utoipa::path(
    get,
    path = "/api/interviewers",
    responses(
        (status = 200, description = "Interviewers by name; empty when the store is unavailable", body = Json<Vec<Interviewer>>)
    )
)]
#[axum::debug_handler]
pub async fn list_interviewers(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let interviewers = state.interviewer_service.list_interviewers().await?;
    Ok(Json(interviewers))
}

#[utoipa::path(
    get,
    path = "/api/interviewers/{id}",
    params(
        ("id" = String, Path, description = "Interviewer ID")
    ),
    responses(
        (status = 200, description = "Interviewer", body = Json<Interviewer>),
        (status = 404, description = "Interviewer not found")
    )
)]
#[axum::debug_handler]
pub async fn get_interviewer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let interviewer = state.interviewer_service.get_interviewer(&id).await?;
    Ok(Json(interviewer))
}
