use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::{
    dto::candidate_dto::{
        BulkCreateCandidatesPayload, BulkCreateResponse, CandidateListQuery,
        CandidateStatusPayload, CreateCandidatePayload,
    },
    error::Result,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/candidates",
    request_body = CreateCandidatePayload,
    responses(
        (status = 201, description = "Candidate added", body = Json<Candidate>),
        (status = 400, description = "Invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn create_candidate(
    State(state): State<AppState>,
    Json(payload): Json<CreateCandidatePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let candidate = state.candidate_service.create_candidate(payload).await?;
    Ok((StatusCode::CREATED, Json(candidate)))
}

#[utoipa::path(
    post,
    path = "/api/candidates/bulk",
    request_body = BulkCreateCandidatesPayload,
    responses(
        (status = 201, description = "Number of candidates created", body = Json<BulkCreateResponse>),
        (status = 400, description = "Invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn bulk_create_candidates(
    State(state): State<AppState>,
    Json(payload): Json<BulkCreateCandidatesPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let created = state
        .candidate_service
        .bulk_create_candidates(payload.candidates)
        .await?;
    Ok((StatusCode::CREATED, Json(BulkCreateResponse { created })))
}

#[utoipa::path(
    get,
    path = "/api/candidates",
    params(
        ("requirement_id" = Option<String>, Query, description = "Requirement ID")
    ),
    responses(
        (status = 200, description = "Candidates, newest first", body = Json<Vec<Candidate>>)
    )
)]
#[axum::debug_handler]
pub async fn list_candidates(
    State(state): State<AppState>,
    Query(query): Query<CandidateListQuery>,
) -> Result<impl IntoResponse> {
    let requirement_id = query.requirement_id.as_deref().filter(|s| !s.is_empty());
    let candidates = state.candidate_service.list_candidates(requirement_id).await?;
    Ok(Json(candidates))
}

#[utoipa::path(
    get,
    path = "/api/candidates/{id}",
    params(
        ("id" = String, Path, description = "Candidate ID")
    ),
    responses(
        (status = 200, description = "Candidate", body = Json<Candidate>),
        (status = 404, description = "Candidate not found")
    )
)]
#[axum::debug_handler]
pub async fn get_candidate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let candidate = state.candidate_service.get_candidate(&id).await?;
    Ok(Json(candidate))
}

#[utoipa::path(
    post,
    path = "/api/candidates/{id}/status",
    params(
        ("id" = String, Path, description = "Candidate ID")
    ),
    request_body = CandidateStatusPayload,
    responses(
        (status = 200, description = "Candidate status updated", body = Json<Candidate>),
        (status = 404, description = "Candidate not found")
    )
)]
#[axum::debug_handler]
pub async fn update_candidate_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<CandidateStatusPayload>,
) -> Result<impl IntoResponse> {
    let candidate = state
        .candidate_service
        .update_candidate_status(&id, payload.status)
        .await?;
    Ok(Json(candidate))
}
