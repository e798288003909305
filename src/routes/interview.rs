use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::{
    dto::interview_dto::{
        FeedbackPayload, InterviewListQuery, RescheduleInterviewPayload,
        ScheduleInterviewPayload, UpdateInterviewStatusPayload,
    },
    error::Result,
    models::session::SessionContext,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/interviews",
    request_body = ScheduleInterviewPayload,
    responses(
        (status = 201, description = "Interview scheduled", body = Json<Interview>),
        (status = 400, description = "Invalid payload or date not in the future")
    )
)]
#[axum::debug_handler]
pub async fn schedule_interview(
    State(state): State<AppState>,
    ctx: SessionContext,
    Json(payload): Json<ScheduleInterviewPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let interview = state
        .interview_service
        .schedule_interview(&ctx, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(interview)))
}

#[utoipa::path(
    get,
    path = "/api/interviews",
    params(
        ("status" = Option<String>, Query, description = "Interview status"),
        ("interviewer_id" = Option<String>, Query, description = "Interviewer ID"),
        ("candidate_id" = Option<String>, Query, description = "Candidate ID"),
        ("requirement_id" = Option<String>, Query, description = "Requirement ID")
    ),
    responses(
        (status = 200, description = "Interviews ordered by date", body = Json<Vec<Interview>>),
        (status = 400, description = "Unknown status")
    )
)]
#[axum::debug_handler]
pub async fn list_interviews(
    State(state): State<AppState>,
    Query(query): Query<InterviewListQuery>,
) -> Result<impl IntoResponse> {
    let filter = query.into_filter()?;
    let interviews = state.interview_service.list_interviews(&filter).await?;
    Ok(Json(interviews))
}

#[utoipa::path(
    get,
    path = "/api/interviews/{id}",
    params(
        ("id" = String, Path, description = "Interview ID")
    ),
    responses(
        (status = 200, description = "Interview with related names", body = Json<InterviewDetails>),
        (status = 404, description = "Interview not found")
    )
)]
#[axum::debug_handler]
pub async fn get_interview(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let details = state.interview_service.get_interview(&id).await?;
    Ok(Json(details))
}

#[utoipa::path(
    patch,
    path = "/api/interviews/{id}/status",
    params(
        ("id" = String, Path, description = "Interview ID")
    ),
    request_body = UpdateInterviewStatusPayload,
    responses(
        (status = 200, description = "Status changed", body = Json<Interview>),
        (status = 404, description = "Interview not found"),
        (status = 409, description = "Transition not allowed from the current status")
    )
)]
#[axum::debug_handler]
pub async fn update_interview_status(
    State(state): State<AppState>,
    ctx: SessionContext,
    Path(id): Path<String>,
    Json(payload): Json<UpdateInterviewStatusPayload>,
) -> Result<impl IntoResponse> {
    let interview = state
        .interview_service
        .update_interview_status(&ctx, &id, payload.status)
        .await?;
    Ok(Json(interview))
}

#[utoipa::path(
    post,
    path = "/api/interviews/{id}/cancel",
    params(
        ("id" = String, Path, description = "Interview ID")
    ),
    responses(
        (status = 200, description = "Interview canceled", body = Json<Interview>),
        (status = 409, description = "Interview already completed")
    )
)]
#[axum::debug_handler]
pub async fn cancel_interview(
    State(state): State<AppState>,
    ctx: SessionContext,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let interview = state.interview_service.cancel_interview(&ctx, &id).await?;
    Ok(Json(interview))
}

#[utoipa::path(
    post,
    path = "/api/interviews/{id}/reschedule",
    params(
        ("id" = String, Path, description = "Interview ID")
    ),
    request_body = RescheduleInterviewPayload,
    responses(
        (status = 200, description = "Interview moved", body = Json<Interview>),
        (status = 400, description = "Date not in the future"),
        (status = 409, description = "Interview can no longer be rescheduled")
    )
)]
#[axum::debug_handler]
pub async fn reschedule_interview(
    State(state): State<AppState>,
    ctx: SessionContext,
    Path(id): Path<String>,
    Json(payload): Json<RescheduleInterviewPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let interview = state
        .interview_service
        .reschedule_interview(&ctx, &id, payload.scheduled_at)
        .await?;
    Ok(Json(interview))
}

#[utoipa::path(
    post,
    path = "/api/interviews/{id}/feedback",
    params(
        ("id" = String, Path, description = "Interview ID")
    ),
    request_body = FeedbackPayload,
    responses(
        (status = 200, description = "Interview completed with feedback", body = Json<Interview>),
        (status = 400, description = "Rating out of range"),
        (status = 409, description = "Feedback already submitted or interview closed")
    )
)]
#[axum::debug_handler]
pub async fn add_feedback(
    State(state): State<AppState>,
    ctx: SessionContext,
    Path(id): Path<String>,
    Json(payload): Json<FeedbackPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let interview = state.interview_service.add_feedback(&ctx, &id, payload).await?;
    Ok(Json(interview))
}

#[utoipa::path(
    get,
    path = "/api/interviews/{id}/evaluation",
    params(
        ("id" = String, Path, description = "Interview ID")
    ),
    responses(
        (status = 200, description = "Evaluation written with the feedback", body = Json<Evaluation>),
        (status = 404, description = "Interview has no evaluation")
    )
)]
#[axum::debug_handler]
pub async fn get_evaluation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let evaluation = state.interview_service.get_evaluation(&id).await?;
    Ok(Json(evaluation))
}
