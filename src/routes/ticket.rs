use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::{
    dto::ticket_dto::{
        CreateTicketPayload, EscalateTicketPayload, TicketListQuery, TicketStatusPayload,
    },
    error::Result,
    models::session::SessionContext,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/tickets",
    request_body = CreateTicketPayload,
    responses(
        (status = 201, description = "Ticket raised", body = Json<Ticket>),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Requirement not found")
    )
)]
#[axum::debug_handler]
pub async fn create_ticket(
    State(state): State<AppState>,
    ctx: SessionContext,
    Json(payload): Json<CreateTicketPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let ticket = state.ticket_service.create_ticket(&ctx, payload).await?;
    Ok((StatusCode::CREATED, Json(ticket)))
}

#[utoipa::path(
    get,
    path = "/api/tickets",
    params(
        ("status" = Option<String>, Query, description = "Ticket status"),
        ("company_id" = Option<String>, Query, description = "Company ID")
    ),
    responses(
        (status = 200, description = "Tickets, newest first", body = Json<Vec<Ticket>>),
        (status = 400, description = "Unknown status")
    )
)]
#[axum::debug_handler]
pub async fn list_tickets(
    State(state): State<AppState>,
    Query(query): Query<TicketListQuery>,
) -> Result<impl IntoResponse> {
    let filter = query.into_filter()?;
    let tickets = state.ticket_service.list_tickets(&filter).await?;
    Ok(Json(tickets))
}

#[utoipa::path(
    get,
    path = "/api/tickets/{id}",
    params(
        ("id" = String, Path, description = "Ticket ID")
    ),
    responses(
        (status = 200, description = "Ticket", body = Json<Ticket>),
        (status = 404, description = "Ticket not found")
    )
)]
#[axum::debug_handler]
pub async fn get_ticket(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let ticket = state.ticket_service.get_ticket(&id).await?;
    Ok(Json(ticket))
}

#[utoipa::path(
    post,
    path = "/api/tickets/{id}/status",
    params(
        ("id" = String, Path, description = "Ticket ID")
    ),
    request_body = TicketStatusPayload,
    responses(
        (status = 200, description = "Status changed", body = Json<Ticket>),
        (status = 400, description = "Escalation must go through the escalate action"),
        (status = 409, description = "Transition not allowed")
    )
)]
#[axum::debug_handler]
pub async fn update_ticket_status(
    State(state): State<AppState>,
    ctx: SessionContext,
    Path(id): Path<String>,
    Json(payload): Json<TicketStatusPayload>,
) -> Result<impl IntoResponse> {
    let ticket = state
        .ticket_service
        .update_ticket_status(&ctx, &id, payload.status)
        .await?;
    Ok(Json(ticket))
}

#[utoipa::path(
    post,
    path = "/api/tickets/{id}/escalate",
    params(
        ("id" = String, Path, description = "Ticket ID")
    ),
    request_body = EscalateTicketPayload,
    responses(
        (status = 200, description = "Ticket escalated", body = Json<Ticket>),
        (status = 400, description = "Missing reason"),
        (status = 409, description = "Ticket already decided or escalated")
    )
)]
#[axum::debug_handler]
pub async fn escalate_ticket(
    State(state): State<AppState>,
    ctx: SessionContext,
    Path(id): Path<String>,
    Json(payload): Json<EscalateTicketPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let ticket = state
        .ticket_service
        .escalate_ticket(&ctx, &id, &payload.reason)
        .await?;
    Ok(Json(ticket))
}
