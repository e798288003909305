pub mod candidate;
pub mod dashboard;
pub mod health;
pub mod interview;
pub mod interviewer;
pub mod requirement;
pub mod ticket;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::middleware::rate_limit::{rps_middleware, RateLimiter};
use crate::AppState;

/// Every API route, rate limited at `rps` requests per second. `/health`
/// sits outside the limiter.
pub fn router(state: AppState, rps: u32) -> Router {
    let api = Router::new()
        .route(
            "/api/interviews",
            get(interview::list_interviews).post(interview::schedule_interview),
        )
        .route("/api/interviews/:id", get(interview::get_interview))
        .route(
            "/api/interviews/:id/status",
            patch(interview::update_interview_status),
        )
        .route("/api/interviews/:id/cancel", post(interview::cancel_interview))
        .route(
            "/api/interviews/:id/reschedule",
            post(interview::reschedule_interview),
        )
        .route("/api/interviews/:id/feedback", post(interview::add_feedback))
        .route(
            "/api/interviews/:id/evaluation",
            get(interview::get_evaluation),
        )
        .route(
            "/api/requirements",
            get(requirement::list_requirements).post(requirement::create_requirement),
        )
        .route(
            "/api/requirements/:id",
            get(requirement::get_requirement).patch(requirement::update_requirement),
        )
        .route(
            "/api/requirements/:id/status",
            post(requirement::update_requirement_status),
        )
        .route(
            "/api/requirements/:id/close",
            post(requirement::close_requirement),
        )
        .route(
            "/api/requirements/:id/candidates",
            get(requirement::list_requirement_candidates),
        )
        .route(
            "/api/candidates",
            get(candidate::list_candidates).post(candidate::create_candidate),
        )
        .route("/api/candidates/bulk", post(candidate::bulk_create_candidates))
        .route("/api/candidates/:id", get(candidate::get_candidate))
        .route(
            "/api/candidates/:id/status",
            post(candidate::update_candidate_status),
        )
        .route(
            "/api/interviewers",
            get(interviewer::list_interviewers).post(interviewer::create_interviewer),
        )
        .route("/api/interviewers/:id", get(interviewer::get_interviewer))
        .route(
            "/api/tickets",
            get(ticket::list_tickets).post(ticket::create_ticket),
        )
        .route("/api/tickets/:id", get(ticket::get_ticket))
        .route("/api/tickets/:id/status", post(ticket::update_ticket_status))
        .route("/api/tickets/:id/escalate", post(ticket::escalate_ticket))
        .route("/api/dashboard/admin", get(dashboard::admin_summary))
        .route(
            "/api/dashboard/interviewers/:id",
            get(dashboard::interviewer_summary),
        )
        .route(
            "/api/dashboard/requirements/:id",
            get(dashboard::requirement_summary),
        )
        .route(
            "/api/dashboard/organizations/:id",
            get(dashboard::organization_summary),
        )
        .layer(axum::middleware::from_fn_with_state(
            RateLimiter::new(rps),
            rps_middleware,
        ));

    Router::new()
        .route("/health", get(health::health))
        .merge(api)
        .with_state(state)
}
