//! Ports to the record store.
//!
//! Every operation answers with an [`Envelope`]: rows come back as loosely
//! typed JSON records and failures travel in `error` instead of being raised.
//! The services turn records into view models through `utils::normalize`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::models::candidate::CandidateStatus;
use crate::models::interview::{InterviewFeedback, InterviewStatus};
use crate::models::requirement::RequirementStatus;
use crate::models::ticket::TicketStatus;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreError {
    pub message: String,
    pub code: Option<String>,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    pub fn with_code(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: Some(code.into()),
        }
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{} ({})", self.message, code),
            None => f.write_str(&self.message),
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        let code = err
            .as_database_error()
            .and_then(|db| db.code())
            .map(|c| c.into_owned());
        Self {
            message: err.to_string(),
            code,
        }
    }
}

impl From<StoreError> for crate::error::Error {
    fn from(err: StoreError) -> Self {
        crate::error::Error::Store(err.to_string())
    }
}

/// `{data, error}` pair returned by every store operation. A guarded write
/// that matched no row yields neither data nor error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: Option<T>,
    pub error: Option<StoreError>,
}

impl<T> Envelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }

    pub fn empty() -> Self {
        Self {
            data: None,
            error: None,
        }
    }

    pub fn failure(error: StoreError) -> Self {
        Self {
            data: None,
            error: Some(error),
        }
    }

    /// Error first, then data; for callers that must report store failures.
    pub fn into_result(self) -> Result<Option<T>, StoreError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.data),
        }
    }
}

impl<T, E: Into<StoreError>> From<Result<Option<T>, E>> for Envelope<T> {
    fn from(value: Result<Option<T>, E>) -> Self {
        match value {
            Ok(Some(data)) => Envelope::success(data),
            Ok(None) => Envelope::empty(),
            Err(err) => Envelope::failure(err.into()),
        }
    }
}

impl<T> From<Option<T>> for Envelope<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(data) => Envelope::success(data),
            None => Envelope::empty(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewInterview {
    pub candidate_id: String,
    pub interviewer_id: String,
    pub requirement_id: String,
    pub scheduled_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterviewFilter {
    pub status: Option<InterviewStatus>,
    pub interviewer_id: Option<String>,
    pub candidate_id: Option<String>,
    pub requirement_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewRequirement {
    pub title: String,
    pub description: String,
    pub skills: Vec<String>,
    pub number_of_positions: i32,
    pub years_of_experience: i32,
    pub price_per_interview: Decimal,
    pub company_id: String,
    pub raised_by: String,
}

#[derive(Debug, Clone, Default)]
pub struct RequirementPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub skills: Option<Vec<String>>,
    pub number_of_positions: Option<i32>,
    pub years_of_experience: Option<i32>,
    pub price_per_interview: Option<Decimal>,
}

impl RequirementPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.skills.is_none()
            && self.number_of_positions.is_none()
            && self.years_of_experience.is_none()
            && self.price_per_interview.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct NewCandidate {
    pub full_name: String,
    pub email: String,
    pub resume_url: Option<String>,
    pub skills: Vec<String>,
    pub requirement_id: String,
}

#[derive(Debug, Clone)]
pub struct NewInterviewer {
    pub name: String,
    pub email: String,
    pub skills: Vec<String>,
    pub years_of_experience: i32,
}

#[derive(Debug, Clone)]
pub struct NewTicket {
    pub requirement_id: String,
    pub company_id: String,
    pub raised_by: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketFilter {
    pub status: Option<TicketStatus>,
    pub company_id: Option<String>,
}

#[async_trait]
pub trait InterviewStore: Send + Sync {
    async fn insert_interview(&self, row: NewInterview) -> Envelope<JsonValue>;

    async fn fetch_interview(&self, id: &str) -> Envelope<JsonValue>;

    /// Ordered by `scheduled_at`, earliest first.
    async fn list_interviews(&self, filter: &InterviewFilter) -> Envelope<Vec<JsonValue>>;

    /// Sets `status` only while the current status is one of `expected`.
    async fn set_interview_status(
        &self,
        id: &str,
        status: InterviewStatus,
        expected: &[InterviewStatus],
    ) -> Envelope<JsonValue>;

    /// Moves `scheduled_at`, marks the interview rescheduled and increments
    /// `reschedule_count` in the same write, guarded by `expected`.
    async fn reschedule_interview(
        &self,
        id: &str,
        scheduled_at: DateTime<Utc>,
        expected: &[InterviewStatus],
    ) -> Envelope<JsonValue>;

    /// Completes the interview, stores the feedback inline and inserts the
    /// evaluation row as one unit. Matches nothing when feedback already exists.
    async fn complete_with_feedback(
        &self,
        id: &str,
        feedback: &InterviewFeedback,
        expected: &[InterviewStatus],
    ) -> Envelope<JsonValue>;

    async fn fetch_evaluation(&self, interview_id: &str) -> Envelope<JsonValue>;
}

#[async_trait]
pub trait RequirementStore: Send + Sync {
    async fn insert_requirement(&self, row: NewRequirement) -> Envelope<JsonValue>;

    async fn fetch_requirement(&self, id: &str) -> Envelope<JsonValue>;

    /// Newest first.
    async fn list_requirements(
        &self,
        status: Option<RequirementStatus>,
    ) -> Envelope<Vec<JsonValue>>;

    async fn update_requirement(&self, id: &str, patch: &RequirementPatch) -> Envelope<JsonValue>;

    async fn set_requirement_status(
        &self,
        id: &str,
        status: RequirementStatus,
        expected: &[RequirementStatus],
    ) -> Envelope<JsonValue>;
}

#[async_trait]
pub trait CandidateStore: Send + Sync {
    async fn insert_candidates(&self, rows: Vec<NewCandidate>) -> Envelope<Vec<JsonValue>>;

    async fn fetch_candidate(&self, id: &str) -> Envelope<JsonValue>;

    /// Newest first.
    async fn list_candidates(&self, requirement_id: Option<&str>) -> Envelope<Vec<JsonValue>>;

    async fn set_candidate_status(&self, id: &str, status: CandidateStatus)
        -> Envelope<JsonValue>;
}

#[async_trait]
pub trait InterviewerStore: Send + Sync {
    async fn insert_interviewer(&self, row: NewInterviewer) -> Envelope<JsonValue>;

    async fn fetch_interviewer(&self, id: &str) -> Envelope<JsonValue>;

    async fn list_interviewers(&self) -> Envelope<Vec<JsonValue>>;
}

/// Ticket rows carry the referenced requirement's `requirement_title`.
#[async_trait]
pub trait TicketStore: Send + Sync {
    async fn insert_ticket(&self, row: NewTicket) -> Envelope<JsonValue>;

    async fn fetch_ticket(&self, id: &str) -> Envelope<JsonValue>;

    /// Newest first.
    async fn list_tickets(&self, filter: &TicketFilter) -> Envelope<Vec<JsonValue>>;

    /// Guarded by `expected`. A `reason` is stored as `escalation_reason`.
    async fn set_ticket_status(
        &self,
        id: &str,
        status: TicketStatus,
        expected: &[TicketStatus],
        reason: Option<String>,
    ) -> Envelope<JsonValue>;
}

/// Everything besides interviews: the records an interview refers to.
pub trait DirectoryStore: RequirementStore + CandidateStore + InterviewerStore {}

impl<T: RequirementStore + CandidateStore + InterviewerStore + ?Sized> DirectoryStore for T {}

pub trait HiringStore: InterviewStore + DirectoryStore + TicketStore {}

impl<T: InterviewStore + DirectoryStore + TicketStore + ?Sized> HiringStore for T {}
