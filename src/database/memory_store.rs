use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value as JsonValue};
use uuid::Uuid;

use crate::models::candidate::CandidateStatus;
use crate::models::interview::{InterviewFeedback, InterviewStatus};
use crate::models::requirement::RequirementStatus;
use crate::models::ticket::TicketStatus;
use crate::store::{
    CandidateStore, Envelope, InterviewFilter, InterviewStore, InterviewerStore, NewCandidate,
    NewInterview, NewInterviewer, NewRequirement, NewTicket, RequirementPatch, RequirementStore,
    StoreError, TicketFilter, TicketStore,
};
use crate::utils::normalize::safe_now;
use crate::utils::time::{parse_timestamp, to_rfc3339};

#[derive(Default)]
struct Tables {
    interviews: Vec<JsonValue>,
    evaluations: Vec<JsonValue>,
    requirements: Vec<JsonValue>,
    candidates: Vec<JsonValue>,
    interviewers: Vec<JsonValue>,
    tickets: Vec<JsonValue>,
}

/// In-process record store. Rows are kept in the same JSON shape the
/// PostgreSQL store returns, and every conditional write checks its guard and
/// applies its change under one lock.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables
            .lock()
            .map_err(|_| StoreError::new("memory store lock poisoned"))
    }

    /// Inserts a row written by another system. Sparse rows are kept as
    /// given; `interview_id` and `job_id` are also exposed as `id` and
    /// `requirement_id` so lookups and filters find them.
    pub fn seed_interview(&self, record: JsonValue) -> Result<(), StoreError> {
        let mut record = record;
        alias(&mut record, "interview_id", "id");
        alias(&mut record, "job_id", "requirement_id");
        self.lock()?.interviews.push(record);
        Ok(())
    }

    fn read<T>(&self, f: impl FnOnce(&Tables) -> Option<T>) -> Envelope<T> {
        match self.lock() {
            Ok(tables) => f(&tables).into(),
            Err(err) => Envelope::failure(err),
        }
    }

    fn write<T>(&self, f: impl FnOnce(&mut Tables) -> Option<T>) -> Envelope<T> {
        match self.lock() {
            Ok(mut tables) => f(&mut tables).into(),
            Err(err) => Envelope::failure(err),
        }
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn stamp() -> String {
    safe_now()
}

fn id_of(record: &JsonValue) -> &str {
    record.get("id").and_then(JsonValue::as_str).unwrap_or("")
}

fn str_field<'a>(record: &'a JsonValue, key: &str) -> &'a str {
    record.get(key).and_then(JsonValue::as_str).unwrap_or("")
}

fn find<'a>(rows: &'a [JsonValue], id: &str) -> Option<&'a JsonValue> {
    rows.iter().find(|r| id_of(r) == id)
}

fn find_mut<'a>(rows: &'a mut [JsonValue], id: &str) -> Option<&'a mut JsonValue> {
    rows.iter_mut().find(|r| id_of(r) == id)
}

fn set(record: &mut JsonValue, key: &str, value: JsonValue) {
    if let JsonValue::Object(map) = record {
        map.insert(key.to_string(), value);
    }
}

/// Copies `from` into `to` when only `from` is present.
fn alias(record: &mut JsonValue, from: &str, to: &str) {
    if record.get(to).map_or(false, |v| !v.is_null()) {
        return;
    }
    if let Some(value) = record.get(from).filter(|v| !v.is_null()).cloned() {
        set(record, to, value);
    }
}

fn time_field(record: &JsonValue, key: &str) -> Option<DateTime<Utc>> {
    parse_timestamp(str_field(record, key))
}

fn interview_status_in(record: &JsonValue, expected: &[InterviewStatus]) -> bool {
    InterviewStatus::parse(str_field(record, "status"))
        .map(|status| expected.contains(&status))
        .unwrap_or(false)
}

/// Newest first; rows created in the same instant keep reverse insertion order.
fn newest_first<'a>(rows: impl DoubleEndedIterator<Item = &'a JsonValue>) -> Vec<JsonValue> {
    let mut rows: Vec<JsonValue> = rows.rev().cloned().collect();
    rows.sort_by(|a, b| time_field(b, "created_at").cmp(&time_field(a, "created_at")));
    rows
}

fn record(fields: Map<String, JsonValue>) -> JsonValue {
    let mut fields = fields;
    let ts = stamp();
    fields.insert("id".to_string(), json!(new_id()));
    fields.insert("created_at".to_string(), json!(ts));
    fields.insert("updated_at".to_string(), json!(ts));
    JsonValue::Object(fields)
}

fn object(value: JsonValue) -> Map<String, JsonValue> {
    match value {
        JsonValue::Object(map) => map,
        _ => Map::new(),
    }
}

#[async_trait]
impl InterviewStore for MemoryStore {
    async fn insert_interview(&self, row: NewInterview) -> Envelope<JsonValue> {
        self.write(|tables| {
            let created = record(object(json!({
                "candidate_id": row.candidate_id,
                "interviewer_id": row.interviewer_id,
                "requirement_id": row.requirement_id,
                "scheduled_at": to_rfc3339(row.scheduled_at),
                "status": InterviewStatus::Scheduled.as_storage(),
                "feedback": null,
                "interviewer_notes": "",
                "reschedule_count": 0,
            })));
            tables.interviews.push(created.clone());
            Some(created)
        })
    }

    async fn fetch_interview(&self, id: &str) -> Envelope<JsonValue> {
        self.read(|tables| find(&tables.interviews, id).cloned())
    }

    async fn list_interviews(&self, filter: &InterviewFilter) -> Envelope<Vec<JsonValue>> {
        self.read(|tables| {
            let mut rows: Vec<JsonValue> = tables
                .interviews
                .iter()
                .filter(|r| {
                    filter
                        .status
                        .map_or(true, |s| interview_status_in(r, &[s]))
                        && filter
                            .interviewer_id
                            .as_deref()
                            .map_or(true, |id| str_field(r, "interviewer_id") == id)
                        && filter
                            .candidate_id
                            .as_deref()
                            .map_or(true, |id| str_field(r, "candidate_id") == id)
                        && filter
                            .requirement_id
                            .as_deref()
                            .map_or(true, |id| str_field(r, "requirement_id") == id)
                })
                .cloned()
                .collect();
            rows.sort_by_key(|r| time_field(r, "scheduled_at"));
            Some(rows)
        })
    }

    async fn set_interview_status(
        &self,
        id: &str,
        status: InterviewStatus,
        expected: &[InterviewStatus],
    ) -> Envelope<JsonValue> {
        self.write(|tables| {
            let row = find_mut(&mut tables.interviews, id)?;
            if !interview_status_in(row, expected) {
                return None;
            }
            set(row, "status", json!(status.as_storage()));
            set(row, "updated_at", json!(stamp()));
            Some(row.clone())
        })
    }

    async fn reschedule_interview(
        &self,
        id: &str,
        scheduled_at: DateTime<Utc>,
        expected: &[InterviewStatus],
    ) -> Envelope<JsonValue> {
        self.write(|tables| {
            let row = find_mut(&mut tables.interviews, id)?;
            if !interview_status_in(row, expected) {
                return None;
            }
            let count = row
                .get("reschedule_count")
                .and_then(JsonValue::as_i64)
                .unwrap_or(0)
                .max(0);
            set(row, "scheduled_at", json!(to_rfc3339(scheduled_at)));
            set(row, "status", json!(InterviewStatus::Rescheduled.as_storage()));
            set(row, "reschedule_count", json!(count + 1));
            set(row, "updated_at", json!(stamp()));
            Some(row.clone())
        })
    }

    async fn complete_with_feedback(
        &self,
        id: &str,
        feedback: &InterviewFeedback,
        expected: &[InterviewStatus],
    ) -> Envelope<JsonValue> {
        let feedback_json = match serde_json::to_value(feedback) {
            Ok(value) => value,
            Err(err) => return Envelope::failure(StoreError::new(err.to_string())),
        };

        self.write(|tables| {
            let row = find_mut(&mut tables.interviews, id)?;
            let has_feedback = row.get("feedback").map_or(false, |f| !f.is_null());
            if has_feedback || !interview_status_in(row, expected) {
                return None;
            }
            set(row, "status", json!(InterviewStatus::Completed.as_storage()));
            set(row, "feedback", feedback_json);
            set(row, "interviewer_notes", json!(feedback.comments));
            set(row, "updated_at", json!(stamp()));
            let updated = row.clone();

            tables.evaluations.push(record(object(json!({
                "interview_id": id,
                "score": feedback.rating,
                "feedback": feedback.comments,
            }))));
            Some(updated)
        })
    }

    async fn fetch_evaluation(&self, interview_id: &str) -> Envelope<JsonValue> {
        self.read(|tables| {
            tables
                .evaluations
                .iter()
                .find(|e| str_field(e, "interview_id") == interview_id)
                .cloned()
        })
    }
}

#[async_trait]
impl RequirementStore for MemoryStore {
    async fn insert_requirement(&self, row: NewRequirement) -> Envelope<JsonValue> {
        self.write(|tables| {
            let created = record(object(json!({
                "title": row.title,
                "description": row.description,
                "skills": row.skills,
                "number_of_positions": row.number_of_positions,
                "years_of_experience": row.years_of_experience,
                "price_per_interview": row.price_per_interview.to_string(),
                "status": RequirementStatus::Pending.as_storage(),
                "raised_by": row.raised_by,
                "company_id": row.company_id,
            })));
            tables.requirements.push(created.clone());
            Some(created)
        })
    }

    async fn fetch_requirement(&self, id: &str) -> Envelope<JsonValue> {
        self.read(|tables| find(&tables.requirements, id).cloned())
    }

    async fn list_requirements(
        &self,
        status: Option<RequirementStatus>,
    ) -> Envelope<Vec<JsonValue>> {
        self.read(|tables| {
            Some(newest_first(tables.requirements.iter().filter(|r| {
                status.map_or(true, |s| {
                    RequirementStatus::parse(str_field(r, "status")) == Some(s)
                })
            })))
        })
    }

    async fn update_requirement(&self, id: &str, patch: &RequirementPatch) -> Envelope<JsonValue> {
        self.write(|tables| {
            let row = find_mut(&mut tables.requirements, id)?;
            if let Some(title) = &patch.title {
                set(row, "title", json!(title));
            }
            if let Some(description) = &patch.description {
                set(row, "description", json!(description));
            }
            if let Some(skills) = &patch.skills {
                set(row, "skills", json!(skills));
            }
            if let Some(positions) = patch.number_of_positions {
                set(row, "number_of_positions", json!(positions));
            }
            if let Some(years) = patch.years_of_experience {
                set(row, "years_of_experience", json!(years));
            }
            if let Some(price) = patch.price_per_interview {
                set(row, "price_per_interview", json!(price.to_string()));
            }
            set(row, "updated_at", json!(stamp()));
            Some(row.clone())
        })
    }

    async fn set_requirement_status(
        &self,
        id: &str,
        status: RequirementStatus,
        expected: &[RequirementStatus],
    ) -> Envelope<JsonValue> {
        self.write(|tables| {
            let row = find_mut(&mut tables.requirements, id)?;
            let current = RequirementStatus::parse(str_field(row, "status"))?;
            if !expected.contains(&current) {
                return None;
            }
            set(row, "status", json!(status.as_storage()));
            set(row, "updated_at", json!(stamp()));
            Some(row.clone())
        })
    }
}

#[async_trait]
impl CandidateStore for MemoryStore {
    async fn insert_candidates(&self, rows: Vec<NewCandidate>) -> Envelope<Vec<JsonValue>> {
        self.write(|tables| {
            let created: Vec<JsonValue> = rows
                .into_iter()
                .map(|row| {
                    record(object(json!({
                        "full_name": row.full_name,
                        "email": row.email,
                        "resume_url": row.resume_url,
                        "skills": row.skills,
                        "status": CandidateStatus::New.as_storage(),
                        "requirement_id": row.requirement_id,
                    })))
                })
                .collect();
            tables.candidates.extend(created.iter().cloned());
            Some(created)
        })
    }

    async fn fetch_candidate(&self, id: &str) -> Envelope<JsonValue> {
        self.read(|tables| find(&tables.candidates, id).cloned())
    }

    async fn list_candidates(&self, requirement_id: Option<&str>) -> Envelope<Vec<JsonValue>> {
        self.read(|tables| {
            Some(newest_first(tables.candidates.iter().filter(|c| {
                requirement_id.map_or(true, |id| str_field(c, "requirement_id") == id)
            })))
        })
    }

    async fn set_candidate_status(
        &self,
        id: &str,
        status: CandidateStatus,
    ) -> Envelope<JsonValue> {
        self.write(|tables| {
            let row = find_mut(&mut tables.candidates, id)?;
            set(row, "status", json!(status.as_storage()));
            set(row, "updated_at", json!(stamp()));
            Some(row.clone())
        })
    }
}

#[async_trait]
impl InterviewerStore for MemoryStore {
    async fn insert_interviewer(&self, row: NewInterviewer) -> Envelope<JsonValue> {
        self.write(|tables| {
            let created = record(object(json!({
                "name": row.name,
                "email": row.email,
                "skills": row.skills,
                "years_of_experience": row.years_of_experience,
            })));
            tables.interviewers.push(created.clone());
            Some(created)
        })
    }

    async fn fetch_interviewer(&self, id: &str) -> Envelope<JsonValue> {
        self.read(|tables| find(&tables.interviewers, id).cloned())
    }

    async fn list_interviewers(&self) -> Envelope<Vec<JsonValue>> {
        self.read(|tables| {
            let mut rows = tables.interviewers.clone();
            rows.sort_by(|a, b| str_field(a, "name").cmp(str_field(b, "name")));
            Some(rows)
        })
    }
}

fn with_requirement_title(tables: &Tables, ticket: &JsonValue) -> JsonValue {
    let title = find(&tables.requirements, str_field(ticket, "requirement_id"))
        .map(|r| json!(str_field(r, "title")))
        .unwrap_or(JsonValue::Null);
    let mut joined = ticket.clone();
    set(&mut joined, "requirement_title", title);
    joined
}

#[async_trait]
impl TicketStore for MemoryStore {
    async fn insert_ticket(&self, row: NewTicket) -> Envelope<JsonValue> {
        self.write(|tables| {
            let created = record(object(json!({
                "requirement_id": row.requirement_id,
                "status": TicketStatus::Pending.as_storage(),
                "raised_by": row.raised_by,
                "company_id": row.company_id,
                "escalation_reason": null,
            })));
            tables.tickets.push(created.clone());
            Some(with_requirement_title(tables, &created))
        })
    }

    async fn fetch_ticket(&self, id: &str) -> Envelope<JsonValue> {
        self.read(|tables| {
            find(&tables.tickets, id).map(|t| with_requirement_title(tables, t))
        })
    }

    async fn list_tickets(&self, filter: &TicketFilter) -> Envelope<Vec<JsonValue>> {
        self.read(|tables| {
            let rows = newest_first(tables.tickets.iter().filter(|t| {
                filter.status.map_or(true, |s| {
                    TicketStatus::parse(str_field(t, "status")) == Some(s)
                }) && filter
                    .company_id
                    .as_deref()
                    .map_or(true, |id| str_field(t, "company_id") == id)
            }));
            Some(rows.iter().map(|t| with_requirement_title(tables, t)).collect())
        })
    }

    async fn set_ticket_status(
        &self,
        id: &str,
        status: TicketStatus,
        expected: &[TicketStatus],
        reason: Option<String>,
    ) -> Envelope<JsonValue> {
        self.write(|tables| {
            let row = find_mut(&mut tables.tickets, id)?;
            let current = TicketStatus::parse(str_field(row, "status"))?;
            if !expected.contains(&current) {
                return None;
            }
            set(row, "status", json!(status.as_storage()));
            if let Some(reason) = reason {
                set(row, "escalation_reason", json!(reason));
            }
            set(row, "updated_at", json!(stamp()));
            let updated = row.clone();
            Some(with_requirement_title(tables, &updated))
        })
    }
}
