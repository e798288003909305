use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::utils::normalize::{
    first_present, lookup, safe_i32, safe_string, safe_string_list, safe_timestamp,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum InterviewStatus {
    Scheduled,
    InProgress,
    Completed,
    Canceled,
    Rescheduled,
    NoShow,
    TechIssue,
    OnHold,
    /// A stored status this service does not know. Never written, never left.
    Unknown,
}

impl InterviewStatus {
    pub const ALL: [InterviewStatus; 9] = [
        InterviewStatus::Scheduled,
        InterviewStatus::InProgress,
        InterviewStatus::Completed,
        InterviewStatus::Canceled,
        InterviewStatus::Rescheduled,
        InterviewStatus::NoShow,
        InterviewStatus::TechIssue,
        InterviewStatus::OnHold,
        InterviewStatus::Unknown,
    ];

    pub fn as_storage(self) -> &'static str {
        match self {
            InterviewStatus::Scheduled => "scheduled",
            InterviewStatus::InProgress => "in_progress",
            InterviewStatus::Completed => "completed",
            InterviewStatus::Canceled => "canceled",
            InterviewStatus::Rescheduled => "rescheduled",
            InterviewStatus::NoShow => "no_show",
            InterviewStatus::TechIssue => "tech_issue",
            InterviewStatus::OnHold => "on_hold",
            InterviewStatus::Unknown => "unknown",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            InterviewStatus::Scheduled => "Scheduled",
            InterviewStatus::InProgress => "In Progress",
            InterviewStatus::Completed => "Completed",
            InterviewStatus::Canceled => "Canceled",
            InterviewStatus::Rescheduled => "Rescheduled",
            InterviewStatus::NoShow => "No Show",
            InterviewStatus::TechIssue => "Tech Issue",
            InterviewStatus::OnHold => "On Hold",
            InterviewStatus::Unknown => "Unknown",
        }
    }

    /// Accepts storage (`in_progress`), display (`In Progress`) and the
    /// British `cancelled` spelling, case-insensitively. `Unknown` is never
    /// parsed.
    pub fn parse(raw: &str) -> Option<Self> {
        let key: String = raw
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "scheduled" => Some(InterviewStatus::Scheduled),
            "inprogress" => Some(InterviewStatus::InProgress),
            "completed" => Some(InterviewStatus::Completed),
            "canceled" | "cancelled" => Some(InterviewStatus::Canceled),
            "rescheduled" => Some(InterviewStatus::Rescheduled),
            "noshow" => Some(InterviewStatus::NoShow),
            "techissue" => Some(InterviewStatus::TechIssue),
            "onhold" => Some(InterviewStatus::OnHold),
            _ => None,
        }
    }

    /// Upcoming means still expected to happen.
    pub fn is_open(self) -> bool {
        matches!(self, InterviewStatus::Scheduled | InterviewStatus::Rescheduled)
    }

    /// The interview did not take place as planned and needs a new date or a
    /// cancellation.
    pub fn is_interrupted(self) -> bool {
        matches!(
            self,
            InterviewStatus::NoShow | InterviewStatus::TechIssue | InterviewStatus::OnHold
        )
    }

    pub fn can_transition_to(self, to: InterviewStatus) -> bool {
        use InterviewStatus::*;
        match (self, to) {
            (
                Scheduled | Rescheduled,
                InProgress | Completed | Canceled | Rescheduled | NoShow | TechIssue | OnHold,
            ) => true,
            (InProgress, Completed | Canceled | TechIssue) => true,
            (NoShow | TechIssue | OnHold, Canceled | Rescheduled) => true,
            (Canceled, Canceled) => true,
            _ => false,
        }
    }

    /// Every status from which `to` may be entered. Stores use this as the
    /// guard of a conditional write.
    pub fn sources_of(to: InterviewStatus) -> Vec<InterviewStatus> {
        Self::ALL
            .into_iter()
            .filter(|from| from.can_transition_to(to))
            .collect()
    }

    /// Statuses that accept feedback: anything that can still complete, plus
    /// an interview already marked completed. The store's `feedback IS NULL`
    /// guard keeps it to one submission.
    pub fn feedback_sources() -> Vec<InterviewStatus> {
        let mut sources = Self::sources_of(InterviewStatus::Completed);
        sources.push(InterviewStatus::Completed);
        sources
    }

    pub fn accepts_feedback(self) -> bool {
        Self::feedback_sources().contains(&self)
    }
}

impl std::fmt::Display for InterviewStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl TryFrom<String> for InterviewStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        InterviewStatus::parse(&value).ok_or_else(|| format!("unknown interview status '{}'", value))
    }
}

impl From<InterviewStatus> for String {
    fn from(value: InterviewStatus) -> Self {
        value.label().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewFeedback {
    pub rating: i32,
    pub comments: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

impl InterviewFeedback {
    /// Only objects carrying a `rating` count as feedback.
    pub fn from_record(value: &JsonValue) -> Option<Self> {
        lookup(value, "rating")?;
        let rating = safe_i32(value, "rating", 0);
        let recommendation = safe_string(lookup(value, "recommendation"));
        Some(Self {
            rating,
            comments: safe_string(lookup(value, "comments")),
            strengths: safe_string_list(value, "strengths"),
            weaknesses: safe_string_list(value, "weaknesses"),
            recommendation: (!recommendation.is_empty()).then_some(recommendation),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interview {
    pub id: String,
    pub candidate_id: String,
    pub interviewer_id: String,
    pub requirement_id: String,
    pub scheduled_at: DateTime<Utc>,
    pub status: InterviewStatus,
    pub feedback: Option<InterviewFeedback>,
    pub interviewer_notes: String,
    pub reschedule_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Interview {
    pub fn from_record(record: &JsonValue) -> Self {
        let raw_status = safe_string(lookup(record, "status"));
        let status = if raw_status.trim().is_empty() {
            InterviewStatus::Scheduled
        } else {
            InterviewStatus::parse(&raw_status).unwrap_or_else(|| {
                tracing::warn!(status = %raw_status, "unrecognised interview status");
                InterviewStatus::Unknown
            })
        };

        // Feedback is only visible once the interview is completed.
        let feedback = match status {
            InterviewStatus::Completed => {
                lookup(record, "feedback").and_then(InterviewFeedback::from_record)
            }
            _ => None,
        };

        Self {
            id: first_present(record, &["interview_id", "id"]),
            candidate_id: first_present(record, &["candidate_id"]),
            interviewer_id: first_present(record, &["interviewer_id"]),
            requirement_id: first_present(record, &["job_id", "requirement_id"]),
            scheduled_at: safe_timestamp(record, "scheduled_at"),
            status,
            feedback,
            interviewer_notes: safe_string(lookup(record, "interviewer_notes")),
            reschedule_count: safe_i32(record, "reschedule_count", 0).max(0),
            created_at: safe_timestamp(record, "created_at"),
            updated_at: safe_timestamp(record, "updated_at"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewDetails {
    #[serde(flatten)]
    pub interview: Interview,
    pub candidate_name: String,
    pub interviewer_name: String,
    pub requirement_title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evaluation {
    pub id: String,
    pub interview_id: String,
    pub score: i32,
    pub feedback: String,
    pub created_at: DateTime<Utc>,
}

impl Evaluation {
    pub fn from_record(record: &JsonValue) -> Self {
        Self {
            id: first_present(record, &["evaluation_id", "id"]),
            interview_id: first_present(record, &["interview_id"]),
            score: safe_i32(record, "score", 0),
            feedback: safe_string(lookup(record, "feedback")),
            created_at: safe_timestamp(record, "created_at"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_parses_storage_and_display_forms() {
        assert_eq!(InterviewStatus::parse("in_progress"), Some(InterviewStatus::InProgress));
        assert_eq!(InterviewStatus::parse("In Progress"), Some(InterviewStatus::InProgress));
        assert_eq!(InterviewStatus::parse("CANCELLED"), Some(InterviewStatus::Canceled));
        assert_eq!(InterviewStatus::parse("no_show"), Some(InterviewStatus::NoShow));
        assert_eq!(InterviewStatus::parse("On Hold"), Some(InterviewStatus::OnHold));
        assert_eq!(InterviewStatus::parse("unknown"), None);
        assert_eq!(InterviewStatus::parse("lunch_break"), None);
    }

    #[test]
    fn status_serializes_as_label() {
        let json = serde_json::to_value(InterviewStatus::InProgress).unwrap();
        assert_eq!(json, json!("In Progress"));
        let parsed: InterviewStatus = serde_json::from_value(json!("rescheduled")).unwrap();
        assert_eq!(parsed, InterviewStatus::Rescheduled);
    }

    #[test]
    fn terminal_states_have_no_exits_except_idempotent_cancel() {
        for to in InterviewStatus::ALL {
            assert!(!InterviewStatus::Completed.can_transition_to(to));
            assert_eq!(
                InterviewStatus::Canceled.can_transition_to(to),
                to == InterviewStatus::Canceled
            );
        }
    }

    #[test]
    fn nothing_returns_to_scheduled() {
        assert!(InterviewStatus::sources_of(InterviewStatus::Scheduled).is_empty());
    }

    #[test]
    fn rescheduled_behaves_like_scheduled() {
        for to in InterviewStatus::ALL {
            assert_eq!(
                InterviewStatus::Scheduled.can_transition_to(to),
                InterviewStatus::Rescheduled.can_transition_to(to)
            );
        }
    }

    #[test]
    fn cancel_sources_include_canceled() {
        let sources = InterviewStatus::sources_of(InterviewStatus::Canceled);
        assert!(sources.contains(&InterviewStatus::Canceled));
        assert!(!sources.contains(&InterviewStatus::Completed));
    }

    #[test]
    fn completed_accepts_feedback_but_not_other_writes() {
        assert!(InterviewStatus::Completed.accepts_feedback());
        assert!(InterviewStatus::Rescheduled.accepts_feedback());
        assert!(!InterviewStatus::Canceled.accepts_feedback());
        assert!(!InterviewStatus::NoShow.accepts_feedback());
        assert!(!InterviewStatus::Completed.can_transition_to(InterviewStatus::Completed));
    }

    #[test]
    fn interrupted_interviews_can_only_move_or_cancel() {
        for from in [InterviewStatus::NoShow, InterviewStatus::TechIssue, InterviewStatus::OnHold] {
            assert!(from.is_interrupted());
            assert!(!from.is_open());
            for to in InterviewStatus::ALL {
                assert_eq!(
                    from.can_transition_to(to),
                    matches!(to, InterviewStatus::Canceled | InterviewStatus::Rescheduled)
                );
            }
        }
    }

    #[test]
    fn unknown_status_is_kept_and_frozen() {
        let interview = Interview::from_record(&json!({ "id": "iv-9", "status": "lunch_break" }));
        assert_eq!(interview.status, InterviewStatus::Unknown);
        assert_eq!(serde_json::to_value(interview.status).unwrap(), json!("Unknown"));
        for to in InterviewStatus::ALL {
            assert!(!InterviewStatus::Unknown.can_transition_to(to));
            assert!(!to.can_transition_to(InterviewStatus::Unknown));
        }
    }

    #[test]
    fn empty_record_normalizes_to_defaults() {
        let interview = Interview::from_record(&json!({}));
        assert_eq!(interview.id, "");
        assert_eq!(interview.candidate_id, "");
        assert_eq!(interview.status, InterviewStatus::Scheduled);
        assert_eq!(interview.reschedule_count, 0);
        assert!(interview.feedback.is_none());

        let from_scalar = Interview::from_record(&json!(null));
        assert_eq!(from_scalar.requirement_id, "");
    }

    #[test]
    fn alternate_field_names_are_resolved() {
        let interview = Interview::from_record(&json!({
            "interview_id": "iv-1",
            "job_id": "job-9",
            "status": "completed",
            "reschedule_count": -3,
            "feedback": { "rating": "4", "comments": "ok" },
        }));
        assert_eq!(interview.id, "iv-1");
        assert_eq!(interview.requirement_id, "job-9");
        assert_eq!(interview.reschedule_count, 0);
        let feedback = interview.feedback.unwrap();
        assert_eq!(feedback.rating, 4);
        assert_eq!(feedback.comments, "ok");
    }

    #[test]
    fn feedback_hidden_unless_completed() {
        let interview = Interview::from_record(&json!({
            "id": "iv-2",
            "status": "scheduled",
            "feedback": { "rating": 5, "comments": "early" },
        }));
        assert!(interview.feedback.is_none());
    }

    #[test]
    fn feedback_without_rating_is_ignored() {
        assert!(InterviewFeedback::from_record(&json!({ "comments": "x" })).is_none());
        assert!(InterviewFeedback::from_record(&json!("text")).is_none());
    }
}
