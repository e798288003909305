use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::utils::normalize::{first_present, lookup, safe_string, safe_timestamp};

/// Approval ticket raised against a requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TicketStatus {
    Pending,
    Hold,
    Approved,
    Rejected,
    Escalated,
}

impl TicketStatus {
    pub const ALL: [TicketStatus; 5] = [
        TicketStatus::Pending,
        TicketStatus::Hold,
        TicketStatus::Approved,
        TicketStatus::Rejected,
        TicketStatus::Escalated,
    ];

    pub fn as_storage(self) -> &'static str {
        match self {
            TicketStatus::Pending => "pending",
            TicketStatus::Hold => "hold",
            TicketStatus::Approved => "approved",
            TicketStatus::Rejected => "rejected",
            TicketStatus::Escalated => "escalated",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TicketStatus::Pending => "Pending",
            TicketStatus::Hold => "Hold",
            TicketStatus::Approved => "Approved",
            TicketStatus::Rejected => "Rejected",
            TicketStatus::Escalated => "Escalated",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(TicketStatus::Pending),
            "hold" | "on_hold" => Some(TicketStatus::Hold),
            "approved" => Some(TicketStatus::Approved),
            "rejected" => Some(TicketStatus::Rejected),
            "escalated" => Some(TicketStatus::Escalated),
            _ => None,
        }
    }

    /// Still waiting for a decision.
    pub fn is_open(self) -> bool {
        !matches!(self, TicketStatus::Approved | TicketStatus::Rejected)
    }

    pub fn can_transition_to(self, to: TicketStatus) -> bool {
        use TicketStatus::*;
        matches!(
            (self, to),
            (Pending, Hold | Approved | Rejected | Escalated)
                | (Hold, Approved | Rejected | Escalated)
                | (Escalated, Approved | Rejected)
        )
    }

    pub fn sources_of(to: TicketStatus) -> Vec<TicketStatus> {
        Self::ALL
            .into_iter()
            .filter(|from| from.can_transition_to(to))
            .collect()
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl TryFrom<String> for TicketStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        TicketStatus::parse(&value).ok_or_else(|| format!("unknown ticket status '{}'", value))
    }
}

impl From<TicketStatus> for String {
    fn from(value: TicketStatus) -> Self {
        value.label().to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: String,
    pub requirement_id: String,
    pub requirement_title: String,
    pub status: TicketStatus,
    pub raised_by: String,
    pub company_id: String,
    pub escalation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    pub fn from_record(record: &JsonValue) -> Self {
        let reason = safe_string(lookup(record, "escalation_reason"));
        Self {
            id: first_present(record, &["ticket_id", "id"]),
            requirement_id: first_present(record, &["requirement_id", "job_id"]),
            requirement_title: first_present(record, &["requirement_title", "requirements.title"]),
            status: TicketStatus::parse(&safe_string(lookup(record, "status")))
                .unwrap_or(TicketStatus::Pending),
            raised_by: safe_string(lookup(record, "raised_by")),
            company_id: first_present(record, &["company_id", "organization_id"]),
            escalation_reason: (!reason.is_empty()).then_some(reason),
            created_at: safe_timestamp(record, "created_at"),
            updated_at: safe_timestamp(record, "updated_at"),
        }
    }
}
