use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::utils::normalize::{
    first_present, lookup, safe_decimal, safe_i32, safe_string, safe_string_list, safe_timestamp,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RequirementStatus {
    Pending,
    Approved,
    Hold,
    Rejected,
    Fulfilled,
    Canceled,
}

impl RequirementStatus {
    pub const ALL: [RequirementStatus; 6] = [
        RequirementStatus::Pending,
        RequirementStatus::Approved,
        RequirementStatus::Hold,
        RequirementStatus::Rejected,
        RequirementStatus::Fulfilled,
        RequirementStatus::Canceled,
    ];

    pub fn as_storage(self) -> &'static str {
        match self {
            RequirementStatus::Pending => "pending",
            RequirementStatus::Approved => "approved",
            RequirementStatus::Hold => "hold",
            RequirementStatus::Rejected => "rejected",
            RequirementStatus::Fulfilled => "fulfilled",
            RequirementStatus::Canceled => "canceled",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RequirementStatus::Pending => "Pending",
            RequirementStatus::Approved => "Approved",
            RequirementStatus::Hold => "Hold",
            RequirementStatus::Rejected => "Rejected",
            RequirementStatus::Fulfilled => "Fulfilled",
            RequirementStatus::Canceled => "Canceled",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(RequirementStatus::Pending),
            "approved" => Some(RequirementStatus::Approved),
            "hold" | "on_hold" => Some(RequirementStatus::Hold),
            "rejected" => Some(RequirementStatus::Rejected),
            "fulfilled" => Some(RequirementStatus::Fulfilled),
            "canceled" | "cancelled" => Some(RequirementStatus::Canceled),
            _ => None,
        }
    }

    pub fn can_transition_to(self, to: RequirementStatus) -> bool {
        use RequirementStatus::*;
        matches!(
            (self, to),
            (Pending, Approved | Hold | Rejected | Canceled)
                | (Hold, Approved | Rejected | Canceled)
                | (Approved, Hold | Fulfilled | Canceled)
        )
    }

    pub fn sources_of(to: RequirementStatus) -> Vec<RequirementStatus> {
        Self::ALL
            .into_iter()
            .filter(|from| from.can_transition_to(to))
            .collect()
    }

    /// No further transitions.
    pub fn is_closed(self) -> bool {
        matches!(
            self,
            RequirementStatus::Rejected | RequirementStatus::Fulfilled | RequirementStatus::Canceled
        )
    }
}

impl std::fmt::Display for RequirementStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl TryFrom<String> for RequirementStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        RequirementStatus::parse(&value)
            .ok_or_else(|| format!("unknown requirement status '{}'", value))
    }
}

impl From<RequirementStatus> for String {
    fn from(value: RequirementStatus) -> Self {
        value.label().to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Requirement {
    pub id: String,
    pub title: String,
    pub description: String,
    pub skills: Vec<String>,
    pub number_of_positions: i32,
    pub years_of_experience: i32,
    pub price_per_interview: Decimal,
    pub status: RequirementStatus,
    pub raised_by: String,
    pub company_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Requirement {
    pub fn from_record(record: &JsonValue) -> Self {
        Self {
            id: first_present(record, &["requirement_id", "id"]),
            title: safe_string(lookup(record, "title")),
            description: safe_string(lookup(record, "description")),
            skills: safe_string_list(record, "skills"),
            number_of_positions: safe_i32(record, "number_of_positions", 1),
            years_of_experience: safe_i32(record, "years_of_experience", 0),
            price_per_interview: safe_decimal(record, "price_per_interview"),
            status: RequirementStatus::parse(&safe_string(lookup(record, "status")))
                .unwrap_or(RequirementStatus::Pending),
            raised_by: safe_string(lookup(record, "raised_by")),
            company_id: first_present(record, &["company_id", "organization_id"]),
            created_at: safe_timestamp(record, "created_at"),
            updated_at: safe_timestamp(record, "updated_at"),
        }
    }
}
