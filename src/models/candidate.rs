use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::utils::normalize::{
    first_present, lookup, safe_get, safe_string, safe_string_list, safe_timestamp,
};

/// Funnel position of a candidate. Any status may follow any other; the
/// funnel order is advisory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CandidateStatus {
    New,
    Shortlisted,
    Interviewed,
    Hired,
    Rejected,
}

impl CandidateStatus {
    pub const ALL: [CandidateStatus; 5] = [
        CandidateStatus::New,
        CandidateStatus::Shortlisted,
        CandidateStatus::Interviewed,
        CandidateStatus::Hired,
        CandidateStatus::Rejected,
    ];

    pub fn as_storage(self) -> &'static str {
        match self {
            CandidateStatus::New => "new",
            CandidateStatus::Shortlisted => "shortlisted",
            CandidateStatus::Interviewed => "interviewed",
            CandidateStatus::Hired => "hired",
            CandidateStatus::Rejected => "rejected",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CandidateStatus::New => "New",
            CandidateStatus::Shortlisted => "Shortlisted",
            CandidateStatus::Interviewed => "Interviewed",
            CandidateStatus::Hired => "Hired",
            CandidateStatus::Rejected => "Rejected",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        CandidateStatus::ALL
            .into_iter()
            .find(|s| s.as_storage().eq_ignore_ascii_case(raw.trim()))
    }
}

impl std::fmt::Display for CandidateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl TryFrom<String> for CandidateStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        CandidateStatus::parse(&value).ok_or_else(|| format!("unknown candidate status '{}'", value))
    }
}

impl From<CandidateStatus> for String {
    fn from(value: CandidateStatus) -> Self {
        value.label().to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub resume_url: Option<String>,
    pub skills: Vec<String>,
    pub status: CandidateStatus,
    pub requirement_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Candidate {
    pub fn from_record(record: &JsonValue) -> Self {
        let resume_url: Option<String> = safe_get(record, "resume_url", None);
        Self {
            id: first_present(record, &["candidate_id", "id"]),
            full_name: first_present(record, &["full_name", "name"]),
            email: safe_string(lookup(record, "email")),
            resume_url: resume_url.filter(|u| !u.trim().is_empty()),
            skills: safe_string_list(record, "skills"),
            status: CandidateStatus::parse(&safe_string(lookup(record, "status")))
                .unwrap_or(CandidateStatus::New),
            requirement_id: first_present(record, &["requirement_id", "job_id"]),
            created_at: safe_timestamp(record, "created_at"),
            updated_at: safe_timestamp(record, "updated_at"),
        }
    }
}
