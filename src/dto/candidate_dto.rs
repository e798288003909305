use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::candidate::CandidateStatus;
use crate::store::NewCandidate;
use crate::utils::normalize::dedup_trimmed;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCandidatePayload {
    #[validate(custom(function = "crate::utils::validation::non_blank", message = "Candidate name cannot be empty"))]
    pub full_name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(url)]
    pub resume_url: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[validate(custom(function = "crate::utils::validation::non_blank"))]
    pub requirement_id: String,
}

impl From<CreateCandidatePayload> for NewCandidate {
    fn from(value: CreateCandidatePayload) -> Self {
        Self {
            full_name: value.full_name.trim().to_string(),
            email: value.email.trim().to_string(),
            resume_url: value.resume_url.filter(|u| !u.trim().is_empty()),
            skills: dedup_trimmed(value.skills),
            requirement_id: value.requirement_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BulkCreateCandidatesPayload {
    #[validate(length(min = 1))]
    #[validate(nested)]
    pub candidates: Vec<CreateCandidatePayload>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkCreateResponse {
    pub created: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateStatusPayload {
    pub status: CandidateStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateListQuery {
    pub requirement_id: Option<String>,
}
