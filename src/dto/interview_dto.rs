use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{Error, Result};
use crate::models::interview::{InterviewFeedback, InterviewStatus};
use crate::store::InterviewFilter;
use crate::utils::normalize::dedup_trimmed;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ScheduleInterviewPayload {
    #[validate(custom(function = "crate::utils::validation::non_blank", message = "Please select a candidate"))]
    pub candidate_id: String,
    #[validate(custom(function = "crate::utils::validation::non_blank", message = "Please select an interviewer"))]
    pub interviewer_id: String,
    #[validate(custom(function = "crate::utils::validation::non_blank", message = "Please select a requirement"))]
    pub requirement_id: String,
    #[validate(custom(function = "crate::utils::validation::future_timestamp"))]
    pub scheduled_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateInterviewStatusPayload {
    pub status: InterviewStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RescheduleInterviewPayload {
    #[validate(custom(function = "crate::utils::validation::future_timestamp"))]
    pub scheduled_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FeedbackPayload {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,
    #[serde(default)]
    pub comments: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    pub recommendation: Option<String>,
}

impl From<FeedbackPayload> for InterviewFeedback {
    fn from(value: FeedbackPayload) -> Self {
        Self {
            rating: value.rating,
            comments: value.comments.trim().to_string(),
            strengths: dedup_trimmed(value.strengths),
            weaknesses: dedup_trimmed(value.weaknesses),
            recommendation: value
                .recommendation
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InterviewListQuery {
    pub status: Option<String>,
    pub interviewer_id: Option<String>,
    pub candidate_id: Option<String>,
    pub requirement_id: Option<String>,
}

impl InterviewListQuery {
    pub fn into_filter(self) -> Result<InterviewFilter> {
        let status = match self.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => Some(
                InterviewStatus::parse(raw)
                    .ok_or_else(|| Error::BadRequest(format!("Unknown interview status: {}", raw)))?,
            ),
            None => None,
        };
        Ok(InterviewFilter {
            status,
            interviewer_id: self.interviewer_id.filter(|s| !s.is_empty()),
            candidate_id: self.candidate_id.filter(|s| !s.is_empty()),
            requirement_id: self.requirement_id.filter(|s| !s.is_empty()),
        })
    }
}
