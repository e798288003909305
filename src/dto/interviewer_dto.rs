use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::store::NewInterviewer;
use crate::utils::normalize::dedup_trimmed;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateInterviewerPayload {
    #[validate(custom(function = "crate::utils::validation::non_blank", message = "Interviewer name cannot be empty"))]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub years_of_experience: i32,
}

impl From<CreateInterviewerPayload> for NewInterviewer {
    fn from(value: CreateInterviewerPayload) -> Self {
        Self {
            name: value.name.trim().to_string(),
            email: value.email.trim().to_string(),
            skills: dedup_trimmed(value.skills),
            years_of_experience: value.years_of_experience,
        }
    }
}
