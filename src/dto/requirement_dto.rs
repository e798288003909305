use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{Error, Result};
use crate::models::requirement::RequirementStatus;
use crate::store::RequirementPatch;
use crate::utils::normalize::dedup_trimmed;

fn default_positions() -> i32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateRequirementPayload {
    #[validate(custom(function = "crate::utils::validation::non_blank", message = "Title cannot be empty"))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default = "default_positions")]
    #[validate(range(min = 1))]
    pub number_of_positions: i32,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub years_of_experience: i32,
    #[serde(default)]
    #[validate(custom(function = "crate::utils::validation::non_negative_decimal"))]
    pub price_per_interview: Decimal,
    #[serde(default)]
    pub company_id: String,
}

impl CreateRequirementPayload {
    pub fn skills(&self) -> Vec<String> {
        dedup_trimmed(self.skills.iter().cloned())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateRequirementPayload {
    #[validate(custom(function = "crate::utils::validation::non_blank", message = "Title cannot be empty"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub skills: Option<Vec<String>>,
    #[validate(range(min = 1))]
    pub number_of_positions: Option<i32>,
    #[validate(range(min = 0))]
    pub years_of_experience: Option<i32>,
    #[validate(custom(function = "crate::utils::validation::non_negative_decimal"))]
    pub price_per_interview: Option<Decimal>,
}

impl From<UpdateRequirementPayload> for RequirementPatch {
    fn from(value: UpdateRequirementPayload) -> Self {
        Self {
            title: value.title.map(|t| t.trim().to_string()),
            description: value.description,
            skills: value.skills.map(dedup_trimmed),
            number_of_positions: value.number_of_positions,
            years_of_experience: value.years_of_experience,
            price_per_interview: value.price_per_interview,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequirementStatusPayload {
    pub status: RequirementStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequirementListQuery {
    pub status: Option<String>,
}

impl RequirementListQuery {
    pub fn status(&self) -> Result<Option<RequirementStatus>> {
        match self.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => RequirementStatus::parse(raw)
                .map(Some)
                .ok_or_else(|| Error::BadRequest(format!("Unknown requirement status: {}", raw))),
            None => Ok(None),
        }
    }
}
