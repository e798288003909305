use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::utils::normalize::{
    first_present, lookup, safe_i32, safe_string, safe_string_list, safe_timestamp,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interviewer {
    pub id: String,
    pub name: String,
    pub email: String,
    pub skills: Vec<String>,
    pub years_of_experience: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Interviewer {
    pub fn from_record(record: &JsonValue) -> Self {
        Self {
            id: first_present(record, &["interviewer_id", "id"]),
            name: safe_string(lookup(record, "name")),
            email: safe_string(lookup(record, "email")),
            skills: safe_string_list(record, "skills"),
            years_of_experience: safe_i32(record, "years_of_experience", 0),
            created_at: safe_timestamp(record, "created_at"),
            updated_at: safe_timestamp(record, "updated_at"),
        }
    }
}
