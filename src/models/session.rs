use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Anonymous,
    Admin,
    Organization,
    Interviewer,
    Interviewee,
}

impl Role {
    pub fn parse(raw: &str) -> Role {
        match raw.trim().to_ascii_lowercase().as_str() {
            "admin" => Role::Admin,
            "organization" | "org" | "company" => Role::Organization,
            "interviewer" => Role::Interviewer,
            "interviewee" | "candidate" => Role::Interviewee,
            _ => Role::Anonymous,
        }
    }
}

/// Who is making the request. Threaded explicitly through service calls;
/// used for attribution and log fields, never for authorization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    pub user_id: Option<String>,
    pub role: Role,
}

impl SessionContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn user(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: Some(user_id.into()),
            role,
        }
    }

    /// Log-friendly identity.
    pub fn actor(&self) -> &str {
        self.user_id.as_deref().unwrap_or("anonymous")
    }

    pub fn user_id_or_empty(&self) -> String {
        self.user_id.clone().unwrap_or_default()
    }
}
