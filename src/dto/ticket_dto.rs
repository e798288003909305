use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{Error, Result};
use crate::models::ticket::TicketStatus;
use crate::store::TicketFilter;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateTicketPayload {
    #[validate(custom(function = "crate::utils::validation::non_blank", message = "Please select a requirement"))]
    pub requirement_id: String,
    /// Defaults to the requirement's company.
    #[serde(default)]
    pub company_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketStatusPayload {
    pub status: TicketStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EscalateTicketPayload {
    #[validate(custom(function = "crate::utils::validation::non_blank", message = "Escalation reason cannot be empty"))]
    pub reason: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TicketListQuery {
    pub status: Option<String>,
    pub company_id: Option<String>,
}

impl TicketListQuery {
    pub fn into_filter(self) -> Result<TicketFilter> {
        let status = match self.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => Some(
                TicketStatus::parse(raw)
                    .ok_or_else(|| Error::BadRequest(format!("Unknown ticket status: {}", raw)))?,
            ),
            None => None,
        };
        Ok(TicketFilter {
            status,
            company_id: self.company_id.filter(|s| !s.trim().is_empty()),
        })
    }
}
