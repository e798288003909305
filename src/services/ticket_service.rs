use std::sync::Arc;

use crate::dto::ticket_dto::CreateTicketPayload;
use crate::error::{Error, Result};
use crate::models::requirement::Requirement;
use crate::models::session::SessionContext;
use crate::models::ticket::{Ticket, TicketStatus};
use crate::services::notification_service::{report_failure, Notice, Notifier};
use crate::store::{NewTicket, RequirementStore, TicketFilter, TicketStore};

/// Approval tickets raised against requirements.
#[derive(Clone)]
pub struct TicketService {
    tickets: Arc<dyn TicketStore>,
    requirements: Arc<dyn RequirementStore>,
    notifier: Arc<dyn Notifier>,
}

impl TicketService {
    pub fn new(
        tickets: Arc<dyn TicketStore>,
        requirements: Arc<dyn RequirementStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            tickets,
            requirements,
            notifier,
        }
    }

    /// Opens a `Pending` ticket raised by the session user. The company
    /// defaults to the requirement's.
    pub async fn create_ticket(
        &self,
        ctx: &SessionContext,
        payload: CreateTicketPayload,
    ) -> Result<Ticket> {
        match self.try_create(ctx, payload).await {
            Ok(ticket) => {
                self.notifier
                    .notify(Notice::info(
                        "Ticket raised",
                        format!("Ticket raised for '{}'", ticket.requirement_title),
                    ))
                    .await;
                Ok(ticket)
            }
            Err(err) => Err(self.fail("Failed to raise ticket", err).await),
        }
    }

    pub async fn list_tickets(&self, filter: &TicketFilter) -> Result<Vec<Ticket>> {
        match self.tickets.list_tickets(filter).await.into_result() {
            Ok(rows) => Ok(rows
                .unwrap_or_default()
                .iter()
                .map(Ticket::from_record)
                .collect()),
            Err(err) => Err(self.fail("Failed to load tickets", err.into()).await),
        }
    }

    pub async fn get_ticket(&self, id: &str) -> Result<Ticket> {
        match self.load(id).await {
            Ok(ticket) => Ok(ticket),
            Err(err) => Err(self.fail("Failed to load ticket", err).await),
        }
    }

    /// Decides or parks a ticket. Escalation needs a reason and goes through
    /// `escalate_ticket`.
    pub async fn update_ticket_status(
        &self,
        ctx: &SessionContext,
        id: &str,
        status: TicketStatus,
    ) -> Result<Ticket> {
        let result = match status {
            TicketStatus::Escalated => Err(Error::BadRequest(
                "Use the escalate action to escalate a ticket".to_string(),
            )),
            to => self.try_transition(ctx, id, to, None).await,
        };
        match result {
            Ok(ticket) => {
                self.notifier
                    .notify(Notice::info(
                        "Ticket updated",
                        format!("Ticket status changed to {}", ticket.status),
                    ))
                    .await;
                Ok(ticket)
            }
            Err(err) => Err(self.fail("Failed to update ticket status", err).await),
        }
    }

    pub async fn escalate_ticket(
        &self,
        ctx: &SessionContext,
        id: &str,
        reason: &str,
    ) -> Result<Ticket> {
        let reason = reason.trim();
        let result = if reason.is_empty() {
            Err(Error::BadRequest("Escalation reason cannot be empty".to_string()))
        } else {
            self.try_transition(ctx, id, TicketStatus::Escalated, Some(reason.to_string()))
                .await
        };
        match result {
            Ok(ticket) => {
                tracing::warn!(ticket_id = id, actor = ctx.actor(), reason, "ticket escalated");
                self.notifier
                    .notify(Notice::info(
                        "Ticket escalated",
                        format!("Ticket for '{}' escalated", ticket.requirement_title),
                    ))
                    .await;
                Ok(ticket)
            }
            Err(err) => Err(self.fail("Failed to escalate ticket", err).await),
        }
    }

    async fn try_create(&self, ctx: &SessionContext, payload: CreateTicketPayload) -> Result<Ticket> {
        let requirement_id = payload.requirement_id.trim();
        let record = self
            .requirements
            .fetch_requirement(requirement_id)
            .await
            .into_result()?
            .ok_or_else(|| {
                Error::NotFound(format!("Requirement {} not found", requirement_id))
            })?;
        let requirement = Requirement::from_record(&record);

        let company_id = payload
            .company_id
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or(requirement.company_id);

        let row = NewTicket {
            requirement_id: requirement.id,
            company_id,
            raised_by: ctx.user_id_or_empty(),
        };
        let record = self
            .tickets
            .insert_ticket(row)
            .await
            .into_result()?
            .ok_or_else(|| Error::Internal("Store returned no ticket row".to_string()))?;
        let ticket = Ticket::from_record(&record);
        tracing::info!(ticket_id = %ticket.id, requirement_id = %ticket.requirement_id, actor = ctx.actor(), "ticket raised");
        Ok(ticket)
    }

    async fn try_transition(
        &self,
        ctx: &SessionContext,
        id: &str,
        to: TicketStatus,
        reason: Option<String>,
    ) -> Result<Ticket> {
        let current = self.load(id).await?;
        if !current.status.can_transition_to(to) {
            return Err(Error::illegal_transition(current.status, to));
        }
        let record = self
            .tickets
            .set_ticket_status(id, to, &TicketStatus::sources_of(to), reason)
            .await
            .into_result()?
            .ok_or_else(|| {
                Error::Conflict(format!(
                    "Ticket {} was changed by another request; reload and retry",
                    id
                ))
            })?;

        tracing::info!(
            ticket_id = id,
            from = %current.status,
            status = %to,
            actor = ctx.actor(),
            "ticket status changed"
        );
        Ok(Ticket::from_record(&record))
    }

    async fn load(&self, id: &str) -> Result<Ticket> {
        let record = self
            .tickets
            .fetch_ticket(id)
            .await
            .into_result()?
            .ok_or_else(|| Error::NotFound(format!("Ticket {} not found", id)))?;
        Ok(Ticket::from_record(&record))
    }

    async fn fail(&self, title: &str, err: Error) -> Error {
        report_failure(self.notifier.as_ref(), title, err).await
    }
}
