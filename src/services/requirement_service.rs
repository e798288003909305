use std::sync::Arc;

use crate::dto::requirement_dto::CreateRequirementPayload;
use crate::error::{Error, Result};
use crate::models::requirement::{Requirement, RequirementStatus};
use crate::models::session::SessionContext;
use crate::services::notification_service::{report_failure, Notice, Notifier};
use crate::store::{NewRequirement, RequirementPatch, RequirementStore};

#[derive(Clone)]
pub struct RequirementService {
    store: Arc<dyn RequirementStore>,
    notifier: Arc<dyn Notifier>,
}

impl RequirementService {
    pub fn new(store: Arc<dyn RequirementStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    /// New requirements start as `Pending`, raised by the session user.
    pub async fn create_requirement(
        &self,
        ctx: &SessionContext,
        payload: CreateRequirementPayload,
    ) -> Result<Requirement> {
        let row = NewRequirement {
            title: payload.title.trim().to_string(),
            description: payload.description.trim().to_string(),
            skills: payload.skills(),
            number_of_positions: payload.number_of_positions,
            years_of_experience: payload.years_of_experience,
            price_per_interview: payload.price_per_interview,
            company_id: payload.company_id.trim().to_string(),
            raised_by: ctx.user_id_or_empty(),
        };
        let result = self
            .store
            .insert_requirement(row)
            .await
            .into_result()
            .map_err(Error::from)
            .and_then(|r| {
                r.ok_or_else(|| Error::Internal("Store returned no requirement row".to_string()))
            });

        match result {
            Ok(record) => {
                let requirement = Requirement::from_record(&record);
                tracing::info!(requirement_id = %requirement.id, actor = ctx.actor(), "requirement created");
                self.notifier
                    .notify(Notice::info(
                        "Requirement created",
                        format!("Requirement '{}' created", requirement.title),
                    ))
                    .await;
                Ok(requirement)
            }
            Err(err) => Err(self.fail("Failed to create requirement", err).await),
        }
    }

    pub async fn list_requirements(
        &self,
        status: Option<RequirementStatus>,
    ) -> Result<Vec<Requirement>> {
        match self.store.list_requirements(status).await.into_result() {
            Ok(rows) => Ok(rows
                .unwrap_or_default()
                .iter()
                .map(Requirement::from_record)
                .collect()),
            Err(err) => Err(self.fail("Failed to load requirements", err.into()).await),
        }
    }

    pub async fn get_requirement(&self, id: &str) -> Result<Requirement> {
        match self.load(id).await {
            Ok(requirement) => Ok(requirement),
            Err(err) => Err(self.fail("Failed to load requirement", err).await),
        }
    }

    /// Partial update. An empty patch returns the requirement unchanged.
    pub async fn update_requirement(
        &self,
        ctx: &SessionContext,
        id: &str,
        patch: RequirementPatch,
    ) -> Result<Requirement> {
        if patch.is_empty() {
            return self.get_requirement(id).await;
        }
        let result = self
            .store
            .update_requirement(id, &patch)
            .await
            .into_result()
            .map_err(Error::from)
            .and_then(|r| r.ok_or_else(|| not_found(id)));

        match result {
            Ok(record) => {
                tracing::info!(requirement_id = id, actor = ctx.actor(), "requirement updated");
                self.notifier
                    .notify(Notice::info("Requirement updated", "Requirement details saved"))
                    .await;
                Ok(Requirement::from_record(&record))
            }
            Err(err) => Err(self.fail("Failed to update requirement", err).await),
        }
    }

    pub async fn update_requirement_status(
        &self,
        ctx: &SessionContext,
        id: &str,
        status: RequirementStatus,
    ) -> Result<Requirement> {
        match self.try_transition(ctx, id, status).await {
            Ok(requirement) => {
                self.notifier
                    .notify(Notice::info(
                        "Requirement updated",
                        format!("Requirement status changed to {}", requirement.status),
                    ))
                    .await;
                Ok(requirement)
            }
            Err(err) => Err(self.fail("Failed to update requirement status", err).await),
        }
    }

    /// Closes a requirement as `Fulfilled` or `Canceled`.
    pub async fn close_requirement(
        &self,
        ctx: &SessionContext,
        id: &str,
        status: RequirementStatus,
    ) -> Result<Requirement> {
        let result = match status {
            RequirementStatus::Fulfilled | RequirementStatus::Canceled => {
                self.try_transition(ctx, id, status).await
            }
            other => Err(Error::BadRequest(format!(
                "A requirement can only be closed as Fulfilled or Canceled, not {}",
                other
            ))),
        };
        match result {
            Ok(requirement) => {
                self.notifier
                    .notify(Notice::info(
                        "Requirement closed",
                        format!("Requirement closed as {}", requirement.status),
                    ))
                    .await;
                Ok(requirement)
            }
            Err(err) => Err(self.fail("Failed to close requirement", err).await),
        }
    }

    async fn try_transition(
        &self,
        ctx: &SessionContext,
        id: &str,
        to: RequirementStatus,
    ) -> Result<Requirement> {
        let current = self.load(id).await?;
        if !current.status.can_transition_to(to) {
            return Err(Error::illegal_transition(current.status, to));
        }
        let record = self
            .store
            .set_requirement_status(id, to, &RequirementStatus::sources_of(to))
            .await
            .into_result()?
            .ok_or_else(|| {
                Error::Conflict(format!(
                    "Requirement {} was changed by another request; reload and retry",
                    id
                ))
            })?;

        tracing::info!(
            requirement_id = id,
            from = %current.status,
            status = %to,
            actor = ctx.actor(),
            "requirement status changed"
        );
        Ok(Requirement::from_record(&record))
    }

    async fn load(&self, id: &str) -> Result<Requirement> {
        let record = self
            .store
            .fetch_requirement(id)
            .await
            .into_result()?
            .ok_or_else(|| not_found(id))?;
        Ok(Requirement::from_record(&record))
    }

    async fn fail(&self, title: &str, err: Error) -> Error {
        report_failure(self.notifier.as_ref(), title, err).await
    }
}

fn not_found(id: &str) -> Error {
    Error::NotFound(format!("Requirement {} not found", id))
}
