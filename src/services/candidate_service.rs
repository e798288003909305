use std::sync::Arc;

use crate::dto::candidate_dto::CreateCandidatePayload;
use crate::error::{Error, Result};
use crate::models::candidate::{Candidate, CandidateStatus};
use crate::services::notification_service::{report_failure, Notice, Notifier};
use crate::store::{CandidateStore, NewCandidate};

#[derive(Clone)]
pub struct CandidateService {
    store: Arc<dyn CandidateStore>,
    notifier: Arc<dyn Notifier>,
}

impl CandidateService {
    pub fn new(store: Arc<dyn CandidateStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    pub async fn create_candidate(&self, payload: CreateCandidatePayload) -> Result<Candidate> {
        let result = self
            .insert(vec![NewCandidate::from(payload)])
            .await
            .and_then(|mut rows| {
                rows.pop()
                    .ok_or_else(|| Error::Internal("Store returned no candidate row".to_string()))
            });
        match result {
            Ok(candidate) => {
                self.notifier
                    .notify(Notice::info(
                        "Candidate added",
                        format!("{} added to the pipeline", candidate.full_name),
                    ))
                    .await;
                Ok(candidate)
            }
            Err(err) => Err(self.fail("Failed to add candidate", err).await),
        }
    }

    /// Inserts every candidate and returns how many were created.
    pub async fn bulk_create_candidates(
        &self,
        payloads: Vec<CreateCandidatePayload>,
    ) -> Result<usize> {
        if payloads.is_empty() {
            return Ok(0);
        }
        let rows = payloads.into_iter().map(NewCandidate::from).collect();
        match self.insert(rows).await {
            Ok(created) => {
                tracing::info!(count = created.len(), "candidates imported");
                self.notifier
                    .notify(Notice::info(
                        "Candidates imported",
                        format!("{} candidates added", created.len()),
                    ))
                    .await;
                Ok(created.len())
            }
            Err(err) => Err(self.fail("Failed to import candidates", err).await),
        }
    }

    pub async fn list_candidates(&self, requirement_id: Option<&str>) -> Result<Vec<Candidate>> {
        match self.store.list_candidates(requirement_id).await.into_result() {
            Ok(rows) => Ok(rows
                .unwrap_or_default()
                .iter()
                .map(Candidate::from_record)
                .collect()),
            Err(err) => Err(self.fail("Failed to load candidates", err.into()).await),
        }
    }

    pub async fn get_candidate(&self, id: &str) -> Result<Candidate> {
        let result = self
            .store
            .fetch_candidate(id)
            .await
            .into_result()
            .map_err(Error::from)
            .and_then(|r| r.ok_or_else(|| not_found(id)));
        match result {
            Ok(record) => Ok(Candidate::from_record(&record)),
            Err(err) => Err(self.fail("Failed to load candidate", err).await),
        }
    }

    /// Any status may follow any other.
    pub async fn update_candidate_status(
        &self,
        id: &str,
        status: CandidateStatus,
    ) -> Result<Candidate> {
        let result = self
            .store
            .set_candidate_status(id, status)
            .await
            .into_result()
            .map_err(Error::from)
            .and_then(|r| r.ok_or_else(|| not_found(id)));
        match result {
            Ok(record) => {
                tracing::info!(candidate_id = id, status = %status, "candidate status changed");
                self.notifier
                    .notify(Notice::info(
                        "Candidate updated",
                        format!("Candidate moved to {}", status),
                    ))
                    .await;
                Ok(Candidate::from_record(&record))
            }
            Err(err) => Err(self.fail("Failed to update candidate status", err).await),
        }
    }

    async fn insert(&self, rows: Vec<NewCandidate>) -> Result<Vec<Candidate>> {
        let records = self.store.insert_candidates(rows).await.into_result()?;
        Ok(records
            .unwrap_or_default()
            .iter()
            .map(Candidate::from_record)
            .collect())
    }

    async fn fail(&self, title: &str, err: Error) -> Error {
        report_failure(self.notifier.as_ref(), title, err).await
    }
}

fn not_found(id: &str) -> Error {
    Error::NotFound(format!("Candidate {} not found", id))
}
