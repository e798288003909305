use std::sync::Arc;

use crate::dto::interviewer_dto::CreateInterviewerPayload;
use crate::error::{Error, Result};
use crate::models::interviewer::Interviewer;
use crate::services::notification_service::{report_failure, Notice, Notifier};
use crate::store::{InterviewerStore, NewInterviewer};
use crate::utils::normalize::handle_multiple_response;

#[derive(Clone)]
pub struct InterviewerService {
    store: Arc<dyn InterviewerStore>,
    notifier: Arc<dyn Notifier>,
}

impl InterviewerService {
    pub fn new(store: Arc<dyn InterviewerStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    pub async fn create_interviewer(&self, payload: CreateInterviewerPayload) -> Result<Interviewer> {
        let result = self
            .store
            .insert_interviewer(NewInterviewer::from(payload))
            .await
            .into_result()
            .map_err(Error::from)
            .and_then(|r| {
                r.ok_or_else(|| Error::Internal("Store returned no interviewer row".to_string()))
            });
        match result {
            Ok(record) => {
                let interviewer = Interviewer::from_record(&record);
                self.notifier
                    .notify(Notice::info(
                        "Interviewer added",
                        format!("{} can now be booked", interviewer.name),
                    ))
                    .await;
                Ok(interviewer)
            }
            Err(err) => Err(self.fail("Failed to add interviewer", err).await),
        }
    }

    /// Degrades to an empty list when the store fails; the failure is still
    /// reported as an error notice.
    pub async fn list_interviewers(&self) -> Result<Vec<Interviewer>> {
        let response = self.store.list_interviewers().await;
        if let Some(err) = response.error.clone() {
            tracing::warn!(error = %err, "failed to load interviewers");
            self.fail("Failed to load interviewers", err.into()).await;
        }
        Ok(handle_multiple_response(response)
            .iter()
            .map(Interviewer::from_record)
            .collect())
    }

    pub async fn get_interviewer(&self, id: &str) -> Result<Interviewer> {
        match self.load(id).await {
            Ok(interviewer) => Ok(interviewer),
            Err(err) => Err(self.fail("Failed to load interviewer", err).await),
        }
    }

    async fn load(&self, id: &str) -> Result<Interviewer> {
        let record = self
            .store
            .fetch_interviewer(id)
            .await
            .into_result()?
            .ok_or_else(|| Error::NotFound(format!("Interviewer {} not found", id)))?;
        Ok(Interviewer::from_record(&record))
    }

    async fn fail(&self, title: &str, err: Error) -> Error {
        report_failure(self.notifier.as_ref(), title, err).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory_store::MemoryStore;
    use crate::services::notification_service::{NoticeLevel, TracingNotifier};
    use crate::store::{Envelope, StoreError};
    use async_trait::async_trait;
    use mockall::mock;
    use serde_json::Value as JsonValue;

    mock! {
        pub NotifierMock {}
        #[async_trait]
        impl Notifier for NotifierMock {
            async fn notify(&self, notice: Notice);
        }
    }

    mock! {
        pub RosterStore {}
        #[async_trait]
        impl InterviewerStore for RosterStore {
            async fn insert_interviewer(&self, row: NewInterviewer) -> Envelope<JsonValue>;
            async fn fetch_interviewer(&self, id: &str) -> Envelope<JsonValue>;
            async fn list_interviewers(&self) -> Envelope<Vec<JsonValue>>;
        }
    }

    #[tokio::test]
    async fn create_then_get_round_trip() {
        let service = InterviewerService::new(Arc::new(MemoryStore::new()), Arc::new(TracingNotifier));
        let created = service
            .create_interviewer(CreateInterviewerPayload {
                name: " Grace Hopper ".to_string(),
                email: "grace@example.com".to_string(),
                skills: vec!["cobol".to_string(), "cobol".to_string()],
                years_of_experience: 30,
            })
            .await
            .unwrap();

        assert_eq!(created.name, "Grace Hopper");
        assert_eq!(created.skills, vec!["cobol".to_string()]);
        let fetched = service.get_interviewer(&created.id).await.unwrap();
        assert_eq!(fetched.email, "grace@example.com");
        assert!(matches!(
            service.get_interviewer("missing").await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn list_degrades_to_empty_on_store_failure() {
        let mut store = MockRosterStore::new();
        store
            .expect_list_interviewers()
            .times(1)
            .returning(|| Envelope::failure(StoreError::new("connection reset")));
        let mut notifier = MockNotifierMock::new();
        notifier
            .expect_notify()
            .withf(|n| {
                n.level == NoticeLevel::Error
                    && n.title == "Failed to load interviewers"
                    && n.message.contains("connection reset")
            })
            .times(1)
            .returning(|_| ());
        let service = InterviewerService::new(Arc::new(store), Arc::new(notifier));

        let listed = service.list_interviewers().await.unwrap();

        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn get_failures_are_reported() {
        let mut store = MockRosterStore::new();
        store
            .expect_fetch_interviewer()
            .returning(|_| Envelope::empty());
        let mut notifier = MockNotifierMock::new();
        notifier
            .expect_notify()
            .withf(|n| n.level == NoticeLevel::Error && n.title == "Failed to load interviewer")
            .times(1)
            .returning(|_| ());
        let service = InterviewerService::new(Arc::new(store), Arc::new(notifier));

        let result = service.get_interviewer("iv-404").await;

        assert!(matches!(result, Err(Error::NotFound(_))));
    }
}
