use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;

use crate::dto::interview_dto::{FeedbackPayload, ScheduleInterviewPayload};
use crate::error::{Error, Result};
use crate::models::candidate::Candidate;
use crate::models::interview::{
    Evaluation, Interview, InterviewDetails, InterviewFeedback, InterviewStatus,
};
use crate::models::interviewer::Interviewer;
use crate::models::requirement::Requirement;
use crate::models::session::SessionContext;
use crate::services::notification_service::{report_failure, Notice, Notifier};
use crate::store::{DirectoryStore, Envelope, InterviewFilter, InterviewStore, NewInterview};
use crate::utils::normalize::{handle_single_response, lookup};
use crate::utils::time;

/// Process-wide count of references that did not resolve when composing
/// interview details. Reported by `/health`.
#[derive(Debug, Clone, Default)]
pub struct DanglingReferences(Arc<AtomicU64>);

impl DanglingReferences {
    pub fn record(&self, kind: &str, reference: &str, interview_id: &str) {
        tracing::warn!(interview_id, kind, reference, "dangling reference");
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Clone)]
pub struct InterviewService {
    interviews: Arc<dyn InterviewStore>,
    directory: Arc<dyn DirectoryStore>,
    notifier: Arc<dyn Notifier>,
    dangling: DanglingReferences,
}

impl InterviewService {
    pub fn new(
        interviews: Arc<dyn InterviewStore>,
        directory: Arc<dyn DirectoryStore>,
        notifier: Arc<dyn Notifier>,
        dangling: DanglingReferences,
    ) -> Self {
        Self {
            interviews,
            directory,
            notifier,
            dangling,
        }
    }

    pub fn dangling_references(&self) -> &DanglingReferences {
        &self.dangling
    }

    pub async fn schedule_interview(
        &self,
        ctx: &SessionContext,
        payload: ScheduleInterviewPayload,
    ) -> Result<Interview> {
        match self.try_schedule(ctx, payload).await {
            Ok(interview) => {
                self.notifier
                    .notify(Notice::info(
                        "Interview scheduled",
                        format!("Interview scheduled for {}", time::to_rfc3339(interview.scheduled_at)),
                    ))
                    .await;
                Ok(interview)
            }
            Err(err) => Err(self.fail("Failed to schedule interview", err).await),
        }
    }

    async fn try_schedule(
        &self,
        ctx: &SessionContext,
        payload: ScheduleInterviewPayload,
    ) -> Result<Interview> {
        for (field, value) in [
            ("candidate_id", &payload.candidate_id),
            ("interviewer_id", &payload.interviewer_id),
            ("requirement_id", &payload.requirement_id),
        ] {
            if value.trim().is_empty() {
                return Err(Error::BadRequest(format!("{} is required", field)));
            }
        }
        ensure_future(payload.scheduled_at)?;

        let record = self
            .interviews
            .insert_interview(NewInterview {
                candidate_id: payload.candidate_id.trim().to_string(),
                interviewer_id: payload.interviewer_id.trim().to_string(),
                requirement_id: payload.requirement_id.trim().to_string(),
                scheduled_at: payload.scheduled_at,
            })
            .await
            .into_result()?
            .ok_or_else(|| Error::Internal("Store returned no interview row".to_string()))?;

        let interview = Interview::from_record(&record);
        tracing::info!(
            interview_id = %interview.id,
            actor = ctx.actor(),
            scheduled_at = %time::to_rfc3339(interview.scheduled_at),
            "interview scheduled"
        );
        Ok(interview)
    }

    /// Applies a status change through the transition table. Rescheduling
    /// carries a new date and goes through [`Self::reschedule_interview`].
    pub async fn update_interview_status(
        &self,
        ctx: &SessionContext,
        id: &str,
        status: InterviewStatus,
    ) -> Result<Interview> {
        match self.try_transition(ctx, id, status).await {
            Ok(interview) => {
                self.notifier
                    .notify(Notice::info(
                        "Interview updated",
                        format!("Interview status changed to {}", interview.status),
                    ))
                    .await;
                Ok(interview)
            }
            Err(err) => Err(self.fail("Failed to update interview status", err).await),
        }
    }

    pub async fn cancel_interview(&self, ctx: &SessionContext, id: &str) -> Result<Interview> {
        match self.try_transition(ctx, id, InterviewStatus::Canceled).await {
            Ok(interview) => {
                self.notifier
                    .notify(Notice::info("Interview canceled", "The interview has been canceled"))
                    .await;
                Ok(interview)
            }
            Err(err) => Err(self.fail("Failed to cancel interview", err).await),
        }
    }

    async fn try_transition(
        &self,
        ctx: &SessionContext,
        id: &str,
        to: InterviewStatus,
    ) -> Result<Interview> {
        if to == InterviewStatus::Rescheduled {
            return Err(Error::BadRequest(
                "Use the reschedule operation to move an interview".to_string(),
            ));
        }

        let current = self.load(id).await?;
        if !current.status.can_transition_to(to) {
            return Err(Error::illegal_transition(current.status, to));
        }

        let record = self
            .interviews
            .set_interview_status(id, to, &InterviewStatus::sources_of(to))
            .await
            .into_result()?
            .ok_or_else(|| concurrent_change(id))?;

        let interview = Interview::from_record(&record);
        tracing::info!(
            interview_id = id,
            from = %current.status,
            status = %interview.status,
            actor = ctx.actor(),
            "interview status changed"
        );
        Ok(interview)
    }

    pub async fn add_feedback(
        &self,
        ctx: &SessionContext,
        id: &str,
        payload: FeedbackPayload,
    ) -> Result<Interview> {
        match self.try_add_feedback(ctx, id, payload).await {
            Ok(interview) => {
                self.notifier
                    .notify(Notice::info(
                        "Feedback submitted",
                        "Interview completed and feedback recorded",
                    ))
                    .await;
                Ok(interview)
            }
            Err(err) => Err(self.fail("Failed to submit feedback", err).await),
        }
    }

    async fn try_add_feedback(
        &self,
        ctx: &SessionContext,
        id: &str,
        payload: FeedbackPayload,
    ) -> Result<Interview> {
        if !(1..=5).contains(&payload.rating) {
            return Err(Error::BadRequest("Rating must be between 1 and 5".to_string()));
        }
        let feedback = InterviewFeedback::from(payload);

        let record = self.load_record(id).await?;
        if lookup(&record, "feedback")
            .and_then(InterviewFeedback::from_record)
            .is_some()
        {
            return Err(Error::Conflict(
                "Feedback has already been submitted for this interview".to_string(),
            ));
        }
        let current = Interview::from_record(&record);
        if !current.status.accepts_feedback() {
            return Err(Error::illegal_transition(current.status, InterviewStatus::Completed));
        }

        let updated = self
            .interviews
            .complete_with_feedback(id, &feedback, &InterviewStatus::feedback_sources())
            .await
            .into_result()?
            .ok_or_else(|| concurrent_change(id))?;

        tracing::info!(
            interview_id = id,
            rating = feedback.rating,
            actor = ctx.actor(),
            "interview feedback recorded"
        );
        Ok(Interview::from_record(&updated))
    }

    pub async fn reschedule_interview(
        &self,
        ctx: &SessionContext,
        id: &str,
        scheduled_at: DateTime<Utc>,
    ) -> Result<Interview> {
        match self.try_reschedule(ctx, id, scheduled_at).await {
            Ok(interview) => {
                self.notifier
                    .notify(Notice::info(
                        "Interview rescheduled",
                        format!("Interview moved to {}", time::to_rfc3339(interview.scheduled_at)),
                    ))
                    .await;
                Ok(interview)
            }
            Err(err) => Err(self.fail("Failed to reschedule interview", err).await),
        }
    }

    async fn try_reschedule(
        &self,
        ctx: &SessionContext,
        id: &str,
        scheduled_at: DateTime<Utc>,
    ) -> Result<Interview> {
        ensure_future(scheduled_at)?;

        let current = self.load(id).await?;
        if !current.status.can_transition_to(InterviewStatus::Rescheduled) {
            return Err(Error::illegal_transition(
                current.status,
                InterviewStatus::Rescheduled,
            ));
        }

        let record = self
            .interviews
            .reschedule_interview(
                id,
                scheduled_at,
                &InterviewStatus::sources_of(InterviewStatus::Rescheduled),
            )
            .await
            .into_result()?
            .ok_or_else(|| concurrent_change(id))?;

        let interview = Interview::from_record(&record);
        tracing::info!(
            interview_id = id,
            reschedule_count = interview.reschedule_count,
            actor = ctx.actor(),
            "interview rescheduled"
        );
        Ok(interview)
    }

    pub async fn get_interview(&self, id: &str) -> Result<InterviewDetails> {
        match self.load(id).await {
            Ok(interview) => Ok(self.with_details(interview).await),
            Err(err) => Err(self.fail("Failed to load interview", err).await),
        }
    }

    pub async fn list_interviews(&self, filter: &InterviewFilter) -> Result<Vec<Interview>> {
        match self.interviews.list_interviews(filter).await.into_result() {
            Ok(rows) => Ok(rows
                .unwrap_or_default()
                .iter()
                .map(Interview::from_record)
                .collect()),
            Err(err) => Err(self.fail("Failed to load interviews", err.into()).await),
        }
    }

    pub async fn get_evaluation(&self, interview_id: &str) -> Result<Evaluation> {
        let result = self
            .interviews
            .fetch_evaluation(interview_id)
            .await
            .into_result()
            .map_err(Error::from)
            .and_then(|row| {
                row.map(|r| Evaluation::from_record(&r)).ok_or_else(|| {
                    Error::NotFound(format!("No evaluation for interview {}", interview_id))
                })
            });
        match result {
            Ok(evaluation) => Ok(evaluation),
            Err(err) => Err(self.fail("Failed to load evaluation", err).await),
        }
    }

    async fn load_record(&self, id: &str) -> Result<JsonValue> {
        self.interviews
            .fetch_interview(id)
            .await
            .into_result()?
            .ok_or_else(|| Error::NotFound(format!("Interview {} not found", id)))
    }

    async fn load(&self, id: &str) -> Result<Interview> {
        Ok(Interview::from_record(&self.load_record(id).await?))
    }

    /// Resolves display names of the related records. A reference that does
    /// not resolve renders as an empty name and is counted.
    async fn with_details(&self, interview: Interview) -> InterviewDetails {
        let candidate = self
            .resolve(&interview, "candidate", &interview.candidate_id, |id| {
                self.directory.fetch_candidate(id)
            })
            .await
            .map(|r| Candidate::from_record(&r).full_name);
        let interviewer = self
            .resolve(&interview, "interviewer", &interview.interviewer_id, |id| {
                self.directory.fetch_interviewer(id)
            })
            .await
            .map(|r| Interviewer::from_record(&r).name);
        let requirement = self
            .resolve(&interview, "requirement", &interview.requirement_id, |id| {
                self.directory.fetch_requirement(id)
            })
            .await
            .map(|r| Requirement::from_record(&r).title);

        InterviewDetails {
            candidate_name: candidate.unwrap_or_default(),
            interviewer_name: interviewer.unwrap_or_default(),
            requirement_title: requirement.unwrap_or_default(),
            interview,
        }
    }

    async fn resolve<'a, F, Fut>(
        &self,
        interview: &Interview,
        kind: &str,
        reference: &'a str,
        fetch: F,
    ) -> Option<JsonValue>
    where
        F: FnOnce(&'a str) -> Fut,
        Fut: std::future::Future<Output = Envelope<JsonValue>>,
    {
        let found = if reference.is_empty() {
            None
        } else {
            handle_single_response(fetch(reference).await)
        };
        if found.is_none() {
            self.dangling.record(kind, reference, &interview.id);
        }
        found
    }

    async fn fail(&self, title: &str, err: Error) -> Error {
        report_failure(self.notifier.as_ref(), title, err).await
    }
}

fn ensure_future(scheduled_at: DateTime<Utc>) -> Result<()> {
    if scheduled_at <= time::now() {
        return Err(Error::BadRequest(
            "Interview date must be in the future".to_string(),
        ));
    }
    Ok(())
}

fn concurrent_change(id: &str) -> Error {
    Error::Conflict(format!(
        "Interview {} was changed by another request; reload and retry",
        id
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory_store::MemoryStore;
    use crate::services::notification_service::NoticeLevel;
    use crate::store::{CandidateStore, InterviewerStore, NewCandidate, NewInterviewer, StoreError};
    use crate::services::dashboard_service::DashboardService;
    use async_trait::async_trait;
    use chrono::Duration;
    use mockall::mock;
    use serde_json::json;
    use tokio_test::{assert_err, assert_ok};

    mock! {
        pub NotifierMock {}
        #[async_trait]
        impl Notifier for NotifierMock {
            async fn notify(&self, notice: Notice);
        }
    }

    mock! {
        pub InterviewStoreMock {}
        #[async_trait]
        impl InterviewStore for InterviewStoreMock {
            async fn insert_interview(&self, row: NewInterview) -> Envelope<JsonValue>;
            async fn fetch_interview(&self, id: &str) -> Envelope<JsonValue>;
            async fn list_interviews(&self, filter: &InterviewFilter) -> Envelope<Vec<JsonValue>>;
            async fn set_interview_status(
                &self,
                id: &str,
                status: InterviewStatus,
                expected: &[InterviewStatus],
            ) -> Envelope<JsonValue>;
            async fn reschedule_interview(
                &self,
                id: &str,
                scheduled_at: DateTime<Utc>,
                expected: &[InterviewStatus],
            ) -> Envelope<JsonValue>;
            async fn complete_with_feedback(
                &self,
                id: &str,
                feedback: &InterviewFeedback,
                expected: &[InterviewStatus],
            ) -> Envelope<JsonValue>;
            async fn fetch_evaluation(&self, interview_id: &str) -> Envelope<JsonValue>;
        }
    }

    fn quiet_notifier() -> Arc<dyn Notifier> {
        let mut notifier = MockNotifierMock::new();
        notifier.expect_notify().returning(|_| ());
        Arc::new(notifier)
    }

    fn service_with(store: Arc<MemoryStore>, notifier: Arc<dyn Notifier>) -> InterviewService {
        InterviewService::new(
            store.clone(),
            store,
            notifier,
            DanglingReferences::default(),
        )
    }

    fn schedule_payload(at: DateTime<Utc>) -> ScheduleInterviewPayload {
        ScheduleInterviewPayload {
            candidate_id: "cand-1".to_string(),
            interviewer_id: "intv-1".to_string(),
            requirement_id: "req-1".to_string(),
            scheduled_at: at,
        }
    }

    fn feedback(rating: i32) -> FeedbackPayload {
        FeedbackPayload {
            rating,
            comments: "Clear communicator".to_string(),
            strengths: vec!["design".to_string()],
            weaknesses: vec![],
            recommendation: Some("hire".to_string()),
        }
    }

    async fn scheduled(service: &InterviewService) -> Interview {
        service
            .schedule_interview(
                &SessionContext::anonymous(),
                schedule_payload(time::now() + Duration::days(1)),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn scheduling_starts_in_scheduled_with_zero_reschedules() {
        let service = service_with(Arc::new(MemoryStore::new()), quiet_notifier());
        let interview = scheduled(&service).await;
        assert_eq!(interview.status, InterviewStatus::Scheduled);
        assert_eq!(interview.reschedule_count, 0);
        assert!(interview.feedback.is_none());
        assert!(!interview.id.is_empty());
    }

    #[tokio::test]
    async fn scheduling_in_the_past_is_rejected_and_notified() {
        let mut notifier = MockNotifierMock::new();
        notifier
            .expect_notify()
            .withf(|n| n.level == NoticeLevel::Error && n.title == "Failed to schedule interview")
            .times(1)
            .returning(|_| ());
        let store = Arc::new(MemoryStore::new());
        let service = service_with(store.clone(), Arc::new(notifier));

        let result = service
            .schedule_interview(
                &SessionContext::anonymous(),
                schedule_payload(time::now() - Duration::minutes(1)),
            )
            .await;
        assert!(matches!(result, Err(Error::BadRequest(_))));
        let rows = store.list_interviews(&InterviewFilter::default()).await;
        assert!(rows.data.unwrap().is_empty());
    }

    #[tokio::test]
    async fn completed_interviews_reject_every_transition() {
        let service = service_with(Arc::new(MemoryStore::new()), quiet_notifier());
        let ctx = SessionContext::anonymous();
        let interview = scheduled(&service).await;
        assert_ok!(service.add_feedback(&ctx, &interview.id, feedback(4)).await);

        for to in [
            InterviewStatus::InProgress,
            InterviewStatus::Canceled,
            InterviewStatus::Completed,
            InterviewStatus::Scheduled,
        ] {
            let result = service.update_interview_status(&ctx, &interview.id, to).await;
            assert!(matches!(result, Err(Error::IllegalTransition { .. })), "{:?}", to);
        }
        assert_err!(
            service
                .reschedule_interview(&ctx, &interview.id, time::now() + Duration::days(3))
                .await
        );
    }

    #[tokio::test]
    async fn status_update_refuses_rescheduled_target() {
        let service = service_with(Arc::new(MemoryStore::new()), quiet_notifier());
        let interview = scheduled(&service).await;
        let result = service
            .update_interview_status(
                &SessionContext::anonymous(),
                &interview.id,
                InterviewStatus::Rescheduled,
            )
            .await;
        assert!(matches!(result, Err(Error::BadRequest(_))));
    }

    #[tokio::test]
    async fn cancel_is_idempotent() {
        let service = service_with(Arc::new(MemoryStore::new()), quiet_notifier());
        let ctx = SessionContext::anonymous();
        let interview = scheduled(&service).await;

        let first = service.cancel_interview(&ctx, &interview.id).await.unwrap();
        let second = service.cancel_interview(&ctx, &interview.id).await.unwrap();
        assert_eq!(first.status, InterviewStatus::Canceled);
        assert_eq!(second.status, InterviewStatus::Canceled);
        assert!(second.updated_at >= first.updated_at);
    }

    #[tokio::test]
    async fn in_progress_interview_can_complete_but_not_reschedule() {
        let service = service_with(Arc::new(MemoryStore::new()), quiet_notifier());
        let ctx = SessionContext::anonymous();
        let interview = scheduled(&service).await;

        assert_ok!(
            service
                .update_interview_status(&ctx, &interview.id, InterviewStatus::InProgress)
                .await
        );
        let result = service
            .reschedule_interview(&ctx, &interview.id, time::now() + Duration::days(2))
            .await;
        assert!(matches!(result, Err(Error::IllegalTransition { .. })));

        let done = service.add_feedback(&ctx, &interview.id, feedback(5)).await.unwrap();
        assert_eq!(done.status, InterviewStatus::Completed);
    }

    #[tokio::test]
    async fn reschedules_are_counted_and_move_the_date() {
        let service = service_with(Arc::new(MemoryStore::new()), quiet_notifier());
        let ctx = SessionContext::anonymous();
        let interview = scheduled(&service).await;
        let target = time::now() + Duration::days(7);

        let mut last = interview.clone();
        for expected in 1..=3 {
            last = service
                .reschedule_interview(&ctx, &interview.id, target)
                .await
                .unwrap();
            assert_eq!(last.reschedule_count, expected);
        }
        assert_eq!(last.status, InterviewStatus::Rescheduled);
        assert_eq!(last.scheduled_at.timestamp_millis(), target.timestamp_millis());
    }

    #[tokio::test]
    async fn reschedule_into_the_past_leaves_interview_untouched() {
        let store = Arc::new(MemoryStore::new());
        let service = service_with(store.clone(), quiet_notifier());
        let ctx = SessionContext::anonymous();
        let interview = scheduled(&service).await;

        assert_err!(
            service
                .reschedule_interview(&ctx, &interview.id, time::now() - Duration::hours(1))
                .await
        );
        let reloaded = service.get_interview(&interview.id).await.unwrap();
        assert_eq!(reloaded.interview.reschedule_count, 0);
        assert_eq!(reloaded.interview.status, InterviewStatus::Scheduled);
    }

    #[tokio::test]
    async fn feedback_completes_and_writes_evaluation_once() {
        let service = service_with(Arc::new(MemoryStore::new()), quiet_notifier());
        let ctx = SessionContext::anonymous();
        let interview = scheduled(&service).await;

        let done = service.add_feedback(&ctx, &interview.id, feedback(4)).await.unwrap();
        assert_eq!(done.status, InterviewStatus::Completed);
        assert_eq!(done.interviewer_notes, "Clear communicator");
        assert_eq!(done.feedback.as_ref().map(|f| f.rating), Some(4));

        let evaluation = service.get_evaluation(&interview.id).await.unwrap();
        assert_eq!(evaluation.score, 4);
        assert_eq!(evaluation.feedback, "Clear communicator");

        let again = service.add_feedback(&ctx, &interview.id, feedback(2)).await;
        assert!(matches!(again, Err(Error::Conflict(_))));
        let evaluation = service.get_evaluation(&interview.id).await.unwrap();
        assert_eq!(evaluation.score, 4);
    }

    #[tokio::test]
    async fn feedback_rating_out_of_range_is_rejected() {
        let service = service_with(Arc::new(MemoryStore::new()), quiet_notifier());
        let interview = scheduled(&service).await;
        for rating in [0, 6] {
            let result = service
                .add_feedback(&SessionContext::anonymous(), &interview.id, feedback(rating))
                .await;
            assert!(matches!(result, Err(Error::BadRequest(_))));
        }
        assert!(matches!(
            service.get_evaluation(&interview.id).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn missing_interview_is_not_found() {
        let service = service_with(Arc::new(MemoryStore::new()), quiet_notifier());
        let result = service
            .update_interview_status(
                &SessionContext::anonymous(),
                "nope",
                InterviewStatus::InProgress,
            )
            .await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn details_resolve_names_and_count_dangling_references() {
        let store = Arc::new(MemoryStore::new());
        let service = service_with(store.clone(), quiet_notifier());

        let candidate = store
            .insert_candidates(vec![NewCandidate {
                full_name: "Ada Lovelace".to_string(),
                email: "ada@example.com".to_string(),
                resume_url: None,
                skills: vec![],
                requirement_id: "req-gone".to_string(),
            }])
            .await
            .data
            .unwrap();
        let interviewer = store
            .insert_interviewer(NewInterviewer {
                name: "Linus".to_string(),
                email: "linus@example.com".to_string(),
                skills: vec![],
                years_of_experience: 20,
            })
            .await
            .data
            .unwrap();

        let interview = service
            .schedule_interview(
                &SessionContext::anonymous(),
                ScheduleInterviewPayload {
                    candidate_id: candidate[0]["id"].as_str().unwrap().to_string(),
                    interviewer_id: interviewer["id"].as_str().unwrap().to_string(),
                    requirement_id: "req-gone".to_string(),
                    scheduled_at: time::now() + Duration::days(1),
                },
            )
            .await
            .unwrap();

        let details = service.get_interview(&interview.id).await.unwrap();
        assert_eq!(details.candidate_name, "Ada Lovelace");
        assert_eq!(details.interviewer_name, "Linus");
        assert_eq!(details.requirement_title, "");
        assert_eq!(service.dangling_references().count(), 1);
    }

    #[tokio::test]
    async fn sparse_legacy_records_still_render() {
        let store = Arc::new(MemoryStore::new());
        store
            .seed_interview(json!({
                "id": "legacy-1",
                "job_id": "req-legacy",
                "status": "In Progress",
                "scheduled_at": null,
            }))
            .unwrap();
        let service = service_with(store, quiet_notifier());

        let details = service.get_interview("legacy-1").await.unwrap();
        assert_eq!(details.interview.requirement_id, "req-legacy");
        assert_eq!(details.interview.status, InterviewStatus::InProgress);
        assert_eq!(details.candidate_name, "");
        assert_eq!(service.dangling_references().count(), 3);
    }

    #[tokio::test]
    async fn guarded_write_losing_a_race_is_a_conflict() {
        let mut store = MockInterviewStoreMock::new();
        store
            .expect_fetch_interview()
            .returning(|_| Envelope::success(json!({ "id": "iv-1", "status": "scheduled" })));
        store
            .expect_set_interview_status()
            .times(1)
            .returning(|_, _, _| Envelope::empty());
        let directory = Arc::new(MemoryStore::new());
        let service = InterviewService::new(
            Arc::new(store),
            directory,
            quiet_notifier(),
            DanglingReferences::default(),
        );

        let result = service
            .update_interview_status(
                &SessionContext::anonymous(),
                "iv-1",
                InterviewStatus::InProgress,
            )
            .await;
        assert!(matches!(result, Err(Error::Conflict(_))));
    }

    #[tokio::test]
    async fn store_failure_surfaces_as_store_error_with_notice() {
        let mut store = MockInterviewStoreMock::new();
        store
            .expect_list_interviews()
            .returning(|_| Envelope::failure(StoreError::with_code("connection reset", "08006")));
        let mut notifier = MockNotifierMock::new();
        notifier
            .expect_notify()
            .withf(|n| n.level == NoticeLevel::Error && n.message.contains("connection reset"))
            .times(1)
            .returning(|_| ());
        let service = InterviewService::new(
            Arc::new(store),
            Arc::new(MemoryStore::new()),
            Arc::new(notifier),
            DanglingReferences::default(),
        );

        let result = service.list_interviews(&InterviewFilter::default()).await;
        assert!(matches!(result, Err(Error::Store(_))));
    }

    #[tokio::test]
    async fn successful_mutation_emits_info_notice() {
        let mut notifier = MockNotifierMock::new();
        notifier
            .expect_notify()
            .withf(|n| n.level == NoticeLevel::Info && n.title == "Interview scheduled")
            .times(1)
            .returning(|_| ());
        let service = service_with(Arc::new(MemoryStore::new()), Arc::new(notifier));
        assert_ok!(
            service
                .schedule_interview(
                    &SessionContext::user("hr-7", crate::models::session::Role::Organization),
                    schedule_payload(time::now() + Duration::hours(2)),
                )
                .await
        );
    }

    #[tokio::test]
    async fn feedback_is_accepted_after_marking_completed() {
        let service = service_with(Arc::new(MemoryStore::new()), quiet_notifier());
        let ctx = SessionContext::anonymous();
        let interview = scheduled(&service).await;

        let completed = service
            .update_interview_status(&ctx, &interview.id, InterviewStatus::Completed)
            .await
            .unwrap();
        assert!(completed.feedback.is_none());
        assert!(matches!(
            service.get_evaluation(&interview.id).await,
            Err(Error::NotFound(_))
        ));

        let done = service.add_feedback(&ctx, &interview.id, feedback(4)).await.unwrap();
        assert_eq!(done.status, InterviewStatus::Completed);
        assert_eq!(done.feedback.as_ref().map(|f| f.rating), Some(4));
        assert_eq!(service.get_evaluation(&interview.id).await.unwrap().score, 4);

        let again = service.add_feedback(&ctx, &interview.id, feedback(5)).await;
        assert!(matches!(again, Err(Error::Conflict(_))));
    }

    #[tokio::test]
    async fn canceled_interview_does_not_accept_feedback() {
        let service = service_with(Arc::new(MemoryStore::new()), quiet_notifier());
        let ctx = SessionContext::anonymous();
        let interview = scheduled(&service).await;
        service.cancel_interview(&ctx, &interview.id).await.unwrap();

        let result = service.add_feedback(&ctx, &interview.id, feedback(3)).await;
        assert!(matches!(result, Err(Error::IllegalTransition { .. })));
    }

    #[tokio::test]
    async fn stored_no_show_renders_and_can_still_be_canceled() {
        let store = Arc::new(MemoryStore::new());
        store
            .seed_interview(json!({
                "id": "L1",
                "status": "no_show",
                "scheduled_at": "2099-01-01T10:00:00Z",
            }))
            .unwrap();
        let service = service_with(store.clone(), quiet_notifier());
        let dashboard = DashboardService::new(store.clone(), store.clone(), store);

        let details = service.get_interview("L1").await.unwrap();
        assert_eq!(details.interview.status, InterviewStatus::NoShow);
        assert_eq!(
            serde_json::to_value(&details.interview).unwrap()["status"],
            "No Show"
        );

        let summary = dashboard.admin_summary().await.unwrap();
        assert_eq!(summary.interviews.upcoming, 0);
        assert_eq!(summary.interviews.interrupted, 1);

        let ctx = SessionContext::anonymous();
        let started = service
            .update_interview_status(&ctx, "L1", InterviewStatus::InProgress)
            .await;
        assert!(matches!(started, Err(Error::IllegalTransition { .. })));
        let canceled = service.cancel_interview(&ctx, "L1").await.unwrap();
        assert_eq!(canceled.status, InterviewStatus::Canceled);
    }

    #[tokio::test]
    async fn unrecognised_stored_status_is_frozen() {
        let store = Arc::new(MemoryStore::new());
        store
            .seed_interview(json!({
                "interview_id": "L2",
                "status": "lunch_break",
                "scheduled_at": "2099-01-01T10:00:00Z",
            }))
            .unwrap();
        let service = service_with(store.clone(), quiet_notifier());
        let ctx = SessionContext::anonymous();

        let details = service.get_interview("L2").await.unwrap();
        assert_eq!(details.interview.status, InterviewStatus::Unknown);

        let canceled = service.cancel_interview(&ctx, "L2").await;
        assert!(matches!(canceled, Err(Error::IllegalTransition { .. })));
        let moved = service
            .reschedule_interview(&ctx, "L2", time::now() + Duration::days(2))
            .await;
        assert!(matches!(moved, Err(Error::IllegalTransition { .. })));
        let rated = service.add_feedback(&ctx, "L2", feedback(4)).await;
        assert!(matches!(rated, Err(Error::IllegalTransition { .. })));

        let row = store.fetch_interview("L2").await.data.unwrap();
        assert_eq!(row["status"], "lunch_break");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_reschedules_are_all_counted() {
        const MOVES: usize = 16;
        let service = service_with(Arc::new(MemoryStore::new()), quiet_notifier());
        let interview = scheduled(&service).await;

        let handles: Vec<_> = (0..MOVES)
            .map(|n| {
                let service = service.clone();
                let id = interview.id.clone();
                tokio::spawn(async move {
                    let at = time::now() + Duration::days(2) + Duration::hours(n as i64);
                    service
                        .reschedule_interview(&SessionContext::anonymous(), &id, at)
                        .await
                })
            })
            .collect();
        for handle in handles {
            assert_ok!(handle.await.unwrap());
        }

        let reloaded = service.get_interview(&interview.id).await.unwrap();
        assert_eq!(reloaded.interview.reschedule_count as usize, MOVES);
        assert_eq!(reloaded.interview.status, InterviewStatus::Rescheduled);
    }

    #[tokio::test]
    async fn schedule_move_and_rate_end_to_end() {
        let service = service_with(Arc::new(MemoryStore::new()), quiet_notifier());
        let ctx = SessionContext::anonymous();
        let interview = service
            .schedule_interview(&ctx, schedule_payload(time::now() + Duration::hours(24)))
            .await
            .unwrap();
        assert_eq!(interview.status, InterviewStatus::Scheduled);

        let target = time::now() + Duration::hours(48);
        let moved = service
            .reschedule_interview(&ctx, &interview.id, target)
            .await
            .unwrap();
        assert_eq!(moved.status, InterviewStatus::Rescheduled);
        assert_eq!(moved.reschedule_count, 1);
        assert_eq!(moved.scheduled_at.timestamp_millis(), target.timestamp_millis());

        let rated = service.add_feedback(&ctx, &interview.id, feedback(4)).await.unwrap();
        assert_eq!(rated.status, InterviewStatus::Completed);
        assert_eq!(rated.reschedule_count, 1);
        assert_eq!(rated.feedback.as_ref().map(|f| f.rating), Some(4));

        let evaluation = service.get_evaluation(&interview.id).await.unwrap();
        assert_eq!(evaluation.score, 4);
        assert_eq!(evaluation.interview_id, interview.id);
    }
}
