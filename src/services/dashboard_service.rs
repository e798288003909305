use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::candidate::{Candidate, CandidateStatus};
use crate::models::interview::{Interview, InterviewStatus};
use crate::models::requirement::{Requirement, RequirementStatus};
use crate::models::ticket::{Ticket, TicketStatus};
use crate::store::{DirectoryStore, InterviewFilter, InterviewStore, TicketFilter, TicketStore};
use crate::utils::time;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InterviewCounts {
    pub total: usize,
    pub upcoming: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub canceled: usize,
    pub rescheduled: usize,
    /// No-show, technical issue or on hold.
    pub interrupted: usize,
}

impl InterviewCounts {
    /// Upcoming means open (scheduled or rescheduled) and dated after `now`.
    pub fn tally(interviews: &[Interview], now: DateTime<Utc>) -> Self {
        interviews.iter().fold(Self::default(), |mut counts, interview| {
            counts.total += 1;
            if interview.status.is_open() && interview.scheduled_at > now {
                counts.upcoming += 1;
            }
            match interview.status {
                InterviewStatus::InProgress => counts.in_progress += 1,
                InterviewStatus::Completed => counts.completed += 1,
                InterviewStatus::Canceled => counts.canceled += 1,
                InterviewStatus::Rescheduled => counts.rescheduled += 1,
                status if status.is_interrupted() => counts.interrupted += 1,
                _ => {}
            }
            counts
        })
    }
}

/// Candidate count per status label; every status is present.
pub fn candidate_funnel(candidates: &[Candidate]) -> BTreeMap<String, usize> {
    let mut funnel: BTreeMap<String, usize> = CandidateStatus::ALL
        .iter()
        .map(|s| (s.label().to_string(), 0))
        .collect();
    for candidate in candidates {
        *funnel.entry(candidate.status.label().to_string()).or_default() += 1;
    }
    funnel
}

/// Mean feedback rating over interviews that carry feedback.
pub fn average_rating(interviews: &[Interview]) -> Option<f64> {
    let ratings: Vec<i32> = interviews
        .iter()
        .filter_map(|i| i.feedback.as_ref().map(|f| f.rating))
        .collect();
    if ratings.is_empty() {
        return None;
    }
    Some(ratings.iter().sum::<i32>() as f64 / ratings.len() as f64)
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminSummary {
    pub interviews: InterviewCounts,
    pub interviewers: usize,
    pub candidates: usize,
    pub requirements: usize,
    pub pending_requirements: usize,
    pub candidates_by_status: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InterviewerSummary {
    pub interviewer_id: String,
    pub interviews: InterviewCounts,
    pub average_rating: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequirementSummary {
    pub requirement_id: String,
    pub title: String,
    pub status: RequirementStatus,
    pub interviews: InterviewCounts,
    pub candidates_by_status: BTreeMap<String, usize>,
}

/// Everything raised under one company. A company with no requirements yet
/// reports zeros.
#[derive(Debug, Clone, Serialize)]
pub struct OrganizationSummary {
    pub company_id: String,
    pub requirements: usize,
    pub open_requirements: usize,
    pub candidates: usize,
    pub interviews: InterviewCounts,
    pub open_tickets: usize,
    pub escalated_tickets: usize,
}

#[derive(Clone)]
pub struct DashboardService {
    interviews: Arc<dyn InterviewStore>,
    directory: Arc<dyn DirectoryStore>,
    tickets: Arc<dyn TicketStore>,
}

impl DashboardService {
    pub fn new(
        interviews: Arc<dyn InterviewStore>,
        directory: Arc<dyn DirectoryStore>,
        tickets: Arc<dyn TicketStore>,
    ) -> Self {
        Self {
            interviews,
            directory,
            tickets,
        }
    }

    pub async fn admin_summary(&self) -> Result<AdminSummary> {
        let filter = InterviewFilter::default();
        let (interviews, interviewers, candidates, requirements) = tokio::join!(
            self.interviews.list_interviews(&filter),
            self.directory.list_interviewers(),
            self.directory.list_candidates(None),
            self.directory.list_requirements(None),
        );

        let interviews: Vec<Interview> = rows(interviews.into_result())?
            .iter()
            .map(Interview::from_record)
            .collect();
        let candidates: Vec<Candidate> = rows(candidates.into_result())?
            .iter()
            .map(Candidate::from_record)
            .collect();
        let requirements: Vec<Requirement> = rows(requirements.into_result())?
            .iter()
            .map(Requirement::from_record)
            .collect();
        let interviewers = rows(interviewers.into_result())?.len();

        Ok(AdminSummary {
            interviews: InterviewCounts::tally(&interviews, time::now()),
            interviewers,
            candidates: candidates.len(),
            requirements: requirements.len(),
            pending_requirements: requirements
                .iter()
                .filter(|r| r.status == RequirementStatus::Pending)
                .count(),
            candidates_by_status: candidate_funnel(&candidates),
        })
    }

    pub async fn interviewer_summary(&self, interviewer_id: &str) -> Result<InterviewerSummary> {
        let filter = InterviewFilter {
            interviewer_id: Some(interviewer_id.to_string()),
            ..Default::default()
        };
        let interviews: Vec<Interview> =
            rows(self.interviews.list_interviews(&filter).await.into_result())?
                .iter()
                .map(Interview::from_record)
                .collect();

        Ok(InterviewerSummary {
            interviewer_id: interviewer_id.to_string(),
            interviews: InterviewCounts::tally(&interviews, time::now()),
            average_rating: average_rating(&interviews),
        })
    }

    pub async fn requirement_summary(&self, requirement_id: &str) -> Result<RequirementSummary> {
        let requirement = self
            .directory
            .fetch_requirement(requirement_id)
            .await
            .into_result()?
            .map(|r| Requirement::from_record(&r))
            .ok_or_else(|| Error::NotFound(format!("Requirement {} not found", requirement_id)))?;

        let filter = InterviewFilter {
            requirement_id: Some(requirement_id.to_string()),
            ..Default::default()
        };
        let (interviews, candidates) = tokio::join!(
            self.interviews.list_interviews(&filter),
            self.directory.list_candidates(Some(requirement_id)),
        );
        let interviews: Vec<Interview> = rows(interviews.into_result())?
            .iter()
            .map(Interview::from_record)
            .collect();
        let candidates: Vec<Candidate> = rows(candidates.into_result())?
            .iter()
            .map(Candidate::from_record)
            .collect();

        Ok(RequirementSummary {
            requirement_id: requirement.id,
            title: requirement.title,
            status: requirement.status,
            interviews: InterviewCounts::tally(&interviews, time::now()),
            candidates_by_status: candidate_funnel(&candidates),
        })
    }
}

impl DashboardService {
    /// Interviews and candidates belong to a company through their
    /// requirement.
    pub async fn organization_summary(&self, company_id: &str) -> Result<OrganizationSummary> {
        let company_id = company_id.trim();
        if company_id.is_empty() {
            return Err(Error::BadRequest("Company id cannot be empty".to_string()));
        }
        let interview_filter = InterviewFilter::default();
        let ticket_filter = TicketFilter {
            company_id: Some(company_id.to_string()),
            ..Default::default()
        };
        let (requirements, interviews, candidates, tickets) = tokio::join!(
            self.directory.list_requirements(None),
            self.interviews.list_interviews(&interview_filter),
            self.directory.list_candidates(None),
            self.tickets.list_tickets(&ticket_filter),
        );

        let requirements: Vec<Requirement> = rows(requirements.into_result())?
            .iter()
            .map(Requirement::from_record)
            .filter(|r| r.company_id == company_id)
            .collect();
        let owned: HashSet<&str> = requirements.iter().map(|r| r.id.as_str()).collect();

        let interviews: Vec<Interview> = rows(interviews.into_result())?
            .iter()
            .map(Interview::from_record)
            .filter(|i| owned.contains(i.requirement_id.as_str()))
            .collect();
        let candidates = rows(candidates.into_result())?
            .iter()
            .map(Candidate::from_record)
            .filter(|c| owned.contains(c.requirement_id.as_str()))
            .count();
        let tickets: Vec<TicketStatus> = rows(tickets.into_result())?
            .iter()
            .map(|t| Ticket::from_record(t).status)
            .collect();

        Ok(OrganizationSummary {
            company_id: company_id.to_string(),
            requirements: requirements.len(),
            open_requirements: requirements
                .iter()
                .filter(|r| !r.status.is_closed())
                .count(),
            candidates,
            interviews: InterviewCounts::tally(&interviews, time::now()),
            open_tickets: tickets.iter().filter(|s| s.is_open()).count(),
            escalated_tickets: tickets
                .iter()
                .filter(|s| **s == TicketStatus::Escalated)
                .count(),
        })
    }
}

fn rows<T, E: Into<Error>>(result: std::result::Result<Option<Vec<T>>, E>) -> Result<Vec<T>> {
    result.map(Option::unwrap_or_default).map_err(Into::into)
}
