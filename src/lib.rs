pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;
pub mod utils;

use std::sync::Arc;

use crate::config::Config;
use crate::services::{
    candidate_service::CandidateService,
    dashboard_service::DashboardService,
    interview_service::{DanglingReferences, InterviewService},
    interviewer_service::InterviewerService,
    notification_service::{Notifier, TracingNotifier, WebhookNotifier},
    requirement_service::RequirementService,
    ticket_service::TicketService,
};
use crate::store::{DirectoryStore, HiringStore, InterviewStore, TicketStore};
use reqwest::Client;

#[derive(Clone)]
pub struct AppState {
    pub jwt_secret: Arc<str>,
    pub interview_service: InterviewService,
    pub requirement_service: RequirementService,
    pub candidate_service: CandidateService,
    pub interviewer_service: InterviewerService,
    pub dashboard_service: DashboardService,
    pub ticket_service: TicketService,
}

impl AppState {
    /// Wires every service to one store.
    pub fn with_store<S>(store: Arc<S>, notifier: Arc<dyn Notifier>, jwt_secret: &str) -> Self
    where
        S: HiringStore + 'static,
    {
        let interviews: Arc<dyn InterviewStore> = store.clone();
        let directory: Arc<dyn DirectoryStore> = store.clone();
        let tickets: Arc<dyn TicketStore> = store.clone();

        Self {
            jwt_secret: Arc::from(jwt_secret),
            interview_service: InterviewService::new(
                interviews.clone(),
                directory.clone(),
                notifier.clone(),
                DanglingReferences::default(),
            ),
            requirement_service: RequirementService::new(store.clone(), notifier.clone()),
            candidate_service: CandidateService::new(store.clone(), notifier.clone()),
            interviewer_service: InterviewerService::new(store.clone(), notifier.clone()),
            dashboard_service: DashboardService::new(interviews, directory, tickets.clone()),
            ticket_service: TicketService::new(tickets, store, notifier),
        }
    }

    pub fn dangling_references(&self) -> u64 {
        self.interview_service.dangling_references().count()
    }
}

/// Webhook delivery when `NOTIFY_WEBHOOK_URL` is set, log-only otherwise.
pub fn notifier_from_config(config: &Config) -> Arc<dyn Notifier> {
    match &config.notify_webhook_url {
        Some(url) => {
            let client = Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| Client::new());
            Arc::new(WebhookNotifier::new(
                client,
                url.clone(),
                config.webhook_secret.clone(),
            ))
        }
        None => Arc::new(TracingNotifier),
    }
}
