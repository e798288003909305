use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Transient user-facing notification. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: title.into(),
            message: message.into(),
        }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notice: Notice);
}

/// Raises an error notice titled `title` and hands `err` back so callers can
/// return it.
pub async fn report_failure(notifier: &dyn Notifier, title: &str, err: Error) -> Error {
    notifier.notify(Notice::error(title, err.to_string())).await;
    err
}

/// Writes notices to the log. Default when no webhook is configured.
#[derive(Debug, Clone, Default)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Info => {
                tracing::info!(title = %notice.title, "{}", notice.message)
            }
            NoticeLevel::Error => {
                tracing::error!(title = %notice.title, "{}", notice.message)
            }
        }
    }
}

/// Logs every notice and POSTs it to `target_url` from a spawned task.
/// Delivery is best effort: failures are logged and not retried.
#[derive(Clone)]
pub struct WebhookNotifier {
    client: Client,
    target_url: String,
    secret: Option<String>,
}

impl WebhookNotifier {
    pub fn new(client: Client, target_url: String, secret: Option<String>) -> Self {
        Self {
            client,
            target_url,
            secret,
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, notice: Notice) {
        TracingNotifier.notify(notice.clone()).await;

        let mut request = self.client.post(&self.target_url).json(&notice);
        if let Some(secret) = &self.secret {
            request = request.header("X-Webhook-Secret", secret);
        }
        let target_url = self.target_url.clone();
        tokio::spawn(async move {
            match request.send().await {
                Ok(resp) if resp.status().is_success() => {}
                Ok(resp) => {
                    tracing::warn!(url = %target_url, status = resp.status().as_u16(), "notice webhook rejected")
                }
                Err(err) => {
                    tracing::warn!(url = %target_url, error = %err, "notice webhook delivery failed")
                }
            }
        });
    }
}
