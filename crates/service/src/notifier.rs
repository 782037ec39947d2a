//! Failure notification side channel.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use unisync_core::{MAX_ERROR_BODY_LEN, NotifyConfig};

use crate::error::NotifyError;

const NOTIFY_TIMEOUT_SECS: u64 = 15;

/// Delivers a human alert carrying the error text of a failed run.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify_failure(&self, error: &str) -> Result<(), NotifyError>;
}

/// Build the notifier described by the configuration: a webhook when one is
/// set, otherwise a notifier that only logs.
///
/// # Errors
/// Returns [`NotifyError::Init`] if the HTTP client cannot be built.
pub fn notifier_from_config(config: &NotifyConfig) -> Result<Arc<dyn Notifier>, NotifyError> {
    match &config.webhook_url {
        Some(url) => Ok(Arc::new(WebhookNotifier::new(
            url.clone(),
            config.recipients.clone(),
            config.subject.clone(),
        )?)),
        None => Ok(Arc::new(LogNotifier)),
    }
}

/// Posts `{to, subject, html_content}` to a mail relay.
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
    recipients: Vec<String>,
    subject: String,
}

#[derive(Serialize)]
struct MailRequest<'a> {
    to: &'a [String],
    subject: &'a str,
    html_content: String,
}

impl WebhookNotifier {
    /// # Errors
    /// Returns [`NotifyError::Init`] if the HTTP client cannot be built.
    pub fn new(url: String, recipients: Vec<String>, subject: String) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(NOTIFY_TIMEOUT_SECS))
            .build()
            .map_err(|e| NotifyError::Init(e.to_string()))?;
        Ok(Self { client, url, recipients, subject })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify_failure(&self, error: &str) -> Result<(), NotifyError> {
        let request = MailRequest {
            to: &self.recipients,
            subject: &self.subject,
            html_content: failure_html(error),
        };
        let response = self.client.post(&self.url).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body = body.chars().take(MAX_ERROR_BODY_LEN).collect();
            return Err(NotifyError::Rejected { code: status.as_u16(), body });
        }
        tracing::info!(recipients = self.recipients.len(), "failure notification sent");
        Ok(())
    }
}

/// Used when no relay is configured: the alert goes to the log only.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify_failure(&self, error: &str) -> Result<(), NotifyError> {
        tracing::warn!(error, "no notification relay configured, failure alert logged only");
        Ok(())
    }
}

pub(crate) fn failure_html(error: &str) -> String {
    format!(
        "<p>Data was not loaded into the database.</p><p>Error: {}</p>",
        escape_html(error)
    )
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
