//! Submission endpoints
//!
//! The contact step is posted to a form service (best-effort, the wizard
//! continues on failure). The final submission is posted as JSON to the
//! intake webhook and must succeed before the saved form is cleared.

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::Serialize;

use crate::error::{Result, WizardError};
use crate::form::{ContactInfo, IntakeForm};

/// Final webhook body: every form field plus the submission time.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload<'a> {
    #[serde(flatten)]
    pub form: &'a IntakeForm,
    pub submitted_at: String,
}

impl<'a> SubmissionPayload<'a> {
    pub fn now(form: &'a IntakeForm) -> Self {
        Self {
            form,
            submitted_at: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        }
    }
}

#[async_trait]
pub trait IntakeSubmitter: Send + Sync {
    async fn submit_contact(&self, contact: &ContactInfo) -> Result<()>;

    async fn submit_final(&self, payload: &SubmissionPayload<'_>) -> Result<()>;
}

pub struct WebhookSubmitter {
    client: Client,
    contact_endpoint: Option<String>,
    webhook_url: String,
}

impl WebhookSubmitter {
    pub fn new(client: Client, webhook_url: impl Into<String>) -> Self {
        Self {
            client,
            contact_endpoint: None,
            webhook_url: webhook_url.into(),
        }
    }

    /// Form service (e.g. Formspree) that receives the contact step.
    pub fn with_contact_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.contact_endpoint = Some(endpoint.into());
        self
    }

    async fn check(response: reqwest::Response) -> Result<()> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(WizardError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl IntakeSubmitter for WebhookSubmitter {
    async fn submit_contact(&self, contact: &ContactInfo) -> Result<()> {
        let Some(endpoint) = &self.contact_endpoint else {
            log::debug!("No contact endpoint configured, skipping contact submission");
            return Ok(());
        };

        let response = self
            .client
            .post(endpoint)
            .header(header::ACCEPT, "application/json")
            .form(contact)
            .send()
            .await?;
        Self::check(response).await
    }

    async fn submit_final(&self, payload: &SubmissionPayload<'_>) -> Result<()> {
        log::info!("Submitting intake form to webhook");
        let response = self
            .client
            .post(&self.webhook_url)
            .json(payload)
            .send()
            .await?;
        Self::check(response).await
    }
}
