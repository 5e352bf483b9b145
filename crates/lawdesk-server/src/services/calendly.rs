//! Calendly REST client. The access token stays on the server; the chat
//! client only ever sees the summarized slots response.

use lawdesk_core::EventTypeSummary;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::config::CalendlyConfig;

#[derive(Debug, Error)]
pub enum CalendlyError {
    #[error("Calendly access token not configured")]
    NotConfigured,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Calendly returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

pub type Result<T> = std::result::Result<T, CalendlyError>;

#[derive(Debug, Clone, Deserialize)]
pub struct CalendlyEventType {
    pub name: String,
    #[serde(default)]
    pub duration: u32,
    #[serde(default)]
    pub description_plain: Option<String>,
    #[serde(default)]
    pub description_html: Option<String>,
    pub scheduling_url: String,
    #[serde(default)]
    pub uri: Option<String>,
}

impl From<CalendlyEventType> for EventTypeSummary {
    fn from(event: CalendlyEventType) -> Self {
        EventTypeSummary {
            name: event.name,
            duration: event.duration,
            description: event.description_plain.or(event.description_html),
            scheduling_url: event.scheduling_url,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Collection<T> {
    #[serde(default = "Vec::new")]
    collection: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct Resource<T> {
    resource: T,
}

#[derive(Debug, Deserialize)]
struct UserResource {
    uri: String,
}

#[derive(Debug, Deserialize)]
struct ScheduledEventResource {
    uri: String,
    #[serde(default)]
    join_url: Option<String>,
}

/// Body of `POST /api/calendly-booking`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub name: String,
    pub email: String,
    pub event_type_uri: String,
    pub start_time: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookingConfirmation {
    pub event_uri: String,
    pub join_url: Option<String>,
}

pub struct CalendlyClient {
    http: Client,
    config: CalendlyConfig,
}

impl CalendlyClient {
    pub fn new(http: Client, config: CalendlyConfig) -> Self {
        Self { http, config }
    }

    pub fn is_configured(&self) -> bool {
        self.config.access_token.is_some()
    }

    fn token(&self) -> Result<&str> {
        self.config
            .access_token
            .as_deref()
            .ok_or(CalendlyError::NotConfigured)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(CalendlyError::Status { status, body })
    }

    /// The configured user URI, or the token owner's URI from `/users/me`.
    pub async fn current_user_uri(&self) -> Result<String> {
        if let Some(uri) = &self.config.user_uri {
            return Ok(uri.clone());
        }

        let response = self
            .http
            .get(self.url("/users/me"))
            .bearer_auth(self.token()?)
            .send()
            .await?;
        let user: Resource<UserResource> = Self::check(response).await?.json().await?;
        log::debug!("Resolved Calendly user {}", user.resource.uri);
        Ok(user.resource.uri)
    }

    pub async fn active_event_types(&self, user_uri: &str) -> Result<Vec<CalendlyEventType>> {
        let response = self
            .http
            .get(self.url("/event_types"))
            .bearer_auth(self.token()?)
            .query(&[("user", user_uri), ("active", "true")])
            .send()
            .await?;
        let events: Collection<CalendlyEventType> = Self::check(response).await?.json().await?;
        Ok(events.collection)
    }

    /// Active event types of the current user, summarized for the client.
    pub async fn event_summaries(&self) -> Result<Vec<EventTypeSummary>> {
        let user_uri = self.current_user_uri().await?;
        let events = self.active_event_types(&user_uri).await?;
        Ok(events.into_iter().map(EventTypeSummary::from).collect())
    }

    pub async fn create_booking(&self, request: &BookingRequest) -> Result<BookingConfirmation> {
        let body = json!({
            "event_type": request.event_type_uri,
            "start_time": request.start_time,
            "invitee": {
                "name": request.name,
                "email": request.email,
            }
        });

        let response = self
            .http
            .post(self.url("/scheduled_events"))
            .bearer_auth(self.token()?)
            .json(&body)
            .send()
            .await?;
        let created: Resource<ScheduledEventResource> =
            Self::check(response).await?.json().await?;

        Ok(BookingConfirmation {
            event_uri: created.resource.uri,
            join_url: created.resource.join_url,
        })
    }
}
