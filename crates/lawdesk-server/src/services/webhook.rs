use chrono::{SecondsFormat, Utc};
use lawdesk_core::IntakeWebhookRequest;
use reqwest::Client;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct ForwardPayload<'a> {
    name: Option<&'a str>,
    email: Option<&'a str>,
    phone: Option<&'a str>,
    issue: Option<&'a str>,
    transcript: &'a [lawdesk_core::ConversationMessage],
    timestamp: String,
}

/// Forwards chat intake submissions to the configured outbound webhook.
pub struct WebhookForwarder {
    http: Client,
    url: Option<String>,
}

impl WebhookForwarder {
    pub fn new(http: Client, url: Option<String>) -> Self {
        Self { http, url }
    }

    pub fn is_configured(&self) -> bool {
        self.url.is_some()
    }

    /// Best-effort delivery. Returns whether the webhook accepted the payload;
    /// failures are logged and never surfaced to the submitter.
    pub async fn forward(&self, request: &IntakeWebhookRequest) -> bool {
        let Some(url) = &self.url else {
            log::debug!("Intake webhook not configured; submission kept local");
            return false;
        };

        let payload = ForwardPayload {
            name: request.fields.name.as_deref(),
            email: request.fields.email.as_deref(),
            phone: request.fields.phone.as_deref(),
            issue: request.fields.issue.as_deref(),
            transcript: &request.transcript,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        };

        match self.http.post(url).json(&payload).send().await {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                log::error!("Intake webhook rejected payload: HTTP {}", response.status());
                false
            }
            Err(e) => {
                log::error!("Intake webhook error: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lawdesk_core::{ConversationMessage, IntakeFields};
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn forwards_fields_transcript_and_timestamp() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/hooks/intake"))
            .and(body_partial_json(serde_json::json!({
                "name": "Ana",
                "email": "ana@example.com",
                "transcript": [{"role": "user", "content": "Quiet title question"}]
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let forwarder = WebhookForwarder::new(
            Client::new(),
            Some(format!("{}/hooks/intake", server.uri())),
        );
        let request = IntakeWebhookRequest::new(
            IntakeFields {
                name: Some("Ana".to_string()),
                email: Some("ana@example.com".to_string()),
                ..Default::default()
            },
            vec![ConversationMessage::user("Quiet title question")],
        );

        assert!(forwarder.forward(&request).await);

        let received = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
        assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
        assert!(body["phone"].is_null());
    }

    #[tokio::test]
    async fn unconfigured_forwarder_does_nothing() {
        let forwarder = WebhookForwarder::new(Client::new(), None);
        assert!(!forwarder.is_configured());
        assert!(!forwarder.forward(&IntakeWebhookRequest::default()).await);
    }
}
