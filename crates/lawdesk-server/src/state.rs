use lawdesk_llm::{CompletionUpstream, OpenAIUpstream};
use reqwest::Client;
use std::sync::Arc;

use crate::config::ServerConfig;
use crate::services::{CalendlyClient, WebhookForwarder};

/// Per-process state shared by every handler. Nothing in here is mutated
/// after startup.
pub struct AppState {
    pub config: ServerConfig,
    /// `None` when no API key is configured.
    pub upstream: Option<Arc<dyn CompletionUpstream>>,
    pub calendly: CalendlyClient,
    pub webhook: WebhookForwarder,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let http = Client::new();

        let upstream = config.openai_api_key.as_ref().map(|key| {
            log::info!(
                "Chat relay enabled: model={}, base_url={}",
                config.openai_model,
                config.openai_base_url
            );
            Arc::new(
                OpenAIUpstream::new(key.clone())
                    .with_base_url(config.openai_base_url.clone())
                    .with_model(config.openai_model.clone())
                    .with_client(http.clone()),
            ) as Arc<dyn CompletionUpstream>
        });
        if upstream.is_none() {
            log::warn!("OPENAI_API_KEY not set; /api/chat will answer 500");
        }

        let calendly = CalendlyClient::new(http.clone(), config.calendly.clone());
        if !calendly.is_configured() {
            log::warn!("CALENDLY_ACCESS_TOKEN not set; scheduling falls back to phone");
        }

        let webhook = WebhookForwarder::new(http, config.zapier_webhook_url.clone());

        Self {
            config,
            upstream,
            calendly,
            webhook,
        }
    }
}
