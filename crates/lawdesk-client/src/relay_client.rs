//! HTTP client for the lawdesk server.

use lawdesk_core::{
    IntakeWebhookRequest, KnowledgeBase, SlotsResponse, ToolDefinition, WebhookAck, WireMessage,
};
use lawdesk_llm::{parse_stream_data, stream_from_sse, SseStream, StreamChunk};
use reqwest::Client;
use serde::Serialize;

use crate::error::{ClientError, Result};

pub const CHAT_PATH: &str = "/api/chat";
pub const SLOTS_PATH: &str = "/api/calendly-slots";
pub const INTAKE_PATH: &str = "/api/intake-webhook";
pub const KNOWLEDGE_PATH: &str = "/data/knowledge.json";

#[derive(Debug, Serialize)]
struct ChatBody<'a> {
    messages: &'a [WireMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [ToolDefinition]>,
}

#[derive(Debug, Clone)]
pub struct RelayClient {
    client: Client,
    base_url: String,
}

impl RelayClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Open a chat stream. Each `data:` line is decoded on its own; lines
    /// that do not parse are skipped.
    pub async fn open_chat(
        &self,
        messages: &[WireMessage],
        tools: Option<&[ToolDefinition]>,
    ) -> Result<SseStream<StreamChunk>> {
        let response = self
            .client
            .post(self.url(CHAT_PATH))
            .json(&ChatBody { messages, tools })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(stream_from_sse(response, |line| Ok(parse_stream_data(line))))
    }

    pub async fn fetch_knowledge(&self) -> Result<KnowledgeBase> {
        let response = self
            .client
            .get(self.url(KNOWLEDGE_PATH))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    pub async fn calendly_slots(&self) -> Result<SlotsResponse> {
        let response = self
            .client
            .get(self.url(SLOTS_PATH))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    pub async fn submit_intake(&self, request: &IntakeWebhookRequest) -> Result<WebhookAck> {
        let response = self
            .client
            .post(self.url(INTAKE_PATH))
            .json(request)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }
}
