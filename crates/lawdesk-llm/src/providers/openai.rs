use async_trait::async_trait;
use reqwest::Client;

use crate::provider::{CompletionUpstream, LLMError, RelayStream, Result};
use crate::relay::RelayFrame;

use super::common::openai_compat::ChatCompletionRequest;
use super::common::sse::stream_from_sse;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

pub struct OpenAIUpstream {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAIUpstream {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }
}

#[async_trait]
impl CompletionUpstream for OpenAIUpstream {
    async fn stream_chat(&self, request: &ChatCompletionRequest) -> Result<RelayStream> {
        log::debug!(
            "Opening completion stream: model={}, messages={}, tools={}",
            request.model,
            request.messages.len(),
            request.tools.len()
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await?;
            return Err(LLMError::Api(format!("HTTP {}: {}", status, text)));
        }

        Ok(stream_from_sse(response, RelayFrame::from_upstream_data))
    }

    fn model(&self) -> &str {
        &self.model
    }
}
