use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;
use thiserror::Error;

use crate::providers::common::openai_compat::ChatCompletionRequest;
use crate::relay::RelayFrame;

#[derive(Error, Debug)]
pub enum LLMError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("API error: {0}")]
    Api(String),
}

pub type Result<T> = std::result::Result<T, LLMError>;

pub type RelayStream = Pin<Box<dyn Stream<Item = Result<RelayFrame>> + Send>>;

/// An upstream chat-completion endpoint that can be relayed frame by frame.
#[async_trait]
pub trait CompletionUpstream: Send + Sync {
    /// Open a streaming completion. Non-success statuses are returned as
    /// [`LLMError::Api`] before any frame is produced.
    async fn stream_chat(&self, request: &ChatCompletionRequest) -> Result<RelayStream>;

    fn model(&self) -> &str;
}
