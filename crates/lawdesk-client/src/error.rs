use lawdesk_core::CoreError;
use lawdesk_llm::LLMError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Stream error: {0}")]
    Stream(#[from] LLMError),

    #[error("Storage error: {0}")]
    Storage(#[from] CoreError),

    #[error("Relay returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Relay reported an error: {0}")]
    Relay(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ClientError>;
