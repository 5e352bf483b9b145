use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("System messages cannot be stored in conversation history")]
    SystemMessageRejected,

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid tool arguments for '{tool}': {reason}")]
    InvalidToolArguments { tool: String, reason: String },
}

pub type Result<T> = std::result::Result<T, CoreError>;
