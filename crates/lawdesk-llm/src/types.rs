use serde::Deserialize;

/// One decoded `data:` payload of a chat-completion stream.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamChunk {
    /// A fragment of assistant text.
    Delta(String),
    /// Tool-call fragments, keyed by their stream index.
    ToolCalls(Vec<StreamToolCall>),
    /// The `[DONE]` sentinel.
    Done,
    /// An `{"error": "..."}` event emitted by the relay.
    Error(String),
}

/// A partial tool call as it appears in a streaming delta.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct StreamToolCall {
    #[serde(default)]
    pub index: u32,
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub tool_type: Option<String>,
    pub function: Option<StreamFunctionCall>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct StreamFunctionCall {
    pub name: Option<String>,
    pub arguments: Option<String>,
}
