//! OpenAI-compatible request serialization and stream chunk parsing.
//!
//! The relay builds its upstream body here, and the chat client decodes the
//! relayed `data:` payloads with [`parse_stream_data`].

use lawdesk_core::{default_tool_definitions, ToolDefinition, WireMessage};
use serde::{Deserialize, Serialize};

use crate::types::{StreamChunk, StreamToolCall};

/// Sampling settings applied to every relayed request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionOptions {
    pub temperature: f64,
    pub max_tokens: u32,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            temperature: 0.4,
            max_tokens: 1500,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<WireMessage>,
    pub temperature: f64,
    pub max_tokens: u32,
    pub stream: bool,
    pub tools: Vec<ToolDefinition>,
}

/// Build the streaming request body: the system prompt goes first, followed
/// by the client's messages in order. Missing or empty `tools` attach the
/// default tool definitions.
pub fn build_chat_request(
    model: &str,
    system_prompt: &str,
    messages: &[WireMessage],
    tools: Option<Vec<ToolDefinition>>,
    options: CompletionOptions,
) -> ChatCompletionRequest {
    let mut outbound = Vec::with_capacity(messages.len() + 1);
    outbound.push(WireMessage::system(system_prompt));
    outbound.extend_from_slice(messages);

    ChatCompletionRequest {
        model: model.to_string(),
        messages: outbound,
        temperature: options.temperature,
        max_tokens: options.max_tokens,
        stream: true,
        tools: tools
            .filter(|tools| !tools.is_empty())
            .unwrap_or_else(default_tool_definitions),
    }
}

// --- streaming chunk parsing ---

#[derive(Debug, Deserialize)]
struct CompatStreamChunk {
    #[serde(default)]
    choices: Vec<CompatChoice>,
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct CompatChoice {
    #[serde(default)]
    delta: CompatDelta,
}

#[derive(Debug, Deserialize, Default)]
struct CompatDelta {
    content: Option<String>,
    tool_calls: Option<Vec<StreamToolCall>>,
}

/// Parse one SSE `data:` payload leniently.
///
/// - `"[DONE]"` -> `Some(StreamChunk::Done)`
/// - `{"error": ...}` -> `Some(StreamChunk::Error)`
/// - invalid JSON or a delta with nothing in it -> `None`
pub fn parse_stream_data(data: &str) -> Option<StreamChunk> {
    let data = data.trim();
    if data.is_empty() {
        return None;
    }
    if data == "[DONE]" {
        return Some(StreamChunk::Done);
    }

    let chunk: CompatStreamChunk = match serde_json::from_str(data) {
        Ok(chunk) => chunk,
        Err(e) => {
            log::debug!("Skipping malformed stream payload: {}", e);
            return None;
        }
    };

    if let Some(error) = chunk.error {
        let message = match error {
            serde_json::Value::String(message) => message,
            other => other
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| other.to_string()),
        };
        return Some(StreamChunk::Error(message));
    }

    let choice = chunk.choices.into_iter().next()?;

    if let Some(calls) = choice.delta.tool_calls {
        if !calls.is_empty() {
            return Some(StreamChunk::ToolCalls(calls));
        }
    }

    match choice.delta.content {
        Some(content) if !content.is_empty() => Some(StreamChunk::Delta(content)),
        _ => None,
    }
}
