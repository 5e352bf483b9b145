//! lawdesk-llm - streaming chat completions against OpenAI-compatible APIs
//!
//! The server side uses [`CompletionUpstream`] to open an upstream stream and
//! re-emit it as [`RelayFrame`]s. The client side uses the same SSE adapter
//! together with [`parse_stream_data`] and [`StreamToolAccumulator`].

pub mod provider;
pub mod providers;
pub mod relay;
pub mod types;

pub use provider::{CompletionUpstream, LLMError, RelayStream, Result};
pub use providers::common::openai_compat::{
    build_chat_request, parse_stream_data, ChatCompletionRequest, CompletionOptions,
};
pub use providers::common::sse::{stream_from_sse, SseStream};
pub use providers::common::stream_tool_accumulator::StreamToolAccumulator;
pub use providers::openai::OpenAIUpstream;
pub use relay::RelayFrame;
pub use types::{StreamChunk, StreamFunctionCall, StreamToolCall};
