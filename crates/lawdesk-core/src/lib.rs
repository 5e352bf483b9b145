//! lawdesk-core - shared types for the chat relay, chat client and intake wizard
//!
//! Holds the conversation model, tool definitions, the knowledge base used for
//! keyword context retrieval, and the key-value stores that stand in for
//! browser session/local storage.

pub mod conversation;
pub mod error;
pub mod firm;
pub mod knowledge;
pub mod message;
pub mod scheduling;
pub mod storage;
pub mod tools;
pub mod webhook;

pub use conversation::{ConversationState, DEFAULT_HISTORY_CAP};
pub use error::{CoreError, Result};
pub use firm::FirmProfile;
pub use knowledge::{extract_page, KnowledgeBase, KnowledgePage, DEFAULT_CONTEXT_MATCHES};
pub use message::{ConversationMessage, Role, WireMessage};
pub use scheduling::{
    booking_options, pick_consultation, BookingOption, EventTypeSummary, SlotsResponse,
    UnavailableReason,
};
pub use storage::{
    load_json, save_json, FileStore, KeyValueStore, MemoryStore, HISTORY_KEY, INTAKE_FORM_KEY,
    KNOWLEDGE_KEY,
};
pub use tools::{
    default_tool_definitions, FunctionCall, FunctionSchema, IntakeFields, ToolCall,
    ToolDefinition, ToolInvocation, BOOK_CONSULTATION, INTAKE_WEBHOOK,
};
pub use webhook::{IntakeWebhookRequest, WebhookAck};
