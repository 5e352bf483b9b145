//! Payloads of the local intake webhook relay.

use serde::{Deserialize, Serialize};

use crate::message::ConversationMessage;
use crate::tools::IntakeFields;

/// Body of `POST /api/intake-webhook`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct IntakeWebhookRequest {
    #[serde(flatten)]
    pub fields: IntakeFields,
    #[serde(default)]
    pub transcript: Vec<ConversationMessage>,
}

impl IntakeWebhookRequest {
    pub fn new(fields: IntakeFields, transcript: Vec<ConversationMessage>) -> Self {
        Self { fields, transcript }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WebhookAck {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

impl WebhookAck {
    pub fn received() -> Self {
        Self {
            success: true,
            message: "Information received. We will contact you soon.".to_string(),
        }
    }
}
