//! Tool definitions offered to the model and the invocations it sends back.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{CoreError, Result};

pub const BOOK_CONSULTATION: &str = "book_consultation";
pub const INTAKE_WEBHOOK: &str = "intake_webhook";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolDefinition {
    #[serde(rename = "type")]
    pub schema_type: String,
    pub function: FunctionSchema,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionSchema {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parameters: serde_json::Value,
}

impl ToolDefinition {
    pub fn function(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            schema_type: "function".to_string(),
            function: FunctionSchema {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }
}

/// The two tools attached when the caller supplies none.
pub fn default_tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::function(
            BOOK_CONSULTATION,
            "Help user book a free consultation",
            json!({
                "type": "object",
                "properties": {
                    "preferred_time": { "type": "string", "description": "Preferred consultation time" }
                }
            }),
        ),
        ToolDefinition::function(
            INTAKE_WEBHOOK,
            "Send intake information to Zapier",
            json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string" },
                    "email": { "type": "string" },
                    "phone": { "type": "string" },
                    "issue": { "type": "string" }
                }
            }),
        ),
    ]
}

/// A complete tool call assembled from stream fragments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub tool_type: String,
    pub function: FunctionCall,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    pub arguments: String,
}

/// Intake details collected by the model.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct IntakeFields {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub issue: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ToolInvocation {
    BookConsultation { preferred_time: Option<String> },
    IntakeWebhook(IntakeFields),
}

#[derive(Deserialize, Default)]
struct BookConsultationArgs {
    #[serde(default)]
    preferred_time: Option<String>,
}

impl ToolInvocation {
    pub fn name(&self) -> &'static str {
        match self {
            ToolInvocation::BookConsultation { .. } => BOOK_CONSULTATION,
            ToolInvocation::IntakeWebhook(_) => INTAKE_WEBHOOK,
        }
    }
}

impl TryFrom<&ToolCall> for ToolInvocation {
    type Error = CoreError;

    fn try_from(call: &ToolCall) -> Result<Self> {
        let raw = call.function.arguments.trim();
        let raw = if raw.is_empty() { "{}" } else { raw };
        let invalid = |e: serde_json::Error| CoreError::InvalidToolArguments {
            tool: call.function.name.clone(),
            reason: e.to_string(),
        };

        match call.function.name.as_str() {
            BOOK_CONSULTATION => {
                let args: BookConsultationArgs = serde_json::from_str(raw).map_err(invalid)?;
                Ok(ToolInvocation::BookConsultation {
                    preferred_time: args.preferred_time,
                })
            }
            INTAKE_WEBHOOK => {
                let fields: IntakeFields = serde_json::from_str(raw).map_err(invalid)?;
                Ok(ToolInvocation::IntakeWebhook(fields))
            }
            other => Err(CoreError::UnknownTool(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(name: &str, arguments: &str) -> ToolCall {
        ToolCall {
            id: "call_1".to_string(),
            tool_type: "function".to_string(),
            function: FunctionCall {
                name: name.to_string(),
                arguments: arguments.to_string(),
            },
        }
    }

    #[test]
    fn default_tools_serialize_in_openai_shape() {
        let tools = serde_json::to_value(default_tool_definitions()).unwrap();
        assert_eq!(tools.as_array().unwrap().len(), 2);
        assert_eq!(tools[0]["type"], "function");
        assert_eq!(tools[0]["function"]["name"], BOOK_CONSULTATION);
        assert_eq!(tools[1]["function"]["name"], INTAKE_WEBHOOK);
        assert!(tools[1]["function"]["parameters"]["properties"]["email"].is_object());
    }

    #[test]
    fn book_consultation_accepts_empty_arguments() {
        let invocation = ToolInvocation::try_from(&call(BOOK_CONSULTATION, "")).unwrap();
        assert_eq!(
            invocation,
            ToolInvocation::BookConsultation {
                preferred_time: None
            }
        );
    }

    #[test]
    fn intake_webhook_parses_fields() {
        let invocation = ToolInvocation::try_from(&call(
            INTAKE_WEBHOOK,
            r#"{"name":"Ana","email":"ana@example.com","issue":"boundary dispute"}"#,
        ))
        .unwrap();

        match invocation {
            ToolInvocation::IntakeWebhook(fields) => {
                assert_eq!(fields.name.as_deref(), Some("Ana"));
                assert_eq!(fields.phone, None);
                assert_eq!(fields.issue.as_deref(), Some("boundary dispute"));
            }
            other => panic!("expected intake webhook, got {other:?}"),
        }
    }

    #[test]
    fn unknown_tool_is_an_error() {
        let err = ToolInvocation::try_from(&call("delete_everything", "{}")).unwrap_err();
        assert!(matches!(err, CoreError::UnknownTool(name) if name == "delete_everything"));
    }

    #[test]
    fn truncated_arguments_are_invalid() {
        let err = ToolInvocation::try_from(&call(INTAKE_WEBHOOK, r#"{"name":"An"#)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidToolArguments { .. }));
    }
}
