use serde::{Deserialize, Serialize};

/// Contact details used by every degraded-feature and error message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FirmProfile {
    pub name: String,
    pub phone: String,
    pub intake_form_url: String,
    pub calendly_url: String,
}

impl Default for FirmProfile {
    fn default() -> Self {
        Self {
            name: "Law Offices of Pritpal Singh".to_string(),
            phone: "(510) 443-2123".to_string(),
            intake_form_url: "/client-area/intake-form".to_string(),
            calendly_url: "https://calendly.com/pritsinghlaw".to_string(),
        }
    }
}

impl FirmProfile {
    /// Prompt used when the prompt documents cannot be read.
    pub fn default_system_prompt(&self) -> String {
        format!(
            "You are the AI assistant for the {}, a California real estate law firm. \n\
             You provide general information only - no legal advice. No attorney-client relationship is formed through this chat.\n\
             Direct users to call {} or book a consultation for specific legal matters.",
            self.name, self.phone
        )
    }

    pub fn welcome_message(&self) -> String {
        "Hello! I'm here to help with general information about our real estate law services. How can I assist you today?".to_string()
    }

    pub fn call_us(&self, lead: &str) -> String {
        format!("{lead} Please call {} to book an appointment.", self.phone)
    }
}
