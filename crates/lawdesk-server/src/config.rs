//! Server configuration.
//!
//! Every integration is optional: a missing credential disables the feature
//! it belongs to and the matching endpoint answers with a fallback instead of
//! failing at startup.

use lawdesk_core::FirmProfile;
use std::path::PathBuf;

pub const DEFAULT_ALLOWED_ORIGINS: &[&str] = &["http://localhost:5000", "https://pritsinghlaw.com"];
pub const DEFAULT_CALENDLY_BASE_URL: &str = "https://api.calendly.com";

#[derive(Debug, Clone)]
pub struct CalendlyConfig {
    pub access_token: Option<String>,
    pub user_uri: Option<String>,
    pub base_url: String,
}

impl Default for CalendlyConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            user_uri: None,
            base_url: DEFAULT_CALENDLY_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: String,
    pub calendly: CalendlyConfig,
    pub zapier_webhook_url: Option<String>,
    /// Directory holding `system_instructions.md` and `training_script.md`.
    pub prompt_dir: PathBuf,
    /// Root of the static site.
    pub public_dir: PathBuf,
    pub allowed_origins: Vec<String>,
    pub firm: FirmProfile,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            openai_api_key: None,
            openai_model: lawdesk_llm::providers::openai::DEFAULT_MODEL.to_string(),
            openai_base_url: lawdesk_llm::providers::openai::DEFAULT_BASE_URL.to_string(),
            calendly: CalendlyConfig::default(),
            zapier_webhook_url: None,
            prompt_dir: PathBuf::from("docs"),
            public_dir: PathBuf::from("."),
            allowed_origins: DEFAULT_ALLOWED_ORIGINS
                .iter()
                .map(|o| o.to_string())
                .collect(),
            firm: FirmProfile::default(),
        }
    }
}

impl ServerConfig {
    pub fn chat_enabled(&self) -> bool {
        self.openai_api_key.is_some()
    }

    pub fn scheduling_enabled(&self) -> bool {
        self.calendly.access_token.is_some()
    }

    pub fn webhook_enabled(&self) -> bool {
        self.zapier_webhook_url.is_some()
    }
}

/// Treat unset and blank values the same way.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Split a comma-separated origin list, dropping blanks.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}
