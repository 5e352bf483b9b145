use clap::Parser;
use lawdesk_server::config::{non_empty, parse_origins, CalendlyConfig, ServerConfig};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug, Clone)]
#[command(name = "lawdesk-server")]
#[command(about = "Chat relay, scheduling lookup and intake webhook for the firm website")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(long, env = "DEBUG", default_value = "false")]
    debug: bool,

    /// Bind address
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Server port
    #[arg(long, env = "PORT", default_value = "5000")]
    port: u16,

    /// OpenAI API key; the chat relay is disabled without it
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,

    #[arg(long, env = "OPENAI_MODEL", default_value = "gpt-4o-mini")]
    openai_model: String,

    #[arg(long, env = "OPENAI_BASE_URL", default_value = "https://api.openai.com/v1")]
    openai_base_url: String,

    /// Calendly personal access token; scheduling falls back to phone without it
    #[arg(long, env = "CALENDLY_ACCESS_TOKEN", hide_env_values = true)]
    calendly_access_token: Option<String>,

    /// Calendly user URI; resolved from the token when unset
    #[arg(long, env = "CALENDLY_USER_URI")]
    calendly_user_uri: Option<String>,

    #[arg(long, env = "CALENDLY_BASE_URL", default_value = "https://api.calendly.com")]
    calendly_base_url: String,

    /// Outbound webhook for chat intake submissions
    #[arg(long, env = "ZAPIER_WEBHOOK_URL")]
    zapier_webhook_url: Option<String>,

    /// Directory with system_instructions.md and training_script.md
    #[arg(long, env = "PROMPT_DIR", default_value = "docs")]
    prompt_dir: PathBuf,

    /// Root of the static site
    #[arg(long, env = "PUBLIC_DIR", default_value = ".")]
    public_dir: PathBuf,

    /// Comma-separated CORS origins
    #[arg(
        long,
        env = "ALLOWED_ORIGINS",
        default_value = "http://localhost:5000,https://pritsinghlaw.com"
    )]
    allowed_origins: String,
}

impl Cli {
    fn into_config(self) -> ServerConfig {
        ServerConfig {
            host: self.host,
            port: self.port,
            openai_api_key: non_empty(self.openai_api_key),
            openai_model: self.openai_model,
            openai_base_url: self.openai_base_url,
            calendly: CalendlyConfig {
                access_token: non_empty(self.calendly_access_token),
                user_uri: non_empty(self.calendly_user_uri),
                base_url: self.calendly_base_url,
            },
            zapier_webhook_url: non_empty(self.zapier_webhook_url),
            prompt_dir: self.prompt_dir,
            public_dir: self.public_dir,
            allowed_origins: parse_origins(&self.allowed_origins),
            ..ServerConfig::default()
        }
    }
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_line_number(true)
                .with_file(false),
        )
        .init();
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let config = cli.into_config();
    tracing::info!("Starting lawdesk server on {}:{}", config.host, config.port);
    tracing::info!("OpenAI model: {}", config.openai_model);
    tracing::debug!(
        chat = config.chat_enabled(),
        scheduling = config.scheduling_enabled(),
        webhook = config.webhook_enabled(),
        "Feature flags"
    );

    lawdesk_server::run(config).await
}
