//! lawdesk-server - HTTP backend for the firm's chat widget and intake flows
//!
//! Serves the streaming chat relay, the Calendly scheduling lookup, the
//! intake webhook relay and the static site.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod prompt;
pub mod server;
pub mod services;
pub mod state;

pub use config::{CalendlyConfig, ServerConfig};
pub use error::AppError;
pub use server::{app_config, cors, run};
pub use state::AppState;
