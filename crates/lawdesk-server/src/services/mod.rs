pub mod calendly;
pub mod webhook;

pub use calendly::{BookingRequest, CalendlyClient, CalendlyError};
pub use webhook::WebhookForwarder;
