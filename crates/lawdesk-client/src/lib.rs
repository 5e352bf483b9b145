//! lawdesk-client - chat widget controller for the lawdesk relay
//!
//! [`ChatController`] owns the conversation, streams replies from the
//! server's `/api/chat` relay, dispatches tool calls, and renders through a
//! [`ChatView`]. [`TerminalView`] is the view used by the `lawdesk-chat`
//! binary.

pub mod controller;
pub mod error;
pub mod knowledge_builder;
pub mod phase;
pub mod relay_client;
pub mod terminal;
pub mod view;

pub use controller::{
    ChatController, ControllerConfig, SendOutcome, BOOKING_FALLBACK_NOTE, BOOKING_INTRO,
    BOOK_SUGGESTION, DEFAULT_SUGGESTIONS, ERROR_MESSAGE, INTAKE_THANKS,
};
pub use error::{ClientError, Result};
pub use knowledge_builder::{build_knowledge, default_urls, write_knowledge};
pub use phase::{ChatPhase, PhaseEvent, PhaseMachine, PhaseTransition};
pub use relay_client::RelayClient;
pub use terminal::TerminalView;
pub use view::{ChatEvent, ChatView, NullView};
