//! Chat controller
//!
//! Owns the conversation history, the knowledge cache and the turn phase,
//! and drives a [`ChatView`]. One turn is in flight at a time: starting a
//! new one cancels the previous stream, and a generation counter keeps a
//! superseded turn from touching the view or the history.

use std::sync::Arc;

use futures_util::StreamExt;
use lawdesk_core::{
    load_json, save_json, BookingOption, ConversationMessage, ConversationState, FirmProfile,
    IntakeFields, IntakeWebhookRequest, KeyValueStore, KnowledgeBase, SlotsResponse,
    ToolCall, ToolDefinition, ToolInvocation, UnavailableReason, WireMessage,
    DEFAULT_CONTEXT_MATCHES, DEFAULT_HISTORY_CAP, HISTORY_KEY, KNOWLEDGE_KEY,
};
use lawdesk_llm::{StreamChunk, StreamToolAccumulator};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::error::{ClientError, Result};
use crate::phase::{ChatPhase, PhaseEvent, PhaseMachine};
use crate::relay_client::RelayClient;
use crate::view::{ChatEvent, ChatView};

pub const BOOK_SUGGESTION: &str = "Book A Free Consultation";
pub const DEFAULT_SUGGESTIONS: [&str; 4] = [
    BOOK_SUGGESTION,
    "How Do I Pay My Bill?",
    "What Legal Services Do You Offer?",
    "Where Are You Located?",
];

pub const ERROR_MESSAGE: &str = "Sorry, I encountered an error. Please try again.";
pub const INTAKE_THANKS: &str =
    "Thank you! Your information has been received. Our team will contact you shortly.";
pub const BOOKING_INTRO: &str = "Ready to schedule? Please choose a consultation type below:";
pub const BOOKING_FALLBACK_NOTE: &str =
    "I couldn't find the specific consultation links, but here are other available options:";
const CONTEXT_HEADER: &str = "Relevant information from website:\n";

#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// History entries kept for the relay and in session storage.
    pub max_messages: usize,
    /// Knowledge pages injected as context per query.
    pub context_matches: usize,
    pub suggestions: Vec<String>,
    pub firm: FirmProfile,
    /// Tool list sent with each request; `None` lets the relay attach its defaults.
    pub tools: Option<Vec<ToolDefinition>>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            max_messages: DEFAULT_HISTORY_CAP,
            context_matches: DEFAULT_CONTEXT_MATCHES,
            suggestions: DEFAULT_SUGGESTIONS.iter().map(|s| s.to_string()).collect(),
            firm: FirmProfile::default(),
            tools: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Nothing was sent (empty input, or nothing to retry).
    Ignored,
    /// The stream ended; carries the assistant text (possibly empty).
    Completed(String),
    /// A newer turn or an explicit cancel aborted this one.
    Cancelled,
    /// The request or stream failed; the view shows a retryable error.
    Failed(String),
    /// The booking suggestion was answered with booking options.
    BookingShown,
}

struct ControllerState {
    history: ConversationState,
    phase: PhaseMachine,
    is_open: bool,
    knowledge: Option<KnowledgeBase>,
    generation: u64,
    cancel: Option<CancellationToken>,
}

struct Inner {
    config: ControllerConfig,
    relay: RelayClient,
    view: Arc<dyn ChatView>,
    /// Session-scoped storage for the history.
    session: Arc<dyn KeyValueStore>,
    /// Persistent storage for the knowledge cache.
    persistent: Arc<dyn KeyValueStore>,
    state: Mutex<ControllerState>,
}

#[derive(Clone)]
pub struct ChatController {
    inner: Arc<Inner>,
}

impl ChatController {
    pub fn new(
        config: ControllerConfig,
        relay: RelayClient,
        view: Arc<dyn ChatView>,
        session: Arc<dyn KeyValueStore>,
        persistent: Arc<dyn KeyValueStore>,
    ) -> Self {
        let state = ControllerState {
            history: ConversationState::with_cap(config.max_messages),
            phase: PhaseMachine::new(),
            is_open: false,
            knowledge: None,
            generation: 0,
            cancel: None,
        };

        Self {
            inner: Arc::new(Inner {
                config,
                relay,
                view,
                session,
                persistent,
                state: Mutex::new(state),
            }),
        }
    }

    /// Restore history from session storage. Restored messages are context
    /// for the relay only; they are not replayed into the view.
    pub async fn init(&self) {
        match load_json::<Vec<ConversationMessage>>(self.inner.session.as_ref(), HISTORY_KEY).await
        {
            Ok(Some(messages)) => {
                let mut state = self.inner.state.lock().await;
                state.history =
                    ConversationState::from_messages(messages, self.inner.config.max_messages);
                log::info!("Restored {} chat message(s)", state.history.len());
            }
            Ok(None) => {}
            Err(e) => log::warn!("Ignoring unreadable chat history: {}", e),
        }
        self.inner.view.on_event(&ChatEvent::Init);
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.inner.config
    }

    pub async fn is_open(&self) -> bool {
        self.inner.state.lock().await.is_open
    }

    pub async fn phase(&self) -> ChatPhase {
        self.inner.state.lock().await.phase.phase()
    }

    pub async fn is_typing(&self) -> bool {
        self.inner.state.lock().await.phase.is_busy()
    }

    pub async fn history(&self) -> Vec<ConversationMessage> {
        self.inner.state.lock().await.history.to_vec()
    }

    pub async fn has_knowledge(&self) -> bool {
        self.inner.state.lock().await.knowledge.is_some()
    }

    // ===== Visibility =====

    pub async fn open(&self) {
        let needs_knowledge = {
            let mut state = self.inner.state.lock().await;
            state.is_open = true;
            state.knowledge.is_none()
        };
        self.inner.view.set_visible(true);

        if needs_knowledge {
            self.load_knowledge().await;
        }

        let is_empty = self.inner.state.lock().await.history.is_empty();
        if is_empty {
            let welcome = self.inner.config.firm.welcome_message();
            self.add_message(ConversationMessage::assistant(welcome)).await;
        }

        self.inner.view.on_event(&ChatEvent::Open);
    }

    pub async fn close(&self) {
        self.inner.state.lock().await.is_open = false;
        self.inner.view.set_visible(false);
        self.inner.view.on_event(&ChatEvent::Close);
    }

    pub async fn toggle(&self) {
        if self.is_open().await {
            self.close().await;
        } else {
            self.open().await;
        }
    }

    /// Fetch the knowledge document and cache it; fall back to the cached
    /// copy when the fetch fails.
    pub async fn load_knowledge(&self) {
        let persistent = self.inner.persistent.as_ref();
        let knowledge = match self.inner.relay.fetch_knowledge().await {
            Ok(knowledge) => {
                if let Err(e) = save_json(persistent, KNOWLEDGE_KEY, &knowledge).await {
                    log::warn!("Failed to cache knowledge: {}", e);
                }
                log::debug!("Loaded {} knowledge page(s)", knowledge.pages.len());
                Some(knowledge)
            }
            Err(e) => {
                log::warn!("Knowledge fetch failed, trying cache: {}", e);
                match load_json::<KnowledgeBase>(persistent, KNOWLEDGE_KEY).await {
                    Ok(cached) => cached,
                    Err(e) => {
                        log::warn!("Cached knowledge unreadable: {}", e);
                        None
                    }
                }
            }
        };

        if let Some(knowledge) = knowledge {
            self.inner.state.lock().await.knowledge = Some(knowledge);
        }
    }

    // ===== Turns =====

    /// Send a user message and stream the reply into the view.
    pub async fn send_message(&self, text: &str) -> SendOutcome {
        let text = text.trim();
        if text.is_empty() {
            return SendOutcome::Ignored;
        }

        let (generation, token) = self.begin_turn().await;
        self.add_message(ConversationMessage::user(text)).await;
        self.run_turn(text, generation, token).await
    }

    /// Re-send the last user message without adding it to history again.
    pub async fn retry(&self) -> SendOutcome {
        self.inner.view.clear_errors();

        let last = {
            let state = self.inner.state.lock().await;
            state.history.last_user_message().map(|m| m.content.clone())
        };
        let Some(text) = last else {
            return SendOutcome::Ignored;
        };

        let (generation, token) = self.begin_turn().await;
        self.run_turn(&text, generation, token).await
    }

    /// The booking chip goes straight to the booking flow; every other
    /// suggestion is sent as a message.
    pub async fn handle_suggestion(&self, suggestion: &str) -> SendOutcome {
        if suggestion == BOOK_SUGGESTION {
            self.add_message(ConversationMessage::user(suggestion)).await;
            self.display_booking_options().await;
            SendOutcome::BookingShown
        } else {
            self.send_message(suggestion).await
        }
    }

    /// Abort the in-flight turn, if any.
    pub async fn cancel(&self) {
        if let Some(token) = self.inner.state.lock().await.cancel.take() {
            token.cancel();
        }
    }

    async fn begin_turn(&self) -> (u64, CancellationToken) {
        let token = CancellationToken::new();
        let generation = {
            let mut state = self.inner.state.lock().await;
            if let Some(previous) = state.cancel.replace(token.clone()) {
                log::debug!("Aborting in-flight chat request");
                previous.cancel();
            }
            state.generation += 1;
            state.phase.handle_event(PhaseEvent::SendStarted);
            state.generation
        };

        self.inner.view.set_input_enabled(false);
        self.inner.view.set_typing(true);
        (generation, token)
    }

    async fn run_turn(&self, text: &str, generation: u64, token: CancellationToken) -> SendOutcome {
        let result = tokio::select! {
            _ = token.cancelled() => None,
            result = self.stream_turn(text, generation) => Some(result),
        };

        let outcome = match result {
            Some(Ok(reply)) => {
                if self.commit_reply(generation, &reply).await {
                    SendOutcome::Completed(reply)
                } else {
                    log::debug!("Chat turn {} superseded", generation);
                    SendOutcome::Cancelled
                }
            }
            None => {
                log::debug!("Chat turn {} aborted", generation);
                SendOutcome::Cancelled
            }
            Some(Err(e)) => {
                log::error!("Chat error: {}", e);
                SendOutcome::Failed(e.to_string())
            }
        };

        if self.finish_turn(generation, &outcome).await {
            self.inner.view.on_event(&ChatEvent::Send {
                message: text.to_string(),
            });
        }
        outcome
    }

    async fn stream_turn(&self, text: &str, generation: u64) -> Result<String> {
        let messages = self.outbound_messages(text).await;
        let mut stream = self
            .inner
            .relay
            .open_chat(&messages, self.inner.config.tools.as_deref())
            .await?;

        if self.advance(generation, PhaseEvent::StreamOpened).await {
            self.inner.view.set_typing(false);
        }

        let mut reply = String::new();
        let mut tools = StreamToolAccumulator::new();

        while let Some(chunk) = stream.next().await {
            match chunk? {
                StreamChunk::Delta(delta) => {
                    reply.push_str(&delta);
                    let state = self.inner.state.lock().await;
                    if state.generation == generation {
                        self.inner.view.update_streaming(&reply);
                    }
                }
                StreamChunk::ToolCalls(calls) => {
                    tools.process_chunk(&calls);
                    for call in tools.take_ready() {
                        self.dispatch_tool(&call).await;
                    }
                }
                StreamChunk::Done => {}
                StreamChunk::Error(message) => return Err(ClientError::Relay(message)),
            }
        }

        for call in tools.finish() {
            self.dispatch_tool(&call).await;
        }
        Ok(reply)
    }

    /// Render and store the finished reply, unless a newer turn has taken
    /// over. The generation check, the final render and the history push
    /// share one lock acquisition.
    async fn commit_reply(&self, generation: u64, reply: &str) -> bool {
        let snapshot = {
            let mut state = self.inner.state.lock().await;
            if state.generation != generation {
                return false;
            }
            if reply.is_empty() {
                return true;
            }
            self.inner.view.finish_streaming(reply);
            if let Err(e) = state.history.push(ConversationMessage::assistant(reply)) {
                log::warn!("Not recording reply: {}", e);
                return true;
            }
            state.history.to_vec()
        };

        self.persist(&snapshot).await;
        true
    }

    /// History as sent to the relay, with matching knowledge prepended as a
    /// system message. The system message never enters the history.
    async fn outbound_messages(&self, query: &str) -> Vec<WireMessage> {
        let state = self.inner.state.lock().await;
        let mut messages = state.history.to_wire();

        let context = state
            .knowledge
            .as_ref()
            .and_then(|kb| kb.relevant_context(query, self.inner.config.context_matches));
        if let Some(context) = context {
            messages.insert(0, WireMessage::system(format!("{CONTEXT_HEADER}{context}")));
        }
        messages
    }

    /// Reset the phase and the view. Returns false when a newer turn owns
    /// the controller, in which case nothing is touched.
    async fn finish_turn(&self, generation: u64, outcome: &SendOutcome) -> bool {
        let event = match outcome {
            SendOutcome::Failed(error) => PhaseEvent::Failed {
                error: error.clone(),
            },
            SendOutcome::Cancelled => PhaseEvent::Cancelled,
            _ => PhaseEvent::StreamEnded,
        };

        let is_current = {
            let mut state = self.inner.state.lock().await;
            if state.generation != generation {
                false
            } else {
                state.cancel = None;
                let transition = state.phase.handle_event(event);
                if transition.to != ChatPhase::Idle {
                    // Stream ended before it was opened.
                    state.phase.handle_event(PhaseEvent::Cancelled);
                }
                true
            }
        };

        if !is_current {
            return false;
        }

        self.inner.view.set_typing(false);
        self.inner.view.set_input_enabled(true);
        if matches!(outcome, SendOutcome::Failed(_)) {
            self.inner.view.show_error(ERROR_MESSAGE);
        }
        true
    }

    /// Apply a phase event if `generation` still owns the controller.
    async fn advance(&self, generation: u64, event: PhaseEvent) -> bool {
        let mut state = self.inner.state.lock().await;
        if state.generation != generation {
            return false;
        }
        state.phase.handle_event(event);
        true
    }

    // ===== Tools =====

    async fn dispatch_tool(&self, call: &ToolCall) {
        let invocation = match ToolInvocation::try_from(call) {
            Ok(invocation) => invocation,
            Err(e) => {
                log::warn!("Ignoring tool call '{}': {}", call.function.name, e);
                return;
            }
        };
        log::info!("Dispatching tool {}", invocation.name());

        let tool = invocation.name().to_string();
        match invocation {
            ToolInvocation::BookConsultation { .. } => self.display_booking_options().await,
            ToolInvocation::IntakeWebhook(fields) => self.submit_intake(fields).await,
        }
        self.inner.view.on_event(&ChatEvent::Tool { tool });
    }

    /// Look up booking links through the server and render them, or a
    /// canned message when scheduling is unavailable.
    pub async fn display_booking_options(&self) {
        let view = &self.inner.view;
        view.set_typing(true);
        let result = self.inner.relay.calendly_slots().await;
        view.set_typing(false);

        let slots = match result {
            Ok(slots) => slots,
            Err(e) => {
                log::error!("Scheduling lookup failed: {}", e);
                let message = self.unavailable_message(Some(UnavailableReason::UpstreamError));
                self.add_message(ConversationMessage::assistant(message)).await;
                return;
            }
        };

        match booking_choices(&slots) {
            Some(options) => {
                let note = slots.fallback_options.then_some(BOOKING_FALLBACK_NOTE);
                view.show_booking_options(BOOKING_INTRO, &options, note);
            }
            None => {
                let reason = if slots.available {
                    Some(UnavailableReason::NoEvents)
                } else {
                    slots.reason
                };
                let message = self.unavailable_message(reason);
                self.add_message(ConversationMessage::assistant(message)).await;
            }
        }
    }

    fn unavailable_message(&self, reason: Option<UnavailableReason>) -> String {
        let firm = &self.inner.config.firm;
        match reason {
            Some(UnavailableReason::NotConfigured) => "The scheduling feature is not configured correctly. Please contact us directly to book an appointment.".to_string(),
            Some(UnavailableReason::NoEvents) => format!(
                "It seems there are no appointments available right now. Please try again later or contact us directly at {}.",
                firm.phone
            ),
            Some(UnavailableReason::UpstreamError) | None => firm.call_us(
                "I apologize, but I'm having trouble connecting to our scheduling system.",
            ),
        }
    }

    async fn submit_intake(&self, fields: IntakeFields) {
        let transcript = self.history().await;
        let request = IntakeWebhookRequest::new(fields, transcript);

        match self.inner.relay.submit_intake(&request).await {
            Ok(ack) if ack.success => {
                self.add_message(ConversationMessage::assistant(INTAKE_THANKS))
                    .await;
            }
            Ok(_) => log::warn!("Intake webhook did not confirm receipt"),
            Err(e) => log::error!("Intake webhook error: {}", e),
        }
    }

    // ===== History =====

    async fn add_message(&self, message: ConversationMessage) {
        self.inner.view.append_message(message.role, &message.content);
        self.record(message).await;
    }

    /// Push into history and persist the trailing window.
    async fn record(&self, message: ConversationMessage) {
        let snapshot = {
            let mut state = self.inner.state.lock().await;
            if let Err(e) = state.history.push(message) {
                log::warn!("Not recording message: {}", e);
                return;
            }
            state.history.to_vec()
        };
        self.persist(&snapshot).await;
    }

    async fn persist(&self, snapshot: &[ConversationMessage]) {
        if let Err(e) = save_json(self.inner.session.as_ref(), HISTORY_KEY, snapshot).await {
            log::warn!("Failed to persist chat history: {}", e);
        }
    }
}

/// Links to render for an available slots response.
fn booking_choices(slots: &SlotsResponse) -> Option<Vec<BookingOption>> {
    if !slots.available {
        return None;
    }
    if !slots.options.is_empty() {
        return Some(slots.options.clone());
    }

    let url = slots.booking_url.clone()?;
    let label = slots
        .event_type
        .as_ref()
        .map(|e| e.name.clone())
        .unwrap_or_else(|| slots.message.clone());
    Some(vec![BookingOption {
        label,
        scheduling_url: url,
    }])
}
