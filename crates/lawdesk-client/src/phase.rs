//! Chat turn state machine
//!
//! idle -> sending -> streaming -> idle. A new send is accepted from any
//! phase; the controller cancels the running turn before starting it.

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChatPhase {
    /// Waiting for user input.
    Idle,
    /// Request sent, waiting for the relay to answer.
    Sending,
    /// Relay stream open, deltas arriving.
    Streaming,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PhaseEvent {
    SendStarted,
    StreamOpened,
    StreamEnded,
    Failed { error: String },
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseTransition {
    pub from: ChatPhase,
    pub to: ChatPhase,
    pub event: PhaseEvent,
    pub changed: bool,
}

#[derive(Debug, Clone)]
pub struct PhaseMachine {
    current: ChatPhase,
}

impl Default for PhaseMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl PhaseMachine {
    pub fn new() -> Self {
        Self {
            current: ChatPhase::Idle,
        }
    }

    pub fn phase(&self) -> ChatPhase {
        self.current
    }

    /// The `is_typing` flag: true while a turn is in flight.
    pub fn is_busy(&self) -> bool {
        self.current != ChatPhase::Idle
    }

    pub fn handle_event(&mut self, event: PhaseEvent) -> PhaseTransition {
        let from = self.current;
        let to = Self::next_phase(from, &event);
        self.current = to;

        if from == to && !matches!(event, PhaseEvent::SendStarted) {
            log::debug!("Chat phase unchanged by {:?} in {:?}", event, from);
        }

        PhaseTransition {
            from,
            to,
            changed: from != to,
            event,
        }
    }

    fn next_phase(phase: ChatPhase, event: &PhaseEvent) -> ChatPhase {
        use ChatPhase::*;
        use PhaseEvent::*;

        match (phase, event) {
            (_, SendStarted) => Sending,
            (Sending, StreamOpened) => Streaming,
            (Streaming, StreamEnded) => Idle,
            (_, Failed { .. }) | (_, Cancelled) => Idle,
            (current, _) => current,
        }
    }
}
