//! Client-side conversation history.
//!
//! The history keeps only the most recent `cap` messages. The same window is
//! what gets submitted to the relay and what gets persisted, so there is a
//! single eviction rule: oldest first.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::message::{ConversationMessage, Role, WireMessage};

pub const DEFAULT_HISTORY_CAP: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct ConversationState {
    messages: VecDeque<ConversationMessage>,
    cap: usize,
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationState {
    pub fn new() -> Self {
        Self::with_cap(DEFAULT_HISTORY_CAP)
    }

    pub fn with_cap(cap: usize) -> Self {
        Self {
            messages: VecDeque::with_capacity(cap),
            cap: cap.max(1),
        }
    }

    /// Rebuild a history from persisted messages, dropping system entries and
    /// anything beyond the cap.
    pub fn from_messages(messages: Vec<ConversationMessage>, cap: usize) -> Self {
        let mut state = Self::with_cap(cap);
        for message in messages {
            if message.role == Role::System {
                log::warn!("Dropping persisted system message from history");
                continue;
            }
            state.push_unchecked(message);
        }
        state
    }

    /// Append a user or assistant message, evicting the oldest entry when
    /// the cap is reached.
    pub fn push(&mut self, message: ConversationMessage) -> Result<()> {
        if message.role == Role::System {
            return Err(CoreError::SystemMessageRejected);
        }
        self.push_unchecked(message);
        Ok(())
    }

    fn push_unchecked(&mut self, message: ConversationMessage) {
        while self.messages.len() >= self.cap {
            self.messages.pop_front();
        }
        self.messages.push_back(message);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConversationMessage> {
        self.messages.iter()
    }

    pub fn last(&self) -> Option<&ConversationMessage> {
        self.messages.back()
    }

    pub fn last_user_message(&self) -> Option<&ConversationMessage> {
        self.messages.iter().rev().find(|m| m.role == Role::User)
    }

    pub fn to_vec(&self) -> Vec<ConversationMessage> {
        self.messages.iter().cloned().collect()
    }

    /// Messages in the `{role, content}` shape expected by the relay.
    pub fn to_wire(&self) -> Vec<WireMessage> {
        self.messages.iter().map(ConversationMessage::to_wire).collect()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

/// Serialized form: a plain JSON array of messages.
impl Serialize for ConversationState {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.messages.iter())
    }
}

impl<'de> Deserialize<'de> for ConversationState {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let messages = Vec::<ConversationMessage>::deserialize(deserializer)?;
        Ok(Self::from_messages(messages, DEFAULT_HISTORY_CAP))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_evicts_oldest_first() {
        let mut state = ConversationState::with_cap(3);
        for i in 0..5 {
            state.push(ConversationMessage::user(format!("m{i}"))).unwrap();
        }
        let contents: Vec<_> = state.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["m2", "m3", "m4"]);
    }

    #[test]
    fn system_messages_are_rejected() {
        let mut state = ConversationState::new();
        let err = state.push(ConversationMessage::system("secret prompt"));
        assert!(matches!(err, Err(CoreError::SystemMessageRejected)));
        assert!(state.is_empty());
    }

    #[test]
    fn from_messages_filters_system_and_applies_cap() {
        let mut messages = vec![ConversationMessage::system("prompt")];
        for i in 0..12 {
            messages.push(ConversationMessage::assistant(format!("a{i}")));
        }
        let state = ConversationState::from_messages(messages, DEFAULT_HISTORY_CAP);
        assert_eq!(state.len(), DEFAULT_HISTORY_CAP);
        assert!(state.iter().all(|m| m.role != Role::System));
        assert_eq!(state.iter().next().unwrap().content, "a2");
    }

    #[test]
    fn last_user_message_skips_assistant_entries() {
        let mut state = ConversationState::new();
        state.push(ConversationMessage::user("first")).unwrap();
        state.push(ConversationMessage::user("second")).unwrap();
        state.push(ConversationMessage::assistant("reply")).unwrap();
        assert_eq!(state.last_user_message().unwrap().content, "second");
    }

    #[test]
    fn serializes_as_array() {
        let mut state = ConversationState::new();
        state.push(ConversationMessage::user("hi")).unwrap();
        let value = serde_json::to_value(&state).unwrap();
        assert!(value.is_array());
        assert_eq!(value[0]["content"], "hi");

        let back: ConversationState = serde_json::from_value(value).unwrap();
        assert_eq!(back.len(), 1);
    }
}
