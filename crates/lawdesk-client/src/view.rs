//! Rendering seam between the chat controller and a front end.

use lawdesk_core::{BookingOption, Role};
use serde::Serialize;

/// Lifecycle notifications for embedding pages and analytics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    Init,
    Open,
    Close,
    Send { message: String },
    Tool { tool: String },
}

/// Everything the controller asks of a front end. Calls arrive from the
/// controller's tasks, so implementations must be thread-safe.
pub trait ChatView: Send + Sync {
    fn set_visible(&self, visible: bool);

    /// Render a complete message bubble.
    fn append_message(&self, role: Role, content: &str);

    /// Replace the text of the in-progress assistant bubble, creating it on
    /// the first call of a turn.
    fn update_streaming(&self, content: &str);

    /// The in-progress bubble is final.
    fn finish_streaming(&self, content: &str);

    fn set_typing(&self, visible: bool);

    fn set_input_enabled(&self, enabled: bool);

    /// Show an inline error with a retry affordance.
    fn show_error(&self, message: &str);

    fn clear_errors(&self);

    fn show_booking_options(&self, intro: &str, options: &[BookingOption], note: Option<&str>);

    fn on_event(&self, _event: &ChatEvent) {}
}

/// A view that renders nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullView;

impl ChatView for NullView {
    fn set_visible(&self, _visible: bool) {}
    fn append_message(&self, _role: Role, _content: &str) {}
    fn update_streaming(&self, _content: &str) {}
    fn finish_streaming(&self, _content: &str) {}
    fn set_typing(&self, _visible: bool) {}
    fn set_input_enabled(&self, _enabled: bool) {}
    fn show_error(&self, _message: &str) {}
    fn clear_errors(&self) {}
    fn show_booking_options(&self, _intro: &str, _options: &[BookingOption], _note: Option<&str>) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_type_tag() {
        let value = serde_json::to_value(ChatEvent::Tool {
            tool: "book_consultation".to_string(),
        })
        .unwrap();
        assert_eq!(value["type"], "tool");
        assert_eq!(value["tool"], "book_consultation");
        assert_eq!(serde_json::to_value(ChatEvent::Open).unwrap()["type"], "open");
    }
}
