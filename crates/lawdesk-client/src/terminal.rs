//! Terminal rendering for the chat controller.

use std::io::{self, Write};
use std::sync::Mutex;

use colored::Colorize;
use lawdesk_core::{BookingOption, Role};

use crate::view::{ChatEvent, ChatView};

/// Prints messages to stdout. Streaming updates carry the full text so far;
/// only the unseen suffix is printed.
#[derive(Debug, Default)]
pub struct TerminalView {
    debug: bool,
    printed: Mutex<usize>,
}

impl TerminalView {
    pub fn new(debug: bool) -> Self {
        Self {
            debug,
            printed: Mutex::new(0),
        }
    }

    fn take_unprinted<'a>(&self, content: &'a str) -> &'a str {
        let Ok(mut printed) = self.printed.lock() else {
            return "";
        };
        let start = if *printed <= content.len() && content.is_char_boundary(*printed) {
            *printed
        } else {
            0
        };
        *printed = content.len();
        &content[start..]
    }

    fn reset_stream(&self) -> bool {
        match self.printed.lock() {
            Ok(mut printed) => std::mem::take(&mut *printed) > 0,
            Err(_) => false,
        }
    }
}

fn flush() {
    let _ = io::stdout().flush();
}

impl ChatView for TerminalView {
    fn set_visible(&self, visible: bool) {
        if self.debug {
            eprintln!("{}", format!("[DEBUG] Chat visible: {}", visible).dimmed());
        }
    }

    fn append_message(&self, role: Role, content: &str) {
        match role {
            Role::User => println!("{} {}", "You:".cyan().bold(), content),
            Role::Assistant => println!("{} {}", "Assistant:".green().bold(), content.green()),
            Role::System => println!("{}", content.dimmed()),
        }
    }

    fn update_streaming(&self, content: &str) {
        let fresh_stream = self.printed.lock().map(|p| *p == 0).unwrap_or(false);
        if fresh_stream {
            print!("{} ", "Assistant:".green().bold());
        }
        print!("{}", self.take_unprinted(content).green());
        flush();
    }

    fn finish_streaming(&self, content: &str) {
        let suffix = self.take_unprinted(content);
        if !suffix.is_empty() {
            print!("{}", suffix.green());
        }
        if self.reset_stream() {
            println!();
        }
    }

    fn set_typing(&self, visible: bool) {
        if visible {
            print!("{}", "…\r".dimmed());
            flush();
        }
    }

    fn set_input_enabled(&self, enabled: bool) {
        if enabled {
            // A cancelled or failed stream leaves the cursor mid-line.
            if self.reset_stream() {
                println!();
            }
        }
    }

    fn show_error(&self, message: &str) {
        println!("{}", format!("❌ {}", message).red());
        println!("{}", "   Type /retry to try again.".dimmed());
    }

    fn clear_errors(&self) {}

    fn show_booking_options(&self, intro: &str, options: &[BookingOption], note: Option<&str>) {
        println!("{} {}", "Assistant:".green().bold(), intro.green());
        if let Some(note) = note {
            println!("{}", note.yellow());
        }
        for option in options {
            println!("  📅 {} {}", option.label.bold(), option.scheduling_url.underline());
        }
    }

    fn on_event(&self, event: &ChatEvent) {
        if self.debug {
            if let Ok(json) = serde_json::to_string(event) {
                eprintln!("{}", format!("[DEBUG] Event: {}", json).dimmed());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prints_only_new_text() {
        let view = TerminalView::new(false);
        assert_eq!(view.take_unprinted("Hel"), "Hel");
        assert_eq!(view.take_unprinted("Hello"), "lo");
        assert!(view.reset_stream());
        assert_eq!(view.take_unprinted("Hi"), "Hi");
    }

    #[test]
    fn shorter_text_restarts_output() {
        let view = TerminalView::new(false);
        view.take_unprinted("Hello there");
        assert_eq!(view.take_unprinted("Hi"), "Hi");
    }
}
