use lawdesk_core::{FunctionCall, ToolCall};
use std::collections::BTreeMap;

use crate::types::StreamToolCall;

/// Accumulates streaming tool call fragments into complete tool calls.
///
/// The first fragment for an index usually carries the id and function name;
/// later fragments only append to the argument string. A call becomes ready
/// as soon as its name is known and its accumulated arguments parse as a
/// complete JSON value, so callers can dispatch it mid-stream. Each call is
/// handed out at most once.
#[derive(Debug, Default)]
pub struct StreamToolAccumulator {
    tool_calls: BTreeMap<u32, AccumulatedToolCall>,
}

#[derive(Debug, Clone, Default)]
struct AccumulatedToolCall {
    id: Option<String>,
    tool_type: Option<String>,
    name: Option<String>,
    arguments: String,
    dispatched: bool,
}

impl AccumulatedToolCall {
    fn is_ready(&self) -> bool {
        !self.dispatched
            && self.name.is_some()
            && serde_json::from_str::<serde_json::Value>(&self.arguments).is_ok()
    }

    fn to_tool_call(&self, index: u32) -> Option<ToolCall> {
        let arguments = if self.arguments.trim().is_empty() {
            "{}".to_string()
        } else {
            self.arguments.clone()
        };

        Some(ToolCall {
            id: self.id.clone().unwrap_or_else(|| format!("call_{index}")),
            tool_type: self
                .tool_type
                .clone()
                .unwrap_or_else(|| "function".to_string()),
            function: FunctionCall {
                name: self.name.clone()?,
                arguments,
            },
        })
    }
}

impl StreamToolAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one delta's fragments into the accumulated state.
    pub fn process_chunk(&mut self, stream_calls: &[StreamToolCall]) {
        for call in stream_calls {
            let entry = self.tool_calls.entry(call.index).or_default();

            if let Some(id) = &call.id {
                entry.id = Some(id.clone());
            }
            if let Some(tool_type) = &call.tool_type {
                entry.tool_type = Some(tool_type.clone());
            }
            if let Some(function) = &call.function {
                if let Some(name) = &function.name {
                    entry.name = Some(name.clone());
                }
                if let Some(args) = &function.arguments {
                    entry.arguments.push_str(args);
                }
            }
        }
    }

    /// Calls whose arguments are already complete, in index order.
    pub fn take_ready(&mut self) -> Vec<ToolCall> {
        let mut ready = Vec::new();
        for (index, acc) in self.tool_calls.iter_mut() {
            if acc.is_ready() {
                if let Some(call) = acc.to_tool_call(*index) {
                    acc.dispatched = true;
                    ready.push(call);
                }
            }
        }
        ready
    }

    /// Flush every named call that has not been handed out yet. Empty
    /// arguments become `{}`; nameless fragments are dropped.
    pub fn finish(self) -> Vec<ToolCall> {
        self.tool_calls
            .into_iter()
            .filter(|(_, acc)| !acc.dispatched)
            .filter_map(|(index, acc)| acc.to_tool_call(index))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StreamFunctionCall;

    fn fragment(index: u32, id: Option<&str>, name: Option<&str>, args: &str) -> StreamToolCall {
        StreamToolCall {
            index,
            id: id.map(str::to_string),
            tool_type: id.map(|_| "function".to_string()),
            function: Some(StreamFunctionCall {
                name: name.map(str::to_string),
                arguments: Some(args.to_string()),
            }),
        }
    }

    #[test]
    fn call_is_ready_once_arguments_close() {
        let mut accumulator = StreamToolAccumulator::new();

        accumulator.process_chunk(&[fragment(0, Some("call_1"), Some("intake_webhook"), "{\"name")]);
        assert!(accumulator.take_ready().is_empty());

        accumulator.process_chunk(&[fragment(0, None, None, "\":\"Ana\"}")]);
        let ready = accumulator.take_ready();
        assert_eq!(ready.len(), 1);
        assert_eq!(ready[0].id, "call_1");
        assert_eq!(ready[0].function.name, "intake_webhook");
        assert_eq!(ready[0].function.arguments, r#"{"name":"Ana"}"#);

        assert!(accumulator.take_ready().is_empty());
        assert!(accumulator.finish().is_empty());
    }

    #[test]
    fn empty_arguments_are_flushed_as_empty_object() {
        let mut accumulator = StreamToolAccumulator::new();
        accumulator.process_chunk(&[fragment(0, Some("call_1"), Some("book_consultation"), "")]);

        assert!(accumulator.take_ready().is_empty());

        let calls = accumulator.finish();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].function.arguments, "{}");
    }

    #[test]
    fn concurrent_calls_keep_index_order() {
        let mut accumulator = StreamToolAccumulator::new();
        accumulator.process_chunk(&[
            fragment(1, Some("call_2"), Some("intake_webhook"), "{\"email\":"),
            fragment(0, Some("call_1"), Some("book_consultation"), "{\"preferred_time\":"),
        ]);
        accumulator.process_chunk(&[
            fragment(0, None, None, "\"Monday\"}"),
            fragment(1, None, None, "\"a@b.co\"}"),
        ]);

        let ready = accumulator.take_ready();
        assert_eq!(ready.len(), 2);
        assert_eq!(ready[0].id, "call_1");
        assert_eq!(ready[1].id, "call_2");
    }

    #[test]
    fn nameless_fragments_are_dropped() {
        let mut accumulator = StreamToolAccumulator::new();
        accumulator.process_chunk(&[fragment(0, Some("call_1"), None, "{}")]);

        assert!(accumulator.take_ready().is_empty());
        assert!(accumulator.finish().is_empty());
    }

    #[test]
    fn missing_id_gets_a_synthetic_one() {
        let mut accumulator = StreamToolAccumulator::new();
        accumulator.process_chunk(&[fragment(3, None, Some("book_consultation"), "{}")]);

        let ready = accumulator.take_ready();
        assert_eq!(ready[0].id, "call_3");
        assert_eq!(ready[0].tool_type, "function");
    }
}
