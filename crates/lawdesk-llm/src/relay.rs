//! Frames re-emitted by the chat relay.

use bytes::Bytes;
use serde_json::{json, Value};

use crate::provider::Result;

#[derive(Debug, Clone, PartialEq)]
pub enum RelayFrame {
    /// A re-serialized upstream JSON payload.
    Data(Value),
    /// The `[DONE]` sentinel.
    Done,
    /// A terminal error event. Nothing follows it.
    Error(String),
}

impl RelayFrame {
    /// Map one upstream `data:` line to a frame. Blank lines and payloads
    /// that are not valid JSON are skipped.
    pub fn from_upstream_data(data: &str) -> Result<Option<RelayFrame>> {
        let data = data.trim();
        if data.is_empty() {
            return Ok(None);
        }
        if data == "[DONE]" {
            return Ok(Some(RelayFrame::Done));
        }

        match serde_json::from_str::<Value>(data) {
            Ok(value) => Ok(Some(RelayFrame::Data(value))),
            Err(e) => {
                log::debug!("Skipping invalid upstream line: {}", e);
                Ok(None)
            }
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        RelayFrame::Error(message.into())
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RelayFrame::Done | RelayFrame::Error(_))
    }

    /// Encode as one SSE event.
    pub fn to_sse_bytes(&self) -> Bytes {
        let payload = match self {
            RelayFrame::Data(value) => value.to_string(),
            RelayFrame::Done => "[DONE]".to_string(),
            RelayFrame::Error(message) => json!({ "error": message }).to_string(),
        };
        Bytes::from(format!("data: {}\n\n", payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_json_is_reserialized() {
        let frame = RelayFrame::from_upstream_data(r#"{ "choices" : [ {"delta": {"content": "A"}} ] }"#)
            .unwrap()
            .unwrap();

        assert_eq!(
            frame.to_sse_bytes(),
            Bytes::from("data: {\"choices\":[{\"delta\":{\"content\":\"A\"}}]}\n\n")
        );
    }

    #[test]
    fn done_is_forwarded() {
        let frame = RelayFrame::from_upstream_data("[DONE]").unwrap().unwrap();
        assert_eq!(frame, RelayFrame::Done);
        assert!(frame.is_terminal());
        assert_eq!(frame.to_sse_bytes(), Bytes::from("data: [DONE]\n\n"));
    }

    #[test]
    fn invalid_json_is_skipped() {
        assert_eq!(RelayFrame::from_upstream_data("{\"choices\":").unwrap(), None);
        assert_eq!(RelayFrame::from_upstream_data("   ").unwrap(), None);
    }

    #[test]
    fn error_frame_is_json_wrapped() {
        let frame = RelayFrame::error("HTTP 500: \"boom\"");
        let encoded = String::from_utf8(frame.to_sse_bytes().to_vec()).unwrap();
        let payload = encoded.trim_start_matches("data: ").trim_end();
        let value: Value = serde_json::from_str(payload).unwrap();
        assert_eq!(value["error"], "HTTP 500: \"boom\"");
    }
}
