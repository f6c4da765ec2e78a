//! Stream event intake.
//!
//! The transport delivers the answer as server-sent event lines:
//!
//! ```text
//! data: {"type": "token", "content": "..."}
//! data: {"type": "done"}
//! ```
//!
//! plus `data: [DONE]` from upstreams that use that convention. Intake is
//! as forgiving as the parser itself: anything that is not a well-formed
//! event line is skipped, never an error.

use serde::Deserialize;
use tracing::debug;

/// One discrete event from the streaming transport.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// A chunk of model output to append to the buffer.
    Token { content: String },
    /// End of stream.
    Done,
    /// Terminal transport failure; the buffer so far remains the final
    /// structural result.
    Error { message: String },
}

/// Parse one SSE line. Blank keep-alives, comments and malformed payloads
/// yield `None`.
pub fn parse_sse_line(line: &str) -> Option<StreamEvent> {
    let data = line.strip_prefix("data:")?.trim();
    if data == "[DONE]" {
        return Some(StreamEvent::Done);
    }
    if data.is_empty() {
        return None;
    }
    match serde_json::from_str(data) {
        Ok(event) => Some(event),
        Err(err) => {
            debug!(%err, "skipping unparseable event line");
            None
        }
    }
}
