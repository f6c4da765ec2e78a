//! quill-core - parsing core for the quill streaming answer renderer.
//!
//! Model output arrives token by token, so every entry point here is called
//! repeatedly on a growing snapshot of the full buffer. Three contracts make
//! that workable:
//!
//! - every function is total: any string, including truncated or malformed
//!   input, produces a structurally valid result;
//! - parsing is pure and deterministic, so recomputing from the full buffer
//!   on each update cannot flicker spans that were already complete;
//! - the still-arriving tail degrades gracefully: unterminated fences consume
//!   to end of input, unterminated tags are flagged in-progress.
//!
//! The core holds no state between invocations and does no I/O. Throttling
//! of update frequency is the caller's concern.

pub mod block;
pub mod inline;
pub mod search;
pub mod segment;

pub use block::{parse, Block};
pub use inline::{resolve, tokenize, tokenize_text, InlineToken, StyledSpan};
pub use search::{SearchItem, SearchLedger, SearchStatus};
pub use segment::{segment, AgentSegment};

use std::borrow::Cow;

/// Normalize CRLF line endings before scanning. Both `parse` and `segment`
/// call this on entry so callers can hand over transport bytes unmodified.
pub(crate) fn normalize(buffer: &str) -> Cow<'_, str> {
    if buffer.contains("\r\n") {
        Cow::Owned(buffer.replace("\r\n", "\n"))
    } else {
        Cow::Borrowed(buffer)
    }
}
