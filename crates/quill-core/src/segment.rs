//! Agent tag segmenter.
//!
//! Reasoning models emit `<think>`, `<search>` and `<search_result>` regions
//! inline with their answer text. The segmenter splits the raw buffer into an
//! ordered sequence of segments without ever failing on truncated input: a
//! tag whose closing marker has not arrived yet becomes the final segment,
//! flagged in-progress.
//!
//! Tags are fixed and flat. No nesting, no attributes; the markers are exact
//! strings.

use serde::Serialize;
use tracing::debug;

/// A top-level unit of the streamed buffer: plain markdown or one of the
/// named tagged regions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentSegment {
    Markdown { text: String },
    Think { text: String, in_progress: bool },
    Search { text: String, in_progress: bool },
    SearchResult { text: String, in_progress: bool },
}

impl AgentSegment {
    /// Whether this segment's closing marker was still missing from the
    /// buffer at parse time. Only ever true for the last segment.
    pub fn in_progress(&self) -> bool {
        match self {
            AgentSegment::Markdown { .. } => false,
            AgentSegment::Think { in_progress, .. }
            | AgentSegment::Search { in_progress, .. }
            | AgentSegment::SearchResult { in_progress, .. } => *in_progress,
        }
    }
}

struct Tag {
    open: &'static str,
    close: &'static str,
    build: fn(String, bool) -> AgentSegment,
}

const TAGS: [Tag; 3] = [
    Tag {
        open: "<think>",
        close: "</think>",
        build: |text, in_progress| AgentSegment::Think { text, in_progress },
    },
    Tag {
        open: "<search>",
        close: "</search>",
        build: |text, in_progress| AgentSegment::Search { text, in_progress },
    },
    Tag {
        open: "<search_result>",
        close: "</search_result>",
        build: |text, in_progress| AgentSegment::SearchResult { text, in_progress },
    },
];

/// Split a buffer snapshot into an ordered segment sequence.
///
/// Total and deterministic. For a buffer that textually extends an earlier
/// one, every segment of the earlier parse except the last reappears
/// byte-identical and in order; only the final segment may be refined as
/// more of the stream arrives.
pub fn segment(buffer: &str) -> Vec<AgentSegment> {
    let buffer = crate::normalize(buffer);
    let mut segments = Vec::new();
    let mut cursor = 0;

    while cursor < buffer.len() {
        // Earliest opening marker at or after the cursor, across all tags.
        let next_open = TAGS
            .iter()
            .filter_map(|tag| buffer[cursor..].find(tag.open).map(|off| (cursor + off, tag)))
            .min_by_key(|(pos, _)| *pos);

        let Some((open_pos, tag)) = next_open else {
            push_markdown(&mut segments, &buffer[cursor..]);
            break;
        };
        push_markdown(&mut segments, &buffer[cursor..open_pos]);

        let interior_start = open_pos + tag.open.len();
        match buffer[interior_start..].find(tag.close) {
            Some(off) => {
                let interior = &buffer[interior_start..interior_start + off];
                segments.push((tag.build)(interior.to_string(), false));
                cursor = interior_start + off + tag.close.len();
            }
            None => {
                // The closing marker hasn't streamed in yet. Flag the tail
                // in-progress and stop: nothing can follow an unterminated
                // tag. A partially-arrived closing marker is not interior
                // text; without this the tail of the marker would flash in
                // the rendered segment as it streams in.
                debug!(tag = tag.open, "unterminated tag at end of buffer");
                let interior = trim_partial_close(&buffer[interior_start..], tag.close);
                segments.push((tag.build)(interior.to_string(), true));
                break;
            }
        }
    }
    segments
}

/// Strip a trailing proper prefix of the closing marker from an in-progress
/// interior.
fn trim_partial_close<'a>(text: &'a str, close: &str) -> &'a str {
    for len in (1..close.len()).rev() {
        if text.ends_with(&close[..len]) {
            return &text[..text.len() - len];
        }
    }
    text
}

/// Markdown spans that are pure whitespace are dropped.
fn push_markdown(segments: &mut Vec<AgentSegment>, text: &str) {
    if !text.trim().is_empty() {
        segments.push(AgentSegment::Markdown {
            text: text.to_string(),
        });
    }
}
