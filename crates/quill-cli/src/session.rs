//! Streaming session state.
//!
//! Holds the growing buffer snapshot plus the discrete end-of-stream
//! events. All parsing stays in `quill-core` and is recomputed from the
//! full buffer on demand; the session adds nothing stateful beyond the
//! accumulation itself.

use serde::Serialize;

use quill_core::{AgentSegment, SearchLedger};
use quill_render::{html, render_segments, Presenter};

use crate::event::StreamEvent;

#[derive(Debug, Default)]
pub struct StreamSession {
    buffer: String,
    done: bool,
    error: Option<String>,
}

impl StreamSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one raw input line, restoring the newline the line reader
    /// stripped.
    pub fn push_line(&mut self, line: &str) {
        self.buffer.push_str(line);
        self.buffer.push('\n');
    }

    pub fn apply(&mut self, event: StreamEvent) {
        match event {
            StreamEvent::Token { content } => {
                if !self.done {
                    self.buffer.push_str(&content);
                }
            }
            StreamEvent::Done => self.done = true,
            StreamEvent::Error { message } => {
                self.error = Some(message);
                self.done = true;
            }
        }
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Segment the current snapshot.
    pub fn segments(&self) -> Vec<AgentSegment> {
        quill_core::segment(&self.buffer)
    }

    /// Render the current snapshot, with an error banner appended if the
    /// transport reported a failure.
    pub fn render_html(&self, presenter: &dyn Presenter) -> String {
        let mut out = render_segments(&self.segments(), presenter);
        if let Some(message) = &self.error {
            out.push_str(&format!(
                "<div class=\"stream-error\">{}</div>\n",
                html::escape(message)
            ));
        }
        out
    }

    /// Parsed structure dump for `--json` mode.
    pub fn to_json(&self) -> String {
        let segments = self.segments();
        let dump = ParseDump {
            searches: SearchLedger::from_segments(&segments),
            segments,
            error: self.error.clone(),
        };
        serde_json::to_string_pretty(&dump).unwrap_or_else(|_| "{}".to_string())
    }
}

#[derive(Serialize)]
struct ParseDump {
    segments: Vec<AgentSegment>,
    searches: SearchLedger,
    error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_accumulate() {
        let mut session = StreamSession::new();
        session.apply(StreamEvent::Token {
            content: "<think>a".to_string(),
        });
        session.apply(StreamEvent::Token {
            content: "b</think>done".to_string(),
        });
        assert_eq!(session.buffer(), "<think>ab</think>done");
        assert!(!session.is_done());
        assert_eq!(session.segments().len(), 2);
    }

    #[test]
    fn test_tokens_after_done_ignored() {
        let mut session = StreamSession::new();
        session.apply(StreamEvent::Token {
            content: "x".to_string(),
        });
        session.apply(StreamEvent::Done);
        session.apply(StreamEvent::Token {
            content: "y".to_string(),
        });
        assert_eq!(session.buffer(), "x");
        assert!(session.is_done());
    }

    #[test]
    fn test_error_marks_done_and_renders_banner() {
        let mut session = StreamSession::new();
        session.apply(StreamEvent::Token {
            content: "partial".to_string(),
        });
        session.apply(StreamEvent::Error {
            message: "upstream <died>".to_string(),
        });
        assert!(session.is_done());
        let html = session.render_html(&quill_render::HtmlPresenter::new());
        assert!(html.contains("<p>partial</p>"));
        assert!(html.contains("<div class=\"stream-error\">upstream &lt;died&gt;</div>"));
    }

    #[test]
    fn test_json_dump_shape() {
        let mut session = StreamSession::new();
        session.apply(StreamEvent::Token {
            content: "<search>q</search>".to_string(),
        });
        let json = session.to_json();
        assert!(json.contains("\"type\": \"search\""));
        assert!(json.contains("\"query\": \"q\""));
    }
}
