//! Rendering composer.
//!
//! Walks the parsed structure and dispatches every variant to a
//! presentation primitive. All presentation lives behind the [`Presenter`]
//! trait; the composer itself is stateless and carries no logic beyond the
//! variant-to-primitive mapping and the parse pipeline wiring.

use quill_core::{AgentSegment, Block, InlineToken, StyledSpan};
use tracing::debug;

/// Display title for a reasoning region whose closing tag has not arrived.
pub const THINK_TITLE_IN_PROGRESS: &str = "Thinking (in progress)";
/// Display title for a completed reasoning region.
pub const THINK_TITLE_COMPLETE: &str = "Thinking (complete)";

/// Presentation seam: one primitive per parsed variant, each returning a
/// markup fragment. Implementations hold whatever engine handles they need;
/// the composer passes parsed data through verbatim.
pub trait Presenter {
    fn text(&self, text: &str) -> String;
    fn bold(&self, text: &str) -> String;
    fn italic(&self, text: &str) -> String;
    fn strike(&self, text: &str) -> String;
    fn code_span(&self, code: &str) -> String;
    fn link(&self, label: &str, url: &str) -> String;
    fn inline_math(&self, tex: &str) -> String;
    fn line_break(&self) -> String;

    fn heading(&self, level: u8, inline: &str) -> String;
    fn paragraph(&self, inline: &str) -> String;
    fn code_block(&self, language: Option<&str>, code: &str) -> String;
    fn math_block(&self, tex: &str) -> String;
    fn horizontal_rule(&self) -> String;
    fn blockquote(&self, inline: &str) -> String;
    fn unordered_list(&self, items: &[String]) -> String;
    fn ordered_list(&self, items: &[String]) -> String;

    fn think(&self, title: &str, body: &str) -> String;
    fn search(&self, query: &str, in_progress: bool) -> String;
    fn search_result(&self, body: &str, in_progress: bool) -> String;
}

/// Render a raw buffer snapshot end to end: segment, parse, present.
pub fn render(buffer: &str, presenter: &dyn Presenter) -> String {
    render_segments(&quill_core::segment(buffer), presenter)
}

/// Render an already-segmented buffer. Tagged regions re-run the block
/// parser on their interior text where markdown can appear inside them.
pub fn render_segments(segments: &[AgentSegment], presenter: &dyn Presenter) -> String {
    debug!(count = segments.len(), "composing segments");
    let mut out = String::new();
    for seg in segments {
        match seg {
            AgentSegment::Markdown { text } => out.push_str(&render_markdown(text, presenter)),
            AgentSegment::Think { text, in_progress } => {
                let title = if *in_progress {
                    THINK_TITLE_IN_PROGRESS
                } else {
                    THINK_TITLE_COMPLETE
                };
                let body = render_markdown(text, presenter);
                out.push_str(&presenter.think(title, &body));
            }
            AgentSegment::Search { text, in_progress } => {
                out.push_str(&presenter.search(text.trim(), *in_progress));
            }
            AgentSegment::SearchResult { text, in_progress } => {
                let body = render_markdown(text, presenter);
                out.push_str(&presenter.search_result(&body, *in_progress));
            }
        }
    }
    out
}

/// Markdown text to markup: block parse, then per-block inline rendering.
pub fn render_markdown(text: &str, presenter: &dyn Presenter) -> String {
    quill_core::parse(text)
        .iter()
        .map(|block| render_block(block, presenter))
        .collect()
}

fn render_block(block: &Block, presenter: &dyn Presenter) -> String {
    match block {
        Block::Code { language, code } => presenter.code_block(language.as_deref(), code),
        Block::Math { tex } => presenter.math_block(tex),
        Block::Heading { level, text } => {
            let inline = render_inline(text, presenter);
            presenter.heading(*level, &inline)
        }
        Block::HorizontalRule => presenter.horizontal_rule(),
        Block::Blockquote { text } => {
            let inline = render_inline(text, presenter);
            presenter.blockquote(&inline)
        }
        Block::UnorderedList { items } => {
            let rendered: Vec<String> = items
                .iter()
                .map(|item| render_inline(item, presenter))
                .collect();
            presenter.unordered_list(&rendered)
        }
        Block::OrderedList { items } => {
            let rendered: Vec<String> = items
                .iter()
                .map(|item| render_inline(item, presenter))
                .collect();
            presenter.ordered_list(&rendered)
        }
        Block::Paragraph { text } => {
            let inline = render_inline(text, presenter);
            presenter.paragraph(&inline)
        }
    }
}

/// Inline pipeline for one block's text: tokenize each physical line,
/// resolve emphasis within plain-text runs, and join lines with the
/// presenter's break primitive.
pub fn render_inline(text: &str, presenter: &dyn Presenter) -> String {
    let mut out = String::new();
    for (idx, tokens) in quill_core::tokenize_text(text).iter().enumerate() {
        if idx > 0 {
            out.push_str(&presenter.line_break());
        }
        for token in tokens {
            match token {
                InlineToken::Text { text } => {
                    for span in quill_core::resolve(text) {
                        match span {
                            StyledSpan::Plain { text } => out.push_str(&presenter.text(&text)),
                            StyledSpan::Bold { text } => out.push_str(&presenter.bold(&text)),
                            StyledSpan::Italic { text } => out.push_str(&presenter.italic(&text)),
                            StyledSpan::Strike { text } => out.push_str(&presenter.strike(&text)),
                        }
                    }
                }
                InlineToken::CodeSpan { code } => out.push_str(&presenter.code_span(code)),
                InlineToken::Link { label, url } => out.push_str(&presenter.link(label, url)),
                InlineToken::Math { tex } => out.push_str(&presenter.inline_math(tex)),
            }
        }
    }
    out
}
