//! HTML presentation primitives.
//!
//! Fenced code goes through syntect's HTML generator; math goes through the
//! adapter, falling back to the literal delimited source with a
//! `math-error` class when the engine rejects it. Everything else is plain
//! escaped markup.

use once_cell::sync::Lazy;
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;
use tracing::warn;

use crate::compose::Presenter;
use crate::math::{KatexEngine, MathEngine};

/// Lazily loaded syntax and theme sets for code highlighting.
static SYNTAX_SET: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: Lazy<ThemeSet> = Lazy::new(ThemeSet::load_defaults);

const DEFAULT_THEME: &str = "base16-ocean.dark";

/// HTML-emitting presenter.
pub struct HtmlPresenter {
    engine: Box<dyn MathEngine>,
    theme: String,
}

impl Default for HtmlPresenter {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlPresenter {
    pub fn new() -> Self {
        Self::with_engine(Box::new(KatexEngine))
    }

    pub fn with_engine(engine: Box<dyn MathEngine>) -> Self {
        Self {
            engine,
            theme: DEFAULT_THEME.to_string(),
        }
    }

    /// Select a syntect theme by name; unknown names fall back to the
    /// default at render time.
    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = theme.into();
        self
    }

    fn math(&self, tex: &str, display: bool) -> String {
        match self.engine.render(tex, display) {
            Ok(markup) => markup,
            Err(err) => {
                warn!(%err, "math rendering failed, falling back to source");
                let delim = if display { "$$" } else { "$" };
                format!(
                    r#"<span class="math-error">{delim}{}{delim}</span>"#,
                    escape(tex)
                )
            }
        }
    }

    fn highlight(&self, language: &str, code: &str) -> Option<String> {
        let syntax = SYNTAX_SET.find_syntax_by_token(language)?;
        let theme = THEME_SET
            .themes
            .get(&self.theme)
            .or_else(|| THEME_SET.themes.get(DEFAULT_THEME))?;
        match highlighted_html_for_string(code, &SYNTAX_SET, syntax, theme) {
            Ok(html) => Some(html),
            Err(err) => {
                warn!(%err, language, "code highlighting failed");
                None
            }
        }
    }
}

impl Presenter for HtmlPresenter {
    fn text(&self, text: &str) -> String {
        escape(text)
    }

    fn bold(&self, text: &str) -> String {
        format!("<strong>{}</strong>", escape(text))
    }

    fn italic(&self, text: &str) -> String {
        format!("<em>{}</em>", escape(text))
    }

    fn strike(&self, text: &str) -> String {
        format!("<del>{}</del>", escape(text))
    }

    fn code_span(&self, code: &str) -> String {
        format!("<code>{}</code>", escape(code))
    }

    fn link(&self, label: &str, url: &str) -> String {
        format!(
            r#"<a href="{}" target="_blank" rel="noopener">{}</a>"#,
            escape(url),
            escape(label)
        )
    }

    fn inline_math(&self, tex: &str) -> String {
        self.math(tex, false)
    }

    fn line_break(&self) -> String {
        "<br>".to_string()
    }

    fn heading(&self, level: u8, inline: &str) -> String {
        format!("<h{level}>{inline}</h{level}>\n")
    }

    fn paragraph(&self, inline: &str) -> String {
        format!("<p>{inline}</p>\n")
    }

    fn code_block(&self, language: Option<&str>, code: &str) -> String {
        let body = language
            .and_then(|lang| self.highlight(lang, code))
            .unwrap_or_else(|| format!("<pre><code>{}</code></pre>", escape(code)));
        match language {
            Some(lang) => format!(
                "<div class=\"code-block\" data-language=\"{}\">{body}</div>\n",
                escape(lang)
            ),
            None => format!("<div class=\"code-block\">{body}</div>\n"),
        }
    }

    fn math_block(&self, tex: &str) -> String {
        format!("<div class=\"math-block\">{}</div>\n", self.math(tex, true))
    }

    fn horizontal_rule(&self) -> String {
        "<hr>\n".to_string()
    }

    fn blockquote(&self, inline: &str) -> String {
        format!("<blockquote>{inline}</blockquote>\n")
    }

    fn unordered_list(&self, items: &[String]) -> String {
        let items: String = items
            .iter()
            .map(|item| format!("<li>{item}</li>"))
            .collect();
        format!("<ul>{items}</ul>\n")
    }

    fn ordered_list(&self, items: &[String]) -> String {
        let items: String = items
            .iter()
            .map(|item| format!("<li>{item}</li>"))
            .collect();
        format!("<ol>{items}</ol>\n")
    }

    fn think(&self, title: &str, body: &str) -> String {
        format!(
            "<details class=\"think\" open><summary>{}</summary>\n{body}</details>\n",
            escape(title)
        )
    }

    fn search(&self, query: &str, in_progress: bool) -> String {
        let state = if in_progress { "searching" } else { "done" };
        format!(
            "<div class=\"search-query {state}\">{}</div>\n",
            escape(query)
        )
    }

    fn search_result(&self, body: &str, in_progress: bool) -> String {
        let state = if in_progress { "searching" } else { "done" };
        format!("<div class=\"search-result {state}\">{body}</div>\n")
    }
}

/// Minimal HTML escaping for text content and attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Wrap a rendered fragment in a standalone page with the KaTeX stylesheet
/// and a small amount of structural CSS.
pub fn standalone_page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/katex@0.16.11/dist/katex.min.css">
<style>
body {{ max-width: 48rem; margin: 2rem auto; font-family: sans-serif; line-height: 1.6; }}
.code-block pre {{ padding: 0.75rem; border-radius: 6px; overflow-x: auto; }}
details.think {{ color: #666; border-left: 3px solid #ccc; padding-left: 0.75rem; margin: 0.5rem 0; }}
.search-query {{ display: inline-block; background: #eef; border-radius: 1rem; padding: 0.2rem 0.8rem; margin: 0.25rem 0; }}
.search-query.searching {{ font-style: italic; }}
.search-result {{ background: #f7f7f7; border-radius: 6px; padding: 0.5rem 0.75rem; margin: 0.25rem 0; }}
.math-error {{ color: #b00; font-family: monospace; }}
</style>
</head>
<body>
{body}
</body>
</html>
"#,
        title = escape(title),
        body = body
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::{render, render_markdown};
    use crate::math::test_support::{EchoEngine, FailingEngine};

    fn presenter() -> HtmlPresenter {
        HtmlPresenter::with_engine(Box::new(EchoEngine))
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("a < b & c > \"d\""), "a &lt; b &amp; c &gt; &quot;d&quot;");
    }

    #[test]
    fn test_paragraph_with_styles() {
        let html = render_markdown("Some **bold** and `code`.", &presenter());
        assert_eq!(
            html,
            "<p>Some <strong>bold</strong> and <code>code</code>.</p>\n"
        );
    }

    #[test]
    fn test_heading_levels() {
        let html = render_markdown("## Two", &presenter());
        assert_eq!(html, "<h2>Two</h2>\n");
    }

    #[test]
    fn test_multi_line_paragraph_gets_breaks() {
        let html = render_markdown("one\ntwo", &presenter());
        assert_eq!(html, "<p>one<br>two</p>\n");
    }

    #[test]
    fn test_text_content_is_escaped() {
        let html = render_markdown("1 < 2 & 3", &presenter());
        assert_eq!(html, "<p>1 &lt; 2 &amp; 3</p>\n");
    }

    #[test]
    fn test_inline_math_through_engine() {
        let html = render_markdown("so $a+b$ holds", &presenter());
        assert_eq!(
            html,
            "<p>so <math display=\"false\">a+b</math> holds</p>\n"
        );
    }

    #[test]
    fn test_math_block_through_engine() {
        let html = render_markdown("$$x=1$$", &presenter());
        assert_eq!(
            html,
            "<div class=\"math-block\"><math display=\"true\">x=1</math></div>\n"
        );
    }

    #[test]
    fn test_math_fallback_shows_delimited_source() {
        let failing = HtmlPresenter::with_engine(Box::new(FailingEngine));
        let html = render_markdown("$$x<1$$", &failing);
        assert_eq!(
            html,
            "<div class=\"math-block\"><span class=\"math-error\">$$x&lt;1$$</span></div>\n"
        );
        let inline = render_markdown("try $a+b$", &failing);
        assert_eq!(
            inline,
            "<p>try <span class=\"math-error\">$a+b$</span></p>\n"
        );
    }

    #[test]
    fn test_code_block_without_language_is_escaped_pre() {
        let html = render_markdown("```\na < b\n```", &presenter());
        assert_eq!(
            html,
            "<div class=\"code-block\"><pre><code>a &lt; b</code></pre></div>\n"
        );
    }

    #[test]
    fn test_code_block_with_unknown_language_falls_back() {
        let html = render_markdown("```nosuchlang\nx\n```", &presenter());
        assert!(html.contains("data-language=\"nosuchlang\""));
        assert!(html.contains("<pre><code>x</code></pre>"));
    }

    #[test]
    fn test_lists() {
        let html = render_markdown("- a\n- b", &presenter());
        assert_eq!(html, "<ul><li>a</li><li>b</li></ul>\n");
        let html = render_markdown("1. a\n2. b", &presenter());
        assert_eq!(html, "<ol><li>a</li><li>b</li></ol>\n");
    }

    #[test]
    fn test_think_segment_titles() {
        let html = render("<think>why</think>", &presenter());
        assert!(html.contains("<summary>Thinking (complete)</summary>"));
        let html = render("<think>why", &presenter());
        assert!(html.contains("<summary>Thinking (in progress)</summary>"));
    }

    #[test]
    fn test_search_segments() {
        let html = render("<search> weather </search>", &presenter());
        assert_eq!(html, "<div class=\"search-query done\">weather</div>\n");
        let html = render("<search>weather", &presenter());
        assert_eq!(
            html,
            "<div class=\"search-query searching\">weather</div>\n"
        );
    }

    #[test]
    fn test_search_result_body_rendered_as_markdown() {
        let html = render(
            "<search_result>**summary** text</search_result>",
            &presenter(),
        );
        assert_eq!(
            html,
            "<div class=\"search-result done\"><p><strong>summary</strong> text</p>\n</div>\n"
        );
    }

    #[test]
    fn test_full_pipeline_snapshot() {
        let html = render(
            "<think>check $x$</think># Answer\n\nIt is **42**.",
            &presenter(),
        );
        assert_eq!(
            html,
            "<details class=\"think\" open><summary>Thinking (complete)</summary>\n\
             <p>check <math display=\"false\">x</math></p>\n</details>\n\
             <h1>Answer</h1>\n<p>It is <strong>42</strong>.</p>\n"
        );
    }

    #[test]
    fn test_standalone_page_wraps_body() {
        let page = standalone_page("t < t", "<p>x</p>");
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<title>t &lt; t</title>"));
        assert!(page.contains("<p>x</p>"));
    }
}
