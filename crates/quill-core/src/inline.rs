//! Inline tokenizer and emphasis resolver.
//!
//! `tokenize` splits one physical line into inline tokens in a single
//! left-to-right pass with one character of lookahead. Anything ambiguous
//! (a lone `$`, an unmatched bracket, an empty math interior) stays literal
//! text rather than producing a token, so a half-arrived line is always a
//! valid token sequence.
//!
//! `resolve` is a second pass that runs over plain-text runs only and splits
//! them into styled spans. It never looks inside code, link or math tokens.

use serde::Serialize;

/// A sub-block unit of one line of text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InlineToken {
    Text { text: String },
    CodeSpan { code: String },
    Link { label: String, url: String },
    Math { tex: String },
}

/// Output of the emphasis resolver over one `Text` run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "style", rename_all = "snake_case")]
pub enum StyledSpan {
    Plain { text: String },
    Bold { text: String },
    Italic { text: String },
    Strike { text: String },
}

/// Tokenize one physical line. Multi-line block text goes through
/// [`tokenize_text`], which yields one sequence per line so the caller can
/// insert line breaks between them.
pub fn tokenize(line: &str) -> Vec<InlineToken> {
    let chars: Vec<char> = line.chars().collect();
    let mut tokens = Vec::new();
    let mut text = String::new();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            // \$ is a literal dollar, not a math delimiter. No token
            // boundary is forced.
            '\\' if chars.get(i + 1) == Some(&'$') => {
                text.push('$');
                i += 2;
            }
            '`' => match find_char(&chars, i + 1, '`') {
                Some(close) => {
                    flush_text(&mut tokens, &mut text);
                    tokens.push(InlineToken::CodeSpan {
                        code: collect(&chars, i + 1, close),
                    });
                    i = close + 1;
                }
                None => {
                    text.push('`');
                    i += 1;
                }
            },
            '[' => match scan_link(&chars, i) {
                Some((label, url, next)) => {
                    flush_text(&mut tokens, &mut text);
                    tokens.push(InlineToken::Link { label, url });
                    i = next;
                }
                None => {
                    text.push('[');
                    i += 1;
                }
            },
            '$' => {
                if chars.get(i + 1) == Some(&'$') {
                    // Adjacent double dollars sit next to a display-math
                    // boundary; they are literal text, never an empty math
                    // span.
                    text.push_str("$$");
                    i += 2;
                } else {
                    match scan_inline_math(&chars, i) {
                        Some((tex, next)) => {
                            flush_text(&mut tokens, &mut text);
                            tokens.push(InlineToken::Math { tex });
                            i = next;
                        }
                        None => {
                            text.push('$');
                            i += 1;
                        }
                    }
                }
            }
            c => {
                text.push(c);
                i += 1;
            }
        }
    }
    flush_text(&mut tokens, &mut text);
    tokens
}

/// Tokenize multi-line block text, one token sequence per physical line.
pub fn tokenize_text(text: &str) -> Vec<Vec<InlineToken>> {
    text.split('\n').map(tokenize).collect()
}

fn flush_text(tokens: &mut Vec<InlineToken>, text: &mut String) {
    if !text.is_empty() {
        tokens.push(InlineToken::Text {
            text: std::mem::take(text),
        });
    }
}

fn find_char(chars: &[char], from: usize, needle: char) -> Option<usize> {
    (from..chars.len()).find(|&j| chars[j] == needle)
}

fn collect(chars: &[char], from: usize, to: usize) -> String {
    chars[from..to].iter().collect()
}

/// `[label](url)`: the bracket only becomes a link when the full shape is
/// present on the line.
fn scan_link(chars: &[char], open: usize) -> Option<(String, String, usize)> {
    let close = find_char(chars, open + 1, ']')?;
    if chars.get(close + 1) != Some(&'(') {
        return None;
    }
    let paren = find_char(chars, close + 2, ')')?;
    Some((
        collect(chars, open + 1, close),
        collect(chars, close + 2, paren),
        paren + 1,
    ))
}

/// `$...$` with an unescaped closing dollar and a non-empty trimmed
/// interior; anything less keeps the opening `$` literal.
fn scan_inline_math(chars: &[char], open: usize) -> Option<(String, usize)> {
    let mut j = open + 1;
    while j < chars.len() {
        if chars[j] == '$' && chars[j - 1] != '\\' {
            let interior = collect(chars, open + 1, j);
            let trimmed = interior.trim();
            if trimmed.is_empty() {
                return None;
            }
            return Some((trimmed.to_string(), j + 1));
        }
        j += 1;
    }
    None
}

/// Resolve bold/strike/italic spans within one plain-text run.
///
/// Pattern precedence is bold (`**`) over strike (`~~`) over italic (`*`);
/// matches are found left to right, first match wins at each scan position,
/// and matches never overlap.
pub fn resolve(text: &str) -> Vec<StyledSpan> {
    let chars: Vec<char> = text.chars().collect();
    let mut spans = Vec::new();
    let mut plain = String::new();
    let mut i = 0;

    while i < chars.len() {
        let styled = match_delimited(&chars, i, &['*', '*'])
            .map(|(t, n)| (StyledSpan::Bold { text: t }, n))
            .or_else(|| {
                match_delimited(&chars, i, &['~', '~'])
                    .map(|(t, n)| (StyledSpan::Strike { text: t }, n))
            })
            .or_else(|| {
                match_delimited(&chars, i, &['*']).map(|(t, n)| (StyledSpan::Italic { text: t }, n))
            });
        match styled {
            Some((span, next)) => {
                flush_plain(&mut spans, &mut plain);
                spans.push(span);
                i = next;
            }
            None => {
                plain.push(chars[i]);
                i += 1;
            }
        }
    }
    flush_plain(&mut spans, &mut plain);
    spans
}

fn flush_plain(spans: &mut Vec<StyledSpan>, plain: &mut String) {
    if !plain.is_empty() {
        spans.push(StyledSpan::Plain {
            text: std::mem::take(plain),
        });
    }
}

fn delimiter_at(chars: &[char], at: usize, delim: &[char]) -> bool {
    chars.len() >= at + delim.len() && chars[at..at + delim.len()] == *delim
}

/// Match `delim ... delim` opening at `start` with a non-empty interior and
/// the earliest possible close. Returns the interior and the index just past
/// the closing delimiter.
fn match_delimited(chars: &[char], start: usize, delim: &[char]) -> Option<(String, usize)> {
    if !delimiter_at(chars, start, delim) {
        return None;
    }
    let interior_start = start + delim.len();
    let mut j = interior_start + 1;
    while j + delim.len() <= chars.len() {
        if delimiter_at(chars, j, delim) {
            return Some((collect(chars, interior_start, j), j + delim.len()));
        }
        j += 1;
    }
    None
}
