//! Block-level Markdown parser.
//!
//! `parse` consumes the full raw buffer line by line and produces an ordered
//! sequence of blocks. It runs on every buffer snapshot while tokens are
//! still streaming in, so it must never fail: an unterminated fence means the
//! closing marker simply has not arrived yet, and the fence consumes to end
//! of input instead of erroring.
//!
//! Block-start patterns are tested in a fixed precedence order, first match
//! wins. Each pattern is a named scanner function so the precedence stays
//! auditable and each classifier is testable on its own.

use serde::Serialize;

/// A top-level structural unit of parsed document text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// Fenced code with an optional language tag.
    Code {
        language: Option<String>,
        code: String,
    },
    /// `$$`-fenced math. Block math is always display mode.
    Math { tex: String },
    Heading { level: u8, text: String },
    HorizontalRule,
    Blockquote { text: String },
    UnorderedList { items: Vec<String> },
    OrderedList { items: Vec<String> },
    Paragraph { text: String },
}

/// Parse a buffer snapshot into an ordered block sequence.
///
/// Total over its input: the empty buffer produces an empty sequence, and
/// malformed or truncated input degrades to paragraphs or consume-to-end
/// fences. Blocks never overlap and appear in source order; blank separator
/// lines between blocks are skipped, not emitted.
pub fn parse(buffer: &str) -> Vec<Block> {
    let buffer = crate::normalize(buffer);
    let lines: Vec<&str> = buffer.lines().collect();
    let mut blocks = Vec::new();
    let mut cursor = 0;

    while cursor < lines.len() {
        if lines[cursor].trim().is_empty() {
            cursor += 1;
            continue;
        }
        // Precedence is load-bearing: a ``` line must never be read as a
        // paragraph, and *** is a rule before it is a list marker.
        let (block, next) = scan_fenced_code(&lines, cursor)
            .or_else(|| scan_math_fence(&lines, cursor))
            .or_else(|| scan_horizontal_rule(&lines, cursor))
            .or_else(|| scan_heading(&lines, cursor))
            .or_else(|| scan_blockquote(&lines, cursor))
            .or_else(|| scan_unordered_list(&lines, cursor))
            .or_else(|| scan_ordered_list(&lines, cursor))
            .unwrap_or_else(|| scan_paragraph(&lines, cursor));
        debug_assert!(next > cursor, "scanner must consume at least one line");
        blocks.push(block);
        cursor = next;
    }
    blocks
}

/// Strip up to three leading spaces. Four or more disqualify the line from
/// the indent-tolerant patterns (heading, blockquote, unordered list).
fn strip_indent(line: &str) -> Option<&str> {
    let spaces = line.len() - line.trim_start_matches(' ').len();
    if spaces <= 3 {
        Some(&line[spaces..])
    } else {
        None
    }
}

fn scan_fenced_code(lines: &[&str], start: usize) -> Option<(Block, usize)> {
    let trimmed = lines[start].trim();
    if !trimmed.starts_with("```") {
        return None;
    }
    let tag = trimmed[3..].trim();
    let language = if tag.is_empty() {
        None
    } else {
        Some(tag.to_string())
    };
    let mut body: Vec<&str> = Vec::new();
    let mut i = start + 1;
    while i < lines.len() {
        if lines[i].trim() == "```" {
            return Some((
                Block::Code {
                    language,
                    code: body.join("\n"),
                },
                i + 1,
            ));
        }
        body.push(lines[i]);
        i += 1;
    }
    // No closing fence in the buffer yet: consume to end of input.
    Some((
        Block::Code {
            language,
            code: body.join("\n"),
        },
        lines.len(),
    ))
}

fn scan_math_fence(lines: &[&str], start: usize) -> Option<(Block, usize)> {
    let trimmed = lines[start].trim();
    if !trimmed.starts_with("$$") {
        return None;
    }
    // Single-line form: $$...$$ complete on one line.
    if trimmed.len() > 4 && trimmed.ends_with("$$") {
        let tex = trimmed[2..trimmed.len() - 2].trim().to_string();
        return Some((Block::Math { tex }, start + 1));
    }
    let mut body: Vec<String> = Vec::new();
    let rest = &trimmed[2..];
    if !rest.is_empty() {
        body.push(rest.to_string());
    }
    let mut i = start + 1;
    while i < lines.len() {
        let t = lines[i].trim();
        if t.ends_with("$$") {
            let before = &t[..t.len() - 2];
            if !before.is_empty() {
                body.push(before.to_string());
            }
            let tex = body.join("\n").trim().to_string();
            return Some((Block::Math { tex }, i + 1));
        }
        body.push(lines[i].to_string());
        i += 1;
    }
    // Unterminated math fence degrades the same way code fences do.
    let tex = body.join("\n").trim().to_string();
    Some((Block::Math { tex }, lines.len()))
}

/// Three or more of the same character from `-*_` and nothing else.
fn is_rule_line(line: &str) -> bool {
    let t = line.trim();
    if t.len() < 3 {
        return false;
    }
    let mut chars = t.chars();
    match chars.next() {
        Some(first @ ('-' | '*' | '_')) => chars.all(|c| c == first),
        _ => false,
    }
}

fn scan_horizontal_rule(lines: &[&str], start: usize) -> Option<(Block, usize)> {
    if is_rule_line(lines[start]) {
        Some((Block::HorizontalRule, start + 1))
    } else {
        None
    }
}

/// 1-6 leading `#`, required whitespace, non-empty text.
fn heading_parts(line: &str) -> Option<(u8, &str)> {
    let stripped = strip_indent(line)?;
    let hashes = stripped.chars().take_while(|&c| c == '#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let rest = &stripped[hashes..];
    if !rest.starts_with([' ', '\t']) {
        return None;
    }
    let text = rest.trim();
    if text.is_empty() {
        return None;
    }
    Some((hashes as u8, text))
}

fn scan_heading(lines: &[&str], start: usize) -> Option<(Block, usize)> {
    let (level, text) = heading_parts(lines[start])?;
    Some((
        Block::Heading {
            level,
            text: text.to_string(),
        },
        start + 1,
    ))
}

/// Quote-prefixed content of a line: `>` with an optional single space after
/// it stripped. `None` for non-quote lines.
fn blockquote_content(line: &str) -> Option<&str> {
    let stripped = strip_indent(line)?;
    let rest = stripped.strip_prefix('>')?;
    Some(rest.strip_prefix(' ').unwrap_or(rest))
}

fn scan_blockquote(lines: &[&str], start: usize) -> Option<(Block, usize)> {
    let first = blockquote_content(lines[start])?;
    let mut body = vec![first.to_string()];
    let mut i = start + 1;
    while i < lines.len() {
        if let Some(content) = blockquote_content(lines[i]) {
            body.push(content.to_string());
        } else if lines[i].trim().is_empty() {
            // Blank lines are kept inside the quote even when quoting has
            // logically ended. Documented source behavior; see DESIGN.md.
            body.push(String::new());
        } else {
            break;
        }
        i += 1;
    }
    Some((
        Block::Blockquote {
            text: body.join("\n").trim().to_string(),
        },
        i,
    ))
}

/// `-`/`*`/`+` marker plus whitespace plus text; any of the three markers
/// belongs to the same list class.
fn unordered_item(line: &str) -> Option<&str> {
    let stripped = strip_indent(line)?;
    if !stripped.starts_with(['-', '*', '+']) {
        return None;
    }
    let rest = &stripped[1..];
    if !rest.starts_with([' ', '\t']) {
        return None;
    }
    let item = rest.trim_start();
    if item.is_empty() {
        return None;
    }
    Some(item)
}

fn scan_unordered_list(lines: &[&str], start: usize) -> Option<(Block, usize)> {
    unordered_item(lines[start])?;
    let mut items = Vec::new();
    let mut i = start;
    while i < lines.len() {
        match unordered_item(lines[i]) {
            Some(item) => {
                items.push(item.to_string());
                i += 1;
            }
            None => break,
        }
    }
    Some((Block::UnorderedList { items }, i))
}

/// One or more digits, `.`, whitespace, text.
fn ordered_item(line: &str) -> Option<&str> {
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let rest = line[digits..].strip_prefix('.')?;
    if !rest.starts_with([' ', '\t']) {
        return None;
    }
    let item = rest.trim_start();
    if item.is_empty() {
        return None;
    }
    Some(item)
}

fn scan_ordered_list(lines: &[&str], start: usize) -> Option<(Block, usize)> {
    ordered_item(lines[start])?;
    let mut items = Vec::new();
    let mut i = start;
    while i < lines.len() {
        match ordered_item(lines[i]) {
            Some(item) => {
                items.push(item.to_string());
                i += 1;
            }
            None => break,
        }
    }
    Some((Block::OrderedList { items }, i))
}

/// Would this line start any non-paragraph block? Used to end paragraph
/// accumulation without consuming the line.
fn starts_other_block(line: &str) -> bool {
    let t = line.trim();
    t.starts_with("```")
        || t.starts_with("$$")
        || is_rule_line(line)
        || heading_parts(line).is_some()
        || blockquote_content(line).is_some()
        || unordered_item(line).is_some()
        || ordered_item(line).is_some()
}

/// Fallback: consecutive non-blank lines that match nothing else, internal
/// newlines preserved.
fn scan_paragraph(lines: &[&str], start: usize) -> (Block, usize) {
    let mut body = vec![lines[start]];
    let mut i = start + 1;
    while i < lines.len() && !lines[i].trim().is_empty() && !starts_other_block(lines[i]) {
        body.push(lines[i]);
        i += 1;
    }
    (
        Block::Paragraph {
            text: body.join("\n"),
        },
        i,
    )
}
