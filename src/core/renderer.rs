//! Turns generated contract text into print blocks.
//!
//! The generator is asked for plain lines with `**bold**` markup. Headings are
//! guessed from the shape of a line; nothing here can fail on odd input.

use regex::Regex;
use std::sync::LazyLock;

static BOLD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*.*?\*\*").unwrap());
static NUMBERED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\.").unwrap());

const CLAUSE_PREFIX: &str = "CLÁUSULA";
const MIN_HEADING_CHARS: usize = 6;
const MAX_HEADING_CHARS: usize = 99;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span {
    Text(String),
    Bold(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Spacer,
    Heading(String),
    ListItem(Vec<Span>),
    Paragraph(Vec<Span>),
}

/// Splits a line into plain and bold spans. Unpaired `**` stays literal.
pub fn parse_spans(line: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut cursor = 0;
    for m in BOLD.find_iter(line) {
        if m.start() > cursor {
            spans.push(Span::Text(line[cursor..m.start()].to_string()));
        }
        let inner = &m.as_str()[2..m.as_str().len() - 2];
        spans.push(Span::Bold(inner.to_string()));
        cursor = m.end();
    }
    if cursor < line.len() {
        spans.push(Span::Text(line[cursor..].to_string()));
    }
    spans
}

/// Heading test on a trimmed line with the bold markers already removed.
pub fn is_heading(clean: &str) -> bool {
    let chars = clean.chars().count();
    let all_upper = clean == clean.to_uppercase();
    (all_upper && (MIN_HEADING_CHARS..=MAX_HEADING_CHARS).contains(&chars))
        || clean.starts_with(CLAUSE_PREFIX)
        || NUMBERED.is_match(clean)
}

pub fn classify_line(line: &str) -> Block {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Block::Spacer;
    }

    let clean = trimmed.replace("**", "");
    if is_heading(&clean) {
        return Block::Heading(clean);
    }

    if trimmed.starts_with('-') {
        Block::ListItem(parse_spans(line))
    } else {
        Block::Paragraph(parse_spans(line))
    }
}

pub fn render_blocks(text: &str) -> Vec<Block> {
    if text.is_empty() {
        return Vec::new();
    }
    text.split('\n').map(classify_line).collect()
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

fn spans_to_html(spans: &[Span]) -> String {
    spans
        .iter()
        .map(|span| match span {
            Span::Text(t) => escape_html(t),
            Span::Bold(t) => format!("<strong>{}</strong>", escape_html(t)),
        })
        .collect()
}

pub fn blocks_to_html(blocks: &[Block]) -> String {
    let mut html = String::new();
    for block in blocks {
        match block {
            Block::Spacer => html.push_str("<div class=\"spacer\"></div>\n"),
            Block::Heading(text) => {
                html.push_str(&format!(
                    "<h3 class=\"clause-heading\">{}</h3>\n",
                    escape_html(text)
                ));
            }
            Block::ListItem(spans) => {
                html.push_str(&format!(
                    "<p class=\"list-item\">{}</p>\n",
                    spans_to_html(spans)
                ));
            }
            Block::Paragraph(spans) => {
                html.push_str(&format!(
                    "<p class=\"paragraph\">{}</p>\n",
                    spans_to_html(spans)
                ));
            }
        }
    }
    html
}

/// Style rules the block classes above rely on.
pub const BLOCK_CSS: &str = "\
.spacer { height: 1rem; }
.clause-heading { margin: 1.5rem 0 0.75rem; font-weight: bold; text-align: center; text-transform: uppercase; letter-spacing: 0.05em; }
.list-item { padding-left: 2rem; text-align: justify; }
.paragraph { text-align: justify; text-indent: 2rem; }
";

pub fn render_html(text: &str) -> String {
    blocks_to_html(&render_blocks(text))
}
