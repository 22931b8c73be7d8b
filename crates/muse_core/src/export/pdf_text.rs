//! Markdown flattened into styled lines for text PDFs.
//!
//! Content generators may annotate text with colour markers such as
//! `[color:primary]Title[/color]`. The text path has no colour support, so
//! markers are stripped before layout.

use once_cell::sync::Lazy;
use regex::Regex;

static COLOR_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[color:[A-Za-z0-9_-]+\]").expect("Regex is valid"));
static COLOR_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[/color\]").expect("Regex is valid"));
static HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(#{1,6})\s+(.*)$").expect("Regex is valid"));
static STRONG: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("Regex is valid"));
static EMPHASIS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*(.+?)\*").expect("Regex is valid"));
static INLINE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`]*)`").expect("Regex is valid"));
static IMAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"!\[([^\]]*)\]\([^)]*\)").expect("Regex is valid"));
static LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]*)\)").expect("Regex is valid"));
static BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*[-*+]\s+(.*)$").expect("Regex is valid"));
static TABLE_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\|?(\s*:?-{3,}:?\s*\|)+\s*:?-*:?\s*$").expect("Regex is valid"));

/// Colour names used when annotating content.
pub const COLOR_PRIMARY: &str = "primary";
pub const COLOR_ACCENT: &str = "accent";

/// Wraps heading titles in the primary colour and bold text in the accent
/// colour.
///
/// ```
/// use muse_core::export::pdf_text::add_color_markers;
///
/// assert_eq!(
///     add_color_markers("## Goals\n\nShip **fast**"),
///     "## [color:primary]Goals[/color]\n\nShip **[color:accent]fast[/color]**"
/// );
/// ```
pub fn add_color_markers(markdown: &str) -> String {
    markdown
        .lines()
        .map(|line| match HEADING.captures(line) {
            Some(caps) => format!("{} [color:{COLOR_PRIMARY}]{}[/color]", &caps[1], &caps[2]),
            None => STRONG
                .replace_all(line, format!("**[color:{COLOR_ACCENT}]$1[/color]**").as_str())
                .into_owned(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Removes every colour marker, keeping the annotated text.
pub fn strip_color_markers(text: &str) -> String {
    let text = COLOR_OPEN.replace_all(text, "");
    COLOR_CLOSE.replace_all(&text, "").into_owned()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    /// Heading of the given level, 1 to 6.
    Heading(u8),
    Body,
    Bullet,
    Code,
    Blank,
}

impl LineStyle {
    /// Font size in points.
    pub fn font_size(&self) -> f32 {
        match self {
            Self::Heading(1) => 20.0,
            Self::Heading(2) => 16.0,
            Self::Heading(_) => 13.0,
            Self::Code => 9.0,
            Self::Body | Self::Bullet | Self::Blank => 11.0,
        }
    }

    /// Vertical space the line takes, in points.
    pub fn line_height(&self) -> f32 {
        self.font_size() * 1.4
    }

    pub fn is_monospace(&self) -> bool {
        matches!(self, Self::Code)
    }

    pub fn is_bold(&self) -> bool {
        matches!(self, Self::Heading(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfLine {
    pub style: LineStyle,
    pub text: String,
}

impl PdfLine {
    fn new(style: LineStyle, text: impl Into<String>) -> Self {
        Self {
            style,
            text: text.into(),
        }
    }
}

fn plain_inline(text: &str) -> String {
    let text = IMAGE.replace_all(text, "$1");
    let text = LINK.replace_all(&text, "$1 ($2)");
    let text = STRONG.replace_all(&text, "$1");
    let text = EMPHASIS.replace_all(&text, "$1");
    INLINE_CODE.replace_all(&text, "$1").into_owned()
}

/// Flattens Markdown into lines with a layout style each.
///
/// Consecutive blank lines collapse into one and inline syntax is removed.
pub fn markdown_to_pdf_lines(markdown: &str) -> Vec<PdfLine> {
    let markdown = strip_color_markers(markdown);
    let mut lines = Vec::new();
    let mut in_code = false;

    for raw in markdown.lines() {
        let trimmed = raw.trim();

        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_code = !in_code;
            continue;
        }

        if in_code {
            lines.push(PdfLine::new(LineStyle::Code, raw.trim_end()));
            continue;
        }

        if trimmed.is_empty() {
            if lines
                .last()
                .is_some_and(|line: &PdfLine| line.style != LineStyle::Blank)
            {
                lines.push(PdfLine::new(LineStyle::Blank, ""));
            }
            continue;
        }

        let line = if let Some(caps) = HEADING.captures(trimmed) {
            PdfLine::new(LineStyle::Heading(caps[1].len() as u8), plain_inline(&caps[2]))
        } else if let Some(caps) = BULLET.captures(trimmed) {
            PdfLine::new(LineStyle::Bullet, format!("- {}", plain_inline(&caps[1])))
        } else if TABLE_SEPARATOR.is_match(trimmed) || trimmed.chars().all(|c| c == '-' || c == '*') {
            continue;
        } else if let Some(row) = trimmed.strip_prefix('|') {
            let cells = row
                .trim_end_matches('|')
                .split('|')
                .map(|cell| plain_inline(cell.trim()))
                .collect::<Vec<_>>();
            PdfLine::new(LineStyle::Body, cells.join("    "))
        } else if let Some(quote) = trimmed.strip_prefix('>') {
            PdfLine::new(LineStyle::Body, plain_inline(quote.trim_start()))
        } else {
            PdfLine::new(LineStyle::Body, plain_inline(trimmed))
        };

        lines.push(line);
    }

    while lines.last().is_some_and(|line| line.style == LineStyle::Blank) {
        lines.pop();
    }

    lines
}

/// Breaks `text` into lines of at most `max_chars` characters at spaces.
///
/// Words longer than a line are hard-split.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut wrapped = Vec::new();
    let mut current = String::new();

    for word in text.split(' ') {
        let mut word = word.to_string();

        while word.chars().count() > max_chars {
            if !current.is_empty() {
                wrapped.push(std::mem::take(&mut current));
            }
            let split_at = word
                .char_indices()
                .nth(max_chars)
                .map(|(idx, _)| idx)
                .unwrap_or(word.len());
            let rest = word.split_off(split_at);
            wrapped.push(word);
            word = rest;
        }

        let needed = current.chars().count() + usize::from(!current.is_empty()) + word.chars().count();
        if !current.is_empty() && needed > max_chars {
            wrapped.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }

    if !current.is_empty() || wrapped.is_empty() {
        wrapped.push(current);
    }

    wrapped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_color_markers() {
        assert_eq!(
            strip_color_markers("[color:primary]Title[/color] and [color:accent-2]more[/color]"),
            "Title and more"
        );
        assert_eq!(strip_color_markers("[color:]x"), "[color:]x");
    }

    #[test]
    fn test_markers_are_a_no_op_for_pdf_text() {
        let markdown = "# Goals\n\nShip **fast** today";
        assert_eq!(
            markdown_to_pdf_lines(&add_color_markers(markdown)),
            markdown_to_pdf_lines(markdown)
        );
    }

    #[test]
    fn test_markdown_to_pdf_lines() {
        let markdown = "# Title\n\n\n\nSee [docs](https://x.io) and `code`.\n\n- one\n* two\n\n```rust\nlet x = 1;\n```\n\n| A | B |\n| --- | --- |\n| 1 | 2 |\n\n> quoted\n\n---\n";
        let lines = markdown_to_pdf_lines(markdown);
        assert_eq!(
            lines,
            vec![
                PdfLine::new(LineStyle::Heading(1), "Title"),
                PdfLine::new(LineStyle::Blank, ""),
                PdfLine::new(LineStyle::Body, "See docs (https://x.io) and code."),
                PdfLine::new(LineStyle::Blank, ""),
                PdfLine::new(LineStyle::Bullet, "- one"),
                PdfLine::new(LineStyle::Bullet, "- two"),
                PdfLine::new(LineStyle::Blank, ""),
                PdfLine::new(LineStyle::Code, "let x = 1;"),
                PdfLine::new(LineStyle::Blank, ""),
                PdfLine::new(LineStyle::Body, "A    B"),
                PdfLine::new(LineStyle::Body, "1    2"),
                PdfLine::new(LineStyle::Blank, ""),
                PdfLine::new(LineStyle::Body, "quoted"),
            ]
        );
    }

    #[test]
    fn test_wrap_text() {
        assert_eq!(wrap_text("aaa bbb ccc", 7), vec!["aaa bbb", "ccc"]);
        assert_eq!(wrap_text("abcdefgh", 3), vec!["abc", "def", "gh"]);
        assert_eq!(wrap_text("", 5), vec![""]);
    }
}
