//! Splitting content into ordered, classified blocks.
//!
//! A block is the unit the typing reveal works on: one heading, paragraph,
//! list, code block or quote. Blocks are produced fresh on every split and
//! carry an opaque id that is not derived from their content, so two identical
//! paragraphs still get distinct identities.

use crate::document::SourceFormat;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Node};
use serde::{Deserialize, Serialize};

/// Classification of a block by its leading syntax or tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Heading,
    Paragraph,
    List,
    Code,
    Quote,
}

impl BlockKind {
    /// Classifies an HTML element by its tag name.
    pub fn from_tag(tag: &str) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => Self::Heading,
            "ul" | "ol" => Self::List,
            "pre" | "code" => Self::Code,
            "blockquote" => Self::Quote,
            _ => Self::Paragraph,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Heading => "heading",
            Self::Paragraph => "paragraph",
            Self::List => "list",
            Self::Code => "code",
            Self::Quote => "quote",
        }
    }
}

/// A contiguous, classified unit of content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBlock {
    /// Opaque identity assigned at split time.
    pub id: String,
    /// Text payload, never blank.
    pub content: String,
    #[serde(rename = "type")]
    pub kind: BlockKind,
}

impl ContentBlock {
    pub fn new(kind: BlockKind, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            content: content.into(),
            kind,
        }
    }

    /// Number of characters the typing reveal walks through.
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }
}

static SEGMENT_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{2,}").unwrap());
static HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#{1,6}\s").unwrap());
static LIST_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:[*+-]|\d+\.)\s").unwrap());
static QUOTE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^>\s").unwrap());

const FENCE: &str = "```";

/// Tags whose boundaries become line breaks when flattening an element to text.
const LINE_BREAKING_TAGS: &[&str] = &[
    "address", "article", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption", "figure",
    "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "ol", "p", "pre",
    "section", "table", "tr", "ul",
];

/// Splits `source` into blocks according to `format`.
///
/// The result preserves source order and never contains a block whose content
/// is blank.
///
/// # Example
///
/// ```
/// use muse_core::blocks::{split_blocks, BlockKind};
/// use muse_core::SourceFormat;
///
/// let blocks = split_blocks("# A\n\nB\n\nC", SourceFormat::Markdown);
/// let kinds: Vec<_> = blocks.iter().map(|b| b.kind).collect();
/// assert_eq!(kinds, [BlockKind::Heading, BlockKind::Paragraph, BlockKind::Paragraph]);
/// ```
pub fn split_blocks(source: &str, format: SourceFormat) -> Vec<ContentBlock> {
    let blocks = match format {
        SourceFormat::Html => split_html(source),
        SourceFormat::Markdown => split_markdown(source),
        SourceFormat::PlainText => split_plain_text(source),
    };

    tracing::debug!(
        format = format.name(),
        source_len = source.len(),
        blocks = blocks.len(),
        "Split content into blocks"
    );

    blocks
}

/// Splits a fragment on its top-level nodes.
pub fn split_html(source: &str) -> Vec<ContentBlock> {
    let fragment = Html::parse_fragment(source);
    let root = fragment.root_element();

    let mut blocks = Vec::new();

    for child in root.children() {
        match child.value() {
            Node::Text(text) => {
                let text = text.trim();
                if !text.is_empty() {
                    blocks.push(ContentBlock::new(BlockKind::Paragraph, text));
                }
            }
            Node::Element(element) => {
                let Some(element_ref) = ElementRef::wrap(child) else {
                    continue;
                };
                let kind = BlockKind::from_tag(element.name());
                let text = match kind {
                    BlockKind::Code => element_ref
                        .text()
                        .collect::<String>()
                        .trim_matches('\n')
                        .to_string(),
                    _ => inner_text(element_ref),
                };
                if !text.trim().is_empty() {
                    blocks.push(ContentBlock::new(kind, text));
                }
            }
            _ => {}
        }
    }

    blocks
}

/// Flattens an element to its rendered text: tags dropped, block-level
/// boundaries turned into line breaks, blank lines removed.
fn inner_text(element: ElementRef) -> String {
    let mut raw = String::new();

    for node in element.descendants() {
        match node.value() {
            Node::Text(text) => raw.push_str(text),
            Node::Element(el) if LINE_BREAKING_TAGS.contains(&el.name()) => raw.push('\n'),
            _ => {}
        }
    }

    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Splits Markdown on blank-line runs and classifies each segment by its
/// leading syntax. Segments keep their Markdown markers.
pub fn split_markdown(source: &str) -> Vec<ContentBlock> {
    segments(source)
        .into_iter()
        .map(|segment| {
            let kind = classify_markdown(&segment);
            ContentBlock::new(kind, segment)
        })
        .collect()
}

/// Splits on blank-line runs; every segment becomes a paragraph verbatim.
pub fn split_plain_text(source: &str) -> Vec<ContentBlock> {
    let source = source.replace("\r\n", "\n");
    SEGMENT_SEPARATOR
        .split(&source)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(|segment| ContentBlock::new(BlockKind::Paragraph, segment))
        .collect()
}

/// Classifies a trimmed Markdown segment.
pub fn classify_markdown(segment: &str) -> BlockKind {
    if HEADING.is_match(segment) {
        BlockKind::Heading
    } else if LIST_ITEM.is_match(segment) {
        BlockKind::List
    } else if segment.len() >= 2 * FENCE.len()
        && segment.starts_with(FENCE)
        && segment.ends_with(FENCE)
    {
        BlockKind::Code
    } else if QUOTE.is_match(segment) {
        BlockKind::Quote
    } else {
        BlockKind::Paragraph
    }
}

/// Trimmed, non-empty Markdown segments. A fenced code block containing blank
/// lines is kept as the exact source text between its fences.
fn segments(source: &str) -> Vec<String> {
    let source = source.replace("\r\n", "\n");

    let mut segments: Vec<String> = Vec::new();
    // Byte offset where the currently open fence starts.
    let mut open_fence: Option<usize> = None;
    let mut piece_start = 0;

    let separators = SEGMENT_SEPARATOR
        .find_iter(&source)
        .map(|m| (m.start(), m.end()))
        .chain(std::iter::once((source.len(), source.len())));

    for (piece_end, next_start) in separators {
        let raw = &source[piece_start..piece_end];
        let start = piece_start + (raw.len() - raw.trim_start().len());
        let end = piece_start + raw.trim_end().len();
        piece_start = next_start;

        let piece = if start < end { &source[start..end] } else { "" };

        if let Some(fence_start) = open_fence {
            if fence_count(piece) % 2 == 1 {
                segments.push(source[fence_start..end].to_string());
                open_fence = None;
            }
            continue;
        }

        if piece.is_empty() {
            continue;
        }

        if piece.starts_with(FENCE) && fence_count(piece) % 2 == 1 {
            open_fence = Some(start);
        } else {
            segments.push(piece.to_string());
        }
    }

    // An unterminated fence keeps everything after it.
    if let Some(fence_start) = open_fence {
        segments.push(source[fence_start..].trim_end().to_string());
    }

    segments
}

fn fence_count(text: &str) -> usize {
    text.lines()
        .filter(|line| line.trim_start().starts_with(FENCE))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(blocks: &[ContentBlock]) -> Vec<BlockKind> {
        blocks.iter().map(|b| b.kind).collect()
    }

    fn contents(blocks: &[ContentBlock]) -> Vec<&str> {
        blocks.iter().map(|b| b.content.as_str()).collect()
    }

    #[test]
    fn test_markdown_classification() {
        let blocks = split_blocks("# A\n\nB\n\nC", SourceFormat::Markdown);
        assert_eq!(
            kinds(&blocks),
            vec![BlockKind::Heading, BlockKind::Paragraph, BlockKind::Paragraph]
        );
        assert_eq!(contents(&blocks), vec!["# A", "B", "C"]);
    }

    #[test]
    fn test_markdown_all_kinds() {
        let source = "## Title\n\n- one\n- two\n\n3. three\n\n```rust\nfn main() {}\n```\n\n> quoted\n\n**bold** text\n\n#hashtag";
        let blocks = split_markdown(source);
        assert_eq!(
            kinds(&blocks),
            vec![
                BlockKind::Heading,
                BlockKind::List,
                BlockKind::List,
                BlockKind::Code,
                BlockKind::Quote,
                BlockKind::Paragraph,
                BlockKind::Paragraph,
            ]
        );
        assert_eq!(blocks[1].content, "- one\n- two");
    }

    #[test]
    fn test_markdown_split_is_deterministic() {
        let source = "# Title\n\nBody text\n\n- a\n- b";
        let first = split_markdown(source);
        let second = split_markdown(source);
        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.kind, b.kind);
            assert_eq!(a.content, b.content);
            assert_ne!(a.id, b.id);
        }
    }

    #[test]
    fn test_identical_segments_get_distinct_ids() {
        let blocks = split_markdown("same\n\nsame");
        assert_eq!(blocks.len(), 2);
        assert_ne!(blocks[0].id, blocks[1].id);
    }

    #[test]
    fn test_empty_segments_are_dropped() {
        let blocks = split_blocks("A\n\n\n\nB", SourceFormat::Markdown);
        assert_eq!(contents(&blocks), vec!["A", "B"]);

        let blocks = split_blocks("\n\n  \n\n", SourceFormat::Markdown);
        assert!(blocks.is_empty());
    }

    #[test]
    fn test_fence_with_blank_lines_stays_whole() {
        let source = "Intro\n\n```\nline one\n\nline two\n```\n\nOutro";
        let blocks = split_markdown(source);
        assert_eq!(
            kinds(&blocks),
            vec![BlockKind::Paragraph, BlockKind::Code, BlockKind::Paragraph]
        );
        assert_eq!(blocks[1].content, "```\nline one\n\nline two\n```");
    }

    #[test]
    fn test_fence_keeps_indentation_and_blank_runs() {
        let source = "```python\nif x:\n    a()\n\n\n    b()\n```\n\nAfter";
        let blocks = split_markdown(source);
        assert_eq!(kinds(&blocks), vec![BlockKind::Code, BlockKind::Paragraph]);
        assert_eq!(blocks[0].content, "```python\nif x:\n    a()\n\n\n    b()\n```");
    }

    #[test]
    fn test_unterminated_fence_keeps_source() {
        let blocks = split_markdown("Intro\n\n```\n  a\n\n  b\n\n");
        assert_eq!(contents(&blocks), vec!["Intro", "```\n  a\n\n  b"]);
    }

    #[test]
    fn test_whitespace_only_line_does_not_split() {
        assert_eq!(split_markdown("A\n \nB").len(), 1);
        assert_eq!(split_plain_text("A\n \nB").len(), 1);
        assert_eq!(split_plain_text("A\n\n\nB").len(), 2);
    }

    #[test]
    fn test_crlf_input() {
        let blocks = split_markdown("# A\r\n\r\nB");
        assert_eq!(contents(&blocks), vec!["# A", "B"]);
    }

    #[test]
    fn test_plain_text() {
        let blocks = split_blocks("  # not a heading \n\n\n second\nline ", SourceFormat::PlainText);
        assert_eq!(
            kinds(&blocks),
            vec![BlockKind::Paragraph, BlockKind::Paragraph]
        );
        assert_eq!(contents(&blocks), vec!["# not a heading", "second\nline"]);
    }

    #[test]
    fn test_html_top_level_nodes() {
        let html = "<h2>Title</h2>loose text<p>Para <strong>bold</strong></p>\
                    <ul><li>A</li><li>B</li></ul><pre><code>x = 1</code></pre>\
                    <blockquote><p>Q</p></blockquote><div>Other</div>";
        let blocks = split_blocks(html, SourceFormat::Html);
        assert_eq!(
            kinds(&blocks),
            vec![
                BlockKind::Heading,
                BlockKind::Paragraph,
                BlockKind::Paragraph,
                BlockKind::List,
                BlockKind::Code,
                BlockKind::Quote,
                BlockKind::Paragraph,
            ]
        );
        assert_eq!(
            contents(&blocks),
            vec!["Title", "loose text", "Para bold", "A\nB", "x = 1", "Q", "Other"]
        );
    }

    #[test]
    fn test_html_whitespace_nodes_are_skipped() {
        let blocks = split_html("<p>One</p>\n   \n<p>  </p><p>Two</p>");
        assert_eq!(contents(&blocks), vec!["One", "Two"]);
    }

    #[test]
    fn test_block_serde_uses_type_field() {
        let block = ContentBlock::new(BlockKind::Quote, "> hi");
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["type"], "quote");
        assert_eq!(json["content"], "> hi");
        assert!(json["id"].is_string());
    }

    #[test]
    fn test_kind_from_tag() {
        assert_eq!(BlockKind::from_tag("H3"), BlockKind::Heading);
        assert_eq!(BlockKind::from_tag("ol"), BlockKind::List);
        assert_eq!(BlockKind::from_tag("code"), BlockKind::Code);
        assert_eq!(BlockKind::from_tag("section"), BlockKind::Paragraph);
    }
}
