//! HTML to Markdown conversion.
//!
//! The converter is an ordered chain of regular-expression passes over a
//! constrained HTML subset (headings, paragraphs, inline emphasis, links,
//! images, lists, blockquotes, tables, code blocks, rules and line breaks).
//! Later passes assume the earlier ones already ran, so the order in
//! [`html_to_markdown`] must not change. Anything outside the subset loses its
//! tags but keeps its text.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|err| panic!("invalid converter pattern {pattern}: {err}"))
}

static HEADINGS: Lazy<[Regex; 6]> = Lazy::new(|| {
    [1, 2, 3, 4, 5, 6].map(|level| regex(&format!(r"(?is)<h{level}\b[^>]*>(.*?)</h{level}\s*>")))
});

static PARAGRAPH: Lazy<Regex> = Lazy::new(|| regex(r"(?is)<p\b[^>]*>(.*?)</p\s*>"));

static STRONG: Lazy<Regex> = Lazy::new(|| regex(r"(?is)<strong\b[^>]*>(.*?)</strong\s*>"));
static BOLD: Lazy<Regex> = Lazy::new(|| regex(r"(?is)<b\b[^>]*>(.*?)</b\s*>"));
static EMPHASIS: Lazy<Regex> = Lazy::new(|| regex(r"(?is)<em\b[^>]*>(.*?)</em\s*>"));
static ITALIC: Lazy<Regex> = Lazy::new(|| regex(r"(?is)<i\b[^>]*>(.*?)</i\s*>"));
static UNDERLINE: Lazy<Regex> = Lazy::new(|| regex(r"(?is)<u\b[^>]*>(.*?)</u\s*>"));

static LINK: Lazy<Regex> = Lazy::new(|| {
    regex(r#"(?is)<a\s[^>]*?\bhref\s*=\s*["']([^"']*)["'][^>]*>(.*?)</a\s*>"#)
});
static IMAGE_SRC_ALT: Lazy<Regex> = Lazy::new(|| {
    regex(r#"(?is)<img\s[^>]*?\bsrc\s*=\s*["']([^"']*)["'][^>]*?\balt\s*=\s*["']([^"']*)["'][^>]*>"#)
});
static IMAGE_ALT_SRC: Lazy<Regex> = Lazy::new(|| {
    regex(r#"(?is)<img\s[^>]*?\balt\s*=\s*["']([^"']*)["'][^>]*?\bsrc\s*=\s*["']([^"']*)["'][^>]*>"#)
});
static IMAGE_SRC: Lazy<Regex> =
    Lazy::new(|| regex(r#"(?is)<img\s[^>]*?\bsrc\s*=\s*["']([^"']*)["'][^>]*>"#));

static UNORDERED_LIST: Lazy<Regex> = Lazy::new(|| regex(r"(?is)<ul\b[^>]*>(.*?)</ul\s*>"));
static ORDERED_LIST: Lazy<Regex> = Lazy::new(|| regex(r"(?is)<ol\b[^>]*>(.*?)</ol\s*>"));
static LIST_ITEM: Lazy<Regex> = Lazy::new(|| regex(r"(?is)<li\b[^>]*>(.*?)</li\s*>"));

static BLOCKQUOTE: Lazy<Regex> =
    Lazy::new(|| regex(r"(?is)<blockquote\b[^>]*>(.*?)</blockquote\s*>"));

static TABLE: Lazy<Regex> = Lazy::new(|| regex(r"(?is)<table\b[^>]*>(.*?)</table\s*>"));
static TABLE_ROW: Lazy<Regex> = Lazy::new(|| regex(r"(?is)<tr\b[^>]*>(.*?)</tr\s*>"));
static TABLE_CELL: Lazy<Regex> = Lazy::new(|| regex(r"(?is)<t[hd]\b[^>]*>(.*?)</t[hd]\s*>"));

static CHART_BLOCK: Lazy<Regex> = Lazy::new(|| {
    regex(
        r#"(?is)<pre\b[^>]*>\s*<code\b[^>]*\bclass\s*=\s*["'][^"']*\blanguage-chart\b[^"']*["'][^>]*>(.*?)</code\s*>\s*</pre\s*>"#,
    )
});
static LANGUAGE_CODE_BLOCK: Lazy<Regex> = Lazy::new(|| {
    regex(
        r#"(?is)<pre\b[^>]*>\s*<code\b[^>]*\bclass\s*=\s*["'][^"']*\blanguage-([\w+#.-]+)[^"']*["'][^>]*>(.*?)</code\s*>\s*</pre\s*>"#,
    )
});
static PLAIN_CODE_BLOCK: Lazy<Regex> = Lazy::new(|| {
    regex(r"(?is)<pre\b[^>]*>\s*<code\b[^>]*>(.*?)</code\s*>\s*</pre\s*>")
});
static PRE_BLOCK: Lazy<Regex> = Lazy::new(|| regex(r"(?is)<pre\b[^>]*>(.*?)</pre\s*>"));
static INLINE_CODE: Lazy<Regex> = Lazy::new(|| regex(r"(?is)<code\b[^>]*>(.*?)</code\s*>"));

static HORIZONTAL_RULE: Lazy<Regex> = Lazy::new(|| regex(r"(?i)<hr\b[^>]*>"));
static LINE_BREAK: Lazy<Regex> = Lazy::new(|| regex(r"(?i)<br\b[^>]*>"));

static ANY_TAG: Lazy<Regex> = Lazy::new(|| regex(r"(?s)<[^>]+>"));
static EXCESS_NEWLINES: Lazy<Regex> = Lazy::new(|| regex(r"\n{3,}"));

/// Entities decoded after tag stripping. `&amp;` comes last so an escaped
/// entity such as `&amp;lt;` decodes to `&lt;` instead of `<`.
const ENTITIES: &[(&str, &str)] = &[
    ("&nbsp;", " "),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&amp;", "&"),
];

/// Converts an HTML fragment into Markdown.
///
/// Never fails: empty input yields an empty string and unmatched or unknown
/// tags are stripped with their text kept.
///
/// # Example
///
/// ```
/// use muse_core::convert::html_to_markdown;
///
/// assert_eq!(html_to_markdown("<h2>Title</h2>"), "## Title");
/// assert_eq!(html_to_markdown("<ol><li>A</li><li>B</li></ol>"), "1. A\n2. B");
/// ```
pub fn html_to_markdown(html: &str) -> String {
    if html.is_empty() {
        return String::new();
    }

    let mut markdown = html.to_string();

    for (index, heading) in HEADINGS.iter().enumerate() {
        let hashes = "#".repeat(index + 1);
        markdown = heading
            .replace_all(&markdown, |caps: &Captures| format!("{hashes} {}\n\n", &caps[1]))
            .into_owned();
    }

    markdown = replace(&PARAGRAPH, &markdown, |caps| format!("{}\n\n", &caps[1]));

    markdown = replace(&STRONG, &markdown, |caps| format!("**{}**", &caps[1]));
    markdown = replace(&BOLD, &markdown, |caps| format!("**{}**", &caps[1]));
    markdown = replace(&EMPHASIS, &markdown, |caps| format!("*{}*", &caps[1]));
    markdown = replace(&ITALIC, &markdown, |caps| format!("*{}*", &caps[1]));
    // Markdown has no underline, single underscores stand in for it.
    markdown = replace(&UNDERLINE, &markdown, |caps| format!("_{}_", &caps[1]));

    markdown = replace(&LINK, &markdown, |caps| format!("[{}]({})", &caps[2], &caps[1]));
    markdown = replace(&IMAGE_SRC_ALT, &markdown, |caps| {
        format!("![{}]({})", &caps[2], &caps[1])
    });
    markdown = replace(&IMAGE_ALT_SRC, &markdown, |caps| {
        format!("![{}]({})", &caps[1], &caps[2])
    });
    markdown = replace(&IMAGE_SRC, &markdown, |caps| format!("![]({})", &caps[1]));

    markdown = replace(&UNORDERED_LIST, &markdown, |caps| convert_list(&caps[1], false));
    markdown = replace(&ORDERED_LIST, &markdown, |caps| convert_list(&caps[1], true));

    markdown = replace(&BLOCKQUOTE, &markdown, |caps| convert_blockquote(&caps[1]));

    markdown = replace(&TABLE, &markdown, |caps| convert_table(&caps[1]));

    markdown = replace(&CHART_BLOCK, &markdown, |caps| {
        format!("```chart\n{}\n```\n\n", &caps[1])
    });
    markdown = replace(&LANGUAGE_CODE_BLOCK, &markdown, |caps| {
        fenced(&caps[1], &caps[2])
    });
    markdown = replace(&PLAIN_CODE_BLOCK, &markdown, |caps| fenced("", &caps[1]));
    markdown = replace(&PRE_BLOCK, &markdown, |caps| fenced("", &caps[1]));
    markdown = replace(&INLINE_CODE, &markdown, |caps| format!("`{}`", &caps[1]));

    markdown = HORIZONTAL_RULE.replace_all(&markdown, "\n---\n").into_owned();
    markdown = LINE_BREAK.replace_all(&markdown, "\n").into_owned();

    markdown = ANY_TAG.replace_all(&markdown, "").into_owned();

    markdown = decode_entities(&markdown);

    EXCESS_NEWLINES
        .replace_all(&markdown, "\n\n")
        .trim()
        .to_string()
}

/// Decodes the handful of entities the converter understands.
pub fn decode_entities(text: &str) -> String {
    ENTITIES
        .iter()
        .fold(text.to_string(), |acc, (entity, literal)| {
            acc.replace(entity, literal)
        })
}

fn replace(re: &Regex, haystack: &str, rep: impl Fn(&Captures) -> String) -> String {
    re.replace_all(haystack, |caps: &Captures| rep(caps)).into_owned()
}

/// Converts the inner HTML of a `ul`/`ol` block. The ordered counter starts
/// at one for every list block.
fn convert_list(inner: &str, ordered: bool) -> String {
    let mut output = String::new();
    for (index, item) in LIST_ITEM.captures_iter(inner).enumerate() {
        let text = item[1].trim();
        if ordered {
            output.push_str(&format!("{}. {text}\n", index + 1));
        } else {
            output.push_str(&format!("- {text}\n"));
        }
    }
    output.push('\n');
    output
}

fn convert_blockquote(inner: &str) -> String {
    let quoted = inner
        .trim()
        .lines()
        .map(|line| format!("> {line}").trim_end().to_string())
        .collect::<Vec<_>>()
        .join("\n");
    format!("{quoted}\n\n")
}

/// Converts the inner HTML of a `table`. Header and data cells are treated
/// alike; the separator row follows the first row only.
fn convert_table(inner: &str) -> String {
    let mut lines = Vec::new();

    for (row_index, row) in TABLE_ROW.captures_iter(inner).enumerate() {
        let cells = TABLE_CELL
            .captures_iter(&row[1])
            .map(|cell| {
                let text = cell[1].trim();
                if text.is_empty() {
                    " ".to_string()
                } else {
                    text.to_string()
                }
            })
            .collect::<Vec<_>>();

        lines.push(format!("| {} |", cells.join(" | ")));

        if row_index == 0 {
            let separator = vec!["---"; cells.len()];
            lines.push(format!("| {} |", separator.join(" | ")));
        }
    }

    if lines.is_empty() {
        return String::new();
    }

    format!("\n{}\n\n", lines.join("\n"))
}

fn fenced(language: &str, code: &str) -> String {
    format!("```{language}\n{}\n```\n\n", code.trim_matches('\n'))
}
