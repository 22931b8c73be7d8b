//! Document outline for generated Markdown.
//!
//! Provides:
//! - Heading parsing that skips fenced code
//! - A nested Markdown list linking every heading by its anchor
//! - URL-safe anchors shared with [`crate::render`] heading ids

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::str::FromStr;

/// Converts heading text to a URL-safe slug following GitHub's convention.
///
/// 1. Convert to lowercase
/// 2. Replace spaces with hyphens
/// 3. Remove all characters except alphanumeric, hyphens, and underscores
/// 4. Collapse multiple consecutive hyphens into one
///
/// # Example
///
/// ```
/// use muse_core::outline::slugify;
///
/// assert_eq!(slugify("Quarterly Review"), "quarterly-review");
/// assert_eq!(slugify("Launch Plan (v2)"), "launch-plan-v2");
/// ```
pub fn slugify(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter_map(|c| {
            if c.is_alphanumeric() || c == '_' {
                Some(c)
            } else if c == ' ' || c == '-' {
                Some('-')
            } else {
                None
            }
        })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Configuration for outline generation.
#[derive(Debug, Clone)]
pub struct OutlineConfig {
    /// Bullet character for list items (default: "-")
    pub bullet: String,
    /// Number of spaces per indent level (default: 2)
    pub indent: usize,
    /// Deepest heading level to include, 1-based (default: 3)
    pub max_level: usize,
    /// If true, list plain titles without anchors
    pub no_link: bool,
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            bullet: String::from("-"),
            indent: 2,
            max_level: 3,
            no_link: false,
        }
    }
}

/// A parsed ATX heading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Heading {
    /// Heading level, 1 for `#` through 6 for `######`.
    pub level: usize,
    pub title: String,
    pub anchor: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not an ATX heading")]
pub struct NotAHeading;

impl FromStr for Heading {
    type Err = NotAHeading;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim_end();
        let level = trimmed.chars().take_while(|c| *c == '#').count();
        if level == 0 || level > 6 {
            return Err(NotAHeading);
        }

        let rest = &trimmed[level..];
        if !rest.is_empty() && !rest.starts_with(' ') {
            return Err(NotAHeading);
        }

        let title = rest.trim().to_string();
        let anchor = slugify(&strip_inline_code(&title));

        Ok(Self {
            level,
            title,
            anchor,
        })
    }
}

impl Heading {
    /// Format the heading as an outline entry, `None` when it is too deep.
    pub fn format(&self, config: &OutlineConfig) -> Option<String> {
        if self.level > config.max_level {
            return None;
        }

        let indent = " ".repeat(config.indent * (self.level - 1));
        let bullet = &config.bullet;
        let title = &self.title;

        if config.no_link {
            Some(format!("{indent}{bullet} {title}"))
        } else {
            Some(format!("{indent}{bullet} [{title}](#{})", self.anchor))
        }
    }
}

/// Fence opening a code block, closed only by the same kind.
#[derive(Clone, Copy)]
enum Fence {
    Backticks,
    Tildes,
}

impl Fence {
    fn open(line: &str) -> Option<Self> {
        let line = line.trim_start();
        if line.starts_with("```") {
            Some(Self::Backticks)
        } else if line.starts_with("~~~") {
            Some(Self::Tildes)
        } else {
            None
        }
    }
}

/// Every heading of `markdown` outside fenced code, in document order.
pub fn headings(markdown: &str) -> Vec<Heading> {
    let mut fence: Option<Fence> = None;

    markdown
        .lines()
        .filter(|line| match fence {
            None => {
                fence = Fence::open(line);
                fence.is_none()
            }
            Some(open) => {
                if matches!(
                    (open, Fence::open(line)),
                    (Fence::Backticks, Some(Fence::Backticks)) | (Fence::Tildes, Some(Fence::Tildes))
                ) {
                    fence.take();
                }
                false
            }
        })
        .filter_map(|line| line.parse::<Heading>().ok())
        .collect()
}

/// Markdown list outlining `markdown`, one line per heading.
pub fn generate_outline(markdown: &str, config: &OutlineConfig) -> Vec<String> {
    headings(markdown)
        .iter()
        .filter_map(|heading| heading.format(config))
        .collect()
}

/// Strip backticks from text while preserving the inner content.
fn strip_inline_code(input: &str) -> String {
    static RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`]*)`").expect("Regex is valid"));
    RE.replace_all(input, "$1").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("Test-123"), "test-123");
        assert_eq!(slugify("foo_bar"), "foo_bar");
        assert_eq!(slugify("Multiple   Spaces"), "multiple-spaces");
        assert_eq!(slugify("Launch v2 Plan"), "launch-v2-plan");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_heading_parsing() {
        let heading: Heading = "### Ship `v2` today  ".parse().unwrap();
        assert_eq!(heading.level, 3);
        assert_eq!(heading.title, "Ship `v2` today");
        assert_eq!(heading.anchor, "ship-v2-today");

        assert!("#hashtag".parse::<Heading>().is_err());
        assert!("####### too deep".parse::<Heading>().is_err());
        assert!("plain text".parse::<Heading>().is_err());
    }

    #[test]
    fn test_generate_outline_skips_code() {
        let markdown = "# Report\n\n## Summary\n\n```bash\n# not a heading\n```\n\n### Details\n\n#### Deep\n\n~~~\n## nope\n```\n~~~\n## Next Steps";
        let outline = generate_outline(markdown, &OutlineConfig::default());
        assert_eq!(
            outline,
            vec![
                "- [Report](#report)",
                "  - [Summary](#summary)",
                "    - [Details](#details)",
                "  - [Next Steps](#next-steps)",
            ]
        );
    }

    #[test]
    fn test_outline_without_links() {
        let config = OutlineConfig {
            bullet: "*".into(),
            indent: 4,
            max_level: 6,
            no_link: true,
        };
        let outline = generate_outline("## A\n\n#### B", &config);
        assert_eq!(outline, vec!["    * A", "            * B"]);
    }
}
