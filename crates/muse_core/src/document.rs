//! Source format detection and classification.
//!
//! This module provides the [`SourceFormat`] enum naming the three kinds of
//! content the block splitter understands. It is the single source of truth
//! for the file extensions mapped to each format.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

/// Format of a piece of content handed to the block splitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// Rich-text editor output (.html, .htm)
    Html,
    /// Generation output (.md, .markdown, etc.)
    Markdown,
    /// Unformatted text (.txt)
    PlainText,
}

/// Cached list of all supported extensions (avoids repeated allocations).
static ALL_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    SourceFormat::ALL
        .iter()
        .flat_map(|format| format.extensions().iter().copied())
        .collect()
});

impl SourceFormat {
    /// All supported source formats.
    pub const ALL: &'static [SourceFormat] = &[Self::Html, Self::Markdown, Self::PlainText];

    /// Detect the format from a file extension (case-insensitive).
    ///
    /// Returns `None` for unknown extensions or empty input.
    ///
    /// # Examples
    ///
    /// ```
    /// use muse_core::SourceFormat;
    ///
    /// assert_eq!(SourceFormat::from_extension("md"), Some(SourceFormat::Markdown));
    /// assert_eq!(SourceFormat::from_extension("HTML"), Some(SourceFormat::Html));
    /// assert_eq!(SourceFormat::from_extension("txt"), Some(SourceFormat::PlainText));
    /// assert_eq!(SourceFormat::from_extension("pdf"), None);
    /// assert_eq!(SourceFormat::from_extension(""), None);
    /// ```
    pub fn from_extension(ext: &str) -> Option<Self> {
        if ext.is_empty() {
            return None;
        }
        let ext_lower = ext.to_ascii_lowercase();
        Self::ALL
            .iter()
            .find(|format| format.extensions().iter().any(|e| *e == ext_lower))
            .copied()
    }

    /// Detect the format from a file path.
    ///
    /// Returns `None` if the path has no extension or the extension is unknown.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Lowercase file extensions for this format.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Html => &["html", "htm"],
            Self::Markdown => &["md", "markdown", "mdown", "mkdn", "mkd"],
            Self::PlainText => &["txt", "text"],
        }
    }

    /// All supported extensions across all formats.
    pub fn all_extensions() -> &'static [&'static str] {
        ALL_EXTENSIONS.as_slice()
    }

    /// Name of this format as used on the command line and in JSON.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Markdown => "markdown",
            Self::PlainText => "plaintext",
        }
    }
}

impl std::str::FromStr for SourceFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "html" => Ok(Self::Html),
            "markdown" | "md" => Ok(Self::Markdown),
            "plaintext" | "plain" | "text" | "txt" => Ok(Self::PlainText),
            other => Err(format!("unknown source format: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension() {
        assert_eq!(SourceFormat::from_extension("htm"), Some(SourceFormat::Html));
        assert_eq!(
            SourceFormat::from_extension("markdown"),
            Some(SourceFormat::Markdown)
        );
        assert_eq!(
            SourceFormat::from_extension("Md"),
            Some(SourceFormat::Markdown)
        );
        assert_eq!(SourceFormat::from_extension("docx"), None);
    }

    #[test]
    fn test_from_path() {
        assert_eq!(
            SourceFormat::from_path(Path::new("/drafts/post.html")),
            Some(SourceFormat::Html)
        );
        assert_eq!(
            SourceFormat::from_path(Path::new("notes.txt")),
            Some(SourceFormat::PlainText)
        );
        assert_eq!(SourceFormat::from_path(Path::new("README")), None);
    }

    #[test]
    fn test_all_extensions() {
        let all = SourceFormat::all_extensions();
        assert!(all.contains(&"html"));
        assert!(all.contains(&"md"));
        assert!(all.contains(&"txt"));
        assert!(!all.contains(&"pdf"));
    }

    #[test]
    fn test_from_str() {
        assert_eq!("HTML".parse::<SourceFormat>(), Ok(SourceFormat::Html));
        assert_eq!("md".parse::<SourceFormat>(), Ok(SourceFormat::Markdown));
        assert_eq!("plain".parse::<SourceFormat>(), Ok(SourceFormat::PlainText));
        assert!("docx".parse::<SourceFormat>().is_err());
    }

    #[test]
    fn test_serde_name() {
        let json = serde_json::to_string(&SourceFormat::PlainText).unwrap();
        assert_eq!(json, r#""plaintext""#);
        assert_eq!(SourceFormat::Html.name(), "html");
    }
}
