//! Content statistics for generated Markdown.
//!
//! Provides word and character counts, the number of reveal blocks, reading
//! time, and how long the typing reveal takes to play through.

use crate::blocks::{split_blocks, BlockKind, ContentBlock};
use crate::document::SourceFormat;
use crate::reveal::RevealOptions;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Average adult reading speed used for the estimate.
const WORDS_PER_MINUTE: usize = 200;

/// Statistics shown next to a generated document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentStats {
    /// Total word count
    pub words: usize,
    /// Total character count (excluding whitespace)
    pub characters: usize,
    /// Total character count (including whitespace)
    pub characters_with_spaces: usize,
    /// Number of blocks the reveal plays through
    pub blocks: usize,
    /// Number of heading blocks
    pub headings: usize,
    /// Characters typed by the reveal, summed over all blocks
    pub typed_characters: usize,
    /// Estimated reading time in minutes
    pub reading_minutes: usize,
}

impl ContentStats {
    /// Time the typing reveal needs to show everything with `options`.
    ///
    /// Every character costs one tick and every block after the first waits
    /// for the inter-block pause.
    pub fn typing_duration(&self, options: &RevealOptions) -> Duration {
        let ticks = u32::try_from(self.typed_characters).unwrap_or(u32::MAX);
        let pauses = u32::try_from(self.blocks.saturating_sub(1)).unwrap_or(u32::MAX);
        let typing = options.speed.checked_mul(ticks).unwrap_or(Duration::MAX);
        let waiting = options.block_delay.checked_mul(pauses).unwrap_or(Duration::MAX);
        typing.saturating_add(waiting)
    }
}

/// Calculate statistics for Markdown content.
///
/// # Example
///
/// ```
/// use muse_core::stats::calculate_content_stats;
///
/// let stats = calculate_content_stats("# Plan\n\nShip it this week.");
/// assert_eq!(stats.words, 5);
/// assert_eq!(stats.blocks, 2);
/// ```
pub fn calculate_content_stats(markdown: &str) -> ContentStats {
    let blocks = split_blocks(markdown, SourceFormat::Markdown);
    calculate_block_stats(markdown, &blocks)
}

/// Same as [`calculate_content_stats`] for content already split into `blocks`.
pub fn calculate_block_stats(content: &str, blocks: &[ContentBlock]) -> ContentStats {
    let words: usize = content
        .lines()
        .map(|line| {
            line.split_whitespace()
                .filter(|word| {
                    // Pure markdown syntax tokens are not words.
                    let trimmed = word.trim_matches(|c: char| {
                        matches!(c, '#' | '*' | '_' | '`' | '[' | ']' | '(' | ')' | '-' | '>' | '|')
                    });
                    !trimmed.is_empty()
                })
                .count()
        })
        .sum();

    let characters_with_spaces = content.chars().count();
    let characters = content.chars().filter(|c| !c.is_whitespace()).count();

    ContentStats {
        words,
        characters,
        characters_with_spaces,
        blocks: blocks.len(),
        headings: blocks
            .iter()
            .filter(|block| block.kind == BlockKind::Heading)
            .count(),
        typed_characters: blocks.iter().map(ContentBlock::char_len).sum(),
        reading_minutes: words.div_ceil(WORDS_PER_MINUTE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_stats() {
        let stats = calculate_content_stats("# Title\n\nHello world!\n\n- one\n- two");

        assert_eq!(stats.words, 5);
        assert_eq!(stats.blocks, 3);
        assert_eq!(stats.headings, 1);
        assert!(stats.characters_with_spaces > stats.characters);
    }

    #[test]
    fn test_typing_duration_saturates() {
        let stats = calculate_content_stats("# Title\n\nBody");
        let options = RevealOptions {
            speed: Duration::from_secs(u64::MAX / 2),
            block_delay: Duration::from_secs(u64::MAX / 2),
            ..Default::default()
        };
        assert_eq!(stats.typing_duration(&options), Duration::MAX);

        let options = RevealOptions {
            speed: Duration::from_millis(10),
            block_delay: Duration::from_millis(100),
            ..Default::default()
        };
        assert_eq!(
            stats.typing_duration(&options),
            Duration::from_millis(10 * stats.typed_characters as u64 + 100)
        );
    }

    #[test]
    fn test_empty_content() {
        let stats = calculate_content_stats("");
        assert_eq!(stats.words, 0);
        assert_eq!(stats.characters, 0);
        assert_eq!(stats.blocks, 0);
        assert_eq!(stats.reading_minutes, 0);
    }

    #[test]
    fn test_reading_time_rounds_up() {
        let content = vec!["word"; 450].join(" ");
        assert_eq!(calculate_content_stats(&content).reading_minutes, 3);

        let content = vec!["word"; 200].join(" ");
        assert_eq!(calculate_content_stats(&content).reading_minutes, 1);
    }

    #[test]
    fn test_typing_duration() {
        let stats = calculate_content_stats("abc\n\nde");
        assert_eq!(stats.typed_characters, 5);

        let options = RevealOptions {
            speed: Duration::from_millis(10),
            block_delay: Duration::from_millis(100),
            ..Default::default()
        };
        assert_eq!(stats.typing_duration(&options), Duration::from_millis(150));
    }
}
