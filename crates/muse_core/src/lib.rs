//! Core library for MagicMuse content.
//!
//! Generated content arrives as HTML from the editor or as Markdown from the
//! generator. This crate converts between the two, splits content into blocks,
//! reveals the blocks with a typing effect and exports the result.
//!
//! # Modules
//!
//! - [`convert`] - HTML to Markdown conversion
//! - [`blocks`] - Splitting HTML, Markdown or plain text into content blocks
//! - [`reveal`] - Typing reveal state machine
//! - [`typing`] - Timer-driven typing session on top of [`reveal`]
//! - [`render`] - Markdown to HTML with heading ids and chart placeholders
//! - [`outline`] - Heading outline and anchors
//! - [`stats`] - Content statistics
//! - [`export`] - Pagination, PDF and file export

pub mod blocks;
pub mod convert;
pub mod document;
pub mod export;
pub mod outline;
pub mod render;
pub mod reveal;
pub mod stats;
pub mod typing;

// Re-export commonly used types at crate root
pub use blocks::{split_blocks, BlockKind, ContentBlock};
pub use convert::html_to_markdown;
pub use document::SourceFormat;
pub use export::{ExportError, PageGeometry, Rasterizer, RasterImage};
pub use render::{to_html, RenderOptions};
pub use reveal::{Frame, Reveal, RevealOptions};
pub use stats::{calculate_content_stats, ContentStats};
pub use typing::TypingSession;
