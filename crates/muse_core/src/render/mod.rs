//! Markdown to HTML rendering for previews and export.
//!
//! This module renders the Markdown produced by [`crate::convert`] and by
//! content generation back into HTML:
//! - GitHub Flavored Markdown (tables, strikethrough, task lists)
//! - Heading IDs for anchor links, shared with [`crate::outline`]
//! - ```` ```chart ```` fences turned into chart placeholders for the
//!   visualization layer

mod chart;

use crate::outline;
use pulldown_cmark::{CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};

pub use chart::{chart_html, escape_attribute, CHART_LANGUAGE};

/// Options for rendering Markdown to HTML.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Enable GitHub Flavored Markdown tables
    pub enable_tables: bool,
    /// Enable strikethrough syntax (~~text~~)
    pub enable_strikethrough: bool,
    /// Enable task list items ([x] and [ ])
    pub enable_tasklists: bool,
    /// Give every heading an `id` derived from its text
    pub heading_ids: bool,
    /// Render ```` ```chart ```` fences as chart placeholders
    pub charts: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            enable_tables: true,
            enable_strikethrough: true,
            enable_tasklists: true,
            heading_ids: true,
            charts: true,
        }
    }
}

impl RenderOptions {
    /// Plain CommonMark without any extension or post-processing.
    pub fn commonmark() -> Self {
        Self {
            enable_tables: false,
            enable_strikethrough: false,
            enable_tasklists: false,
            heading_ids: false,
            charts: false,
        }
    }

    fn to_pulldown_options(&self) -> Options {
        let mut options = Options::empty();
        if self.enable_tables {
            options.insert(Options::ENABLE_TABLES);
        }
        if self.enable_strikethrough {
            options.insert(Options::ENABLE_STRIKETHROUGH);
        }
        if self.enable_tasklists {
            options.insert(Options::ENABLE_TASKLISTS);
        }
        options
    }
}

/// Render Markdown content to HTML.
///
/// # Example
///
/// ```
/// use muse_core::render::{to_html, RenderOptions};
///
/// let html = to_html("# Hello\n\nWorld", &RenderOptions::default());
/// assert!(html.contains(r#"<h1 id="hello">"#));
/// assert!(html.contains("<p>World</p>"));
/// ```
pub fn to_html(markdown_content: &str, options: &RenderOptions) -> String {
    let parser = Parser::new_ext(markdown_content, options.to_pulldown_options());
    let events: Vec<Event> = parser.collect();
    let mut processed_events = Vec::with_capacity(events.len());

    let mut i = 0;
    while i < events.len() {
        match &events[i] {
            Event::Start(Tag::Heading {
                level,
                id,
                classes,
                attrs,
            }) if options.heading_ids && id.is_none() => {
                // Collect heading text
                let mut heading_text = String::new();
                for event in &events[i + 1..] {
                    match event {
                        Event::Text(text) | Event::Code(text) => heading_text.push_str(text),
                        Event::End(TagEnd::Heading(_)) => break,
                        _ => {}
                    }
                }

                let slug = outline::slugify(&heading_text);

                processed_events.push(Event::Start(Tag::Heading {
                    level: *level,
                    id: (!slug.is_empty()).then(|| CowStr::from(slug)),
                    classes: classes.clone(),
                    attrs: attrs.clone(),
                }));
                i += 1;
            }
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(language)))
                if options.charts && &**language == CHART_LANGUAGE =>
            {
                let mut payload = String::new();
                let mut end_idx = i + 1;
                while end_idx < events.len() {
                    match &events[end_idx] {
                        Event::Text(text) => payload.push_str(text),
                        Event::End(TagEnd::CodeBlock) => break,
                        _ => {}
                    }
                    end_idx += 1;
                }

                processed_events.push(Event::Html(CowStr::from(chart_html(&payload))));

                // Skip past the code block end.
                i = end_idx + 1;
            }
            event => {
                processed_events.push(event.clone());
                i += 1;
            }
        }
    }

    let mut html_output = String::new();
    pulldown_cmark::html::push_html(&mut html_output, processed_events.into_iter());

    tracing::trace!(
        markdown_len = markdown_content.len(),
        html_len = html_output.len(),
        "Rendered markdown"
    );

    html_output
}
