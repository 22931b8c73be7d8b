use muse_core::export::{paginate, save_document, standalone_html, HTML_MIME};
use muse_core::reveal::Tick;
use muse_core::{
    calculate_content_stats, html_to_markdown, split_blocks, to_html, BlockKind, PageGeometry,
    RenderOptions, Reveal, RevealOptions, SourceFormat, TypingSession,
};
use std::time::Duration;

const EDITOR_HTML: &str = "<h1>Launch Plan</h1>\
    <p>We ship <strong>Friday</strong> &amp; celebrate.</p>\
    <ul><li>Write docs</li><li>Tag release</li></ul>\
    <pre><code class=\"language-bash\">cargo publish\n\ncargo doc</code></pre>\
    <blockquote>Ship it.</blockquote>";

#[test]
fn editor_html_to_revealed_text() {
    let markdown = html_to_markdown(EDITOR_HTML);
    assert!(markdown.starts_with("# Launch Plan\n\nWe ship **Friday** & celebrate."));

    let blocks = split_blocks(&markdown, SourceFormat::Markdown);
    let kinds: Vec<_> = blocks.iter().map(|block| block.kind).collect();
    assert_eq!(
        kinds,
        [
            BlockKind::Heading,
            BlockKind::Paragraph,
            BlockKind::List,
            BlockKind::Code,
            BlockKind::Quote,
        ]
    );

    let mut reveal = Reveal::with_blocks(blocks.clone(), RevealOptions::default());
    let generation = reveal.generation();
    let mut ticks = 0;
    while let Tick::Next(_) = reveal.tick(generation) {
        ticks += 1;
    }

    let frame = reveal.frame();
    assert!(frame.is_complete());
    assert_eq!(
        frame.text(),
        blocks
            .iter()
            .map(|block| block.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    );

    // One tick per character plus one per block boundary, the last tick completes.
    let stats = calculate_content_stats(&markdown);
    assert_eq!(ticks + 1, stats.typed_characters + stats.blocks - 1);
}

#[tokio::test(start_paused = true)]
async fn typing_session_matches_estimated_duration() {
    let markdown = "# Title\n\nShort body.";
    let options = RevealOptions {
        speed: Duration::from_millis(5),
        block_delay: Duration::from_millis(100),
        ..Default::default()
    };
    let expected = calculate_content_stats(markdown).typing_duration(&options);

    let session = TypingSession::start(split_blocks(markdown, SourceFormat::Markdown), options);

    tokio::time::sleep(expected - Duration::from_millis(1)).await;
    assert!(!session.frame().is_complete());

    tokio::time::sleep(Duration::from_millis(2)).await;
    assert!(session.frame().is_complete());
}

#[test]
fn html_split_matches_markdown_split() {
    let from_html = split_blocks(EDITOR_HTML, SourceFormat::Html);
    let from_markdown = split_blocks(&html_to_markdown(EDITOR_HTML), SourceFormat::Markdown);
    assert_eq!(from_html.len(), from_markdown.len());
    assert_eq!(from_html[0].kind, BlockKind::Heading);
    assert_eq!(from_html[0].content, "Launch Plan");
}

#[tokio::test]
async fn render_and_save_html_export() {
    let markdown = html_to_markdown(EDITOR_HTML);
    let page = standalone_html("Launch Plan", &to_html(&markdown, &RenderOptions::default()));

    let dir = tempfile::tempdir().unwrap();
    let saved = save_document(dir.path(), "launch-plan.html", &page, HTML_MIME)
        .await
        .unwrap();

    let written = std::fs::read_to_string(saved.path).unwrap();
    assert!(written.contains(r#"<h1 id="launch-plan">Launch Plan</h1>"#));
    assert!(written.contains(r#"<code class="language-bash">"#));
    assert!(written.contains("<blockquote>"));
}

#[test]
fn pagination_covers_every_row() {
    let geometry = PageGeometry::default();
    // A raster 1900px wide scaled to 190mm puts 2770 rows on a page.
    let per_page = (geometry.content_height_mm() * 1900.0 / geometry.content_width_mm()) as u32;
    let pages = paginate(10_000, per_page);
    assert_eq!(pages.len(), 4);
    assert_eq!(pages.iter().map(|page| page.height).sum::<u32>(), 10_000);
}
