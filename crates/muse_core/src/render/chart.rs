//! Chart placeholders for the visualization layer.
//!
//! Generated content embeds chart definitions in ```` ```chart ```` fences. The
//! renderer does not draw charts; it emits a `div` carrying the raw payload in
//! a `data-chart` attribute for the frontend to pick up.

/// Info string marking a chart fence.
pub const CHART_LANGUAGE: &str = "chart";

/// HTML placeholder for a chart definition.
///
/// # Example
///
/// ```
/// use muse_core::render::chart_html;
///
/// assert_eq!(
///     chart_html("{\"type\":\"pie\"}\n"),
///     r#"<div class="muse-chart" data-chart="{&quot;type&quot;:&quot;pie&quot;}"></div>"#
/// );
/// ```
pub fn chart_html(payload: &str) -> String {
    format!(
        r#"<div class="muse-chart" data-chart="{}"></div>"#,
        escape_attribute(payload.trim())
    )
}

/// Escapes text for use inside a double-quoted attribute value.
pub fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_attribute() {
        assert_eq!(escape_attribute(r#"a<b>"c"&'d'"#), "a&lt;b&gt;&quot;c&quot;&amp;&#39;d&#39;");
    }

    #[test]
    fn test_empty_payload() {
        assert_eq!(chart_html("\n"), r#"<div class="muse-chart" data-chart=""></div>"#);
    }
}
