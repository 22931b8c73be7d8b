use crate::render::escape_attribute;

const STYLE: &str = "body{max-width:48rem;margin:2rem auto;padding:0 1rem;\
font-family:-apple-system,BlinkMacSystemFont,\"Segoe UI\",Helvetica,Arial,sans-serif;\
line-height:1.6;color:#1f2328}\
pre{background:#f6f8fa;padding:1rem;overflow:auto}\
table{border-collapse:collapse}th,td{border:1px solid #d0d7de;padding:.3rem .6rem}\
blockquote{margin:0;padding:0 1rem;color:#59636e;border-left:.25rem solid #d0d7de}";

/// Wraps rendered HTML into a self-contained page for HTML export.
///
/// ```
/// use muse_core::export::standalone_html;
///
/// let page = standalone_html("Q3 <Plan>", "<p>Hi</p>");
/// assert!(page.contains("<title>Q3 &lt;Plan&gt;</title>"));
/// assert!(page.contains("<p>Hi</p>"));
/// ```
pub fn standalone_html(title: &str, body_html: &str) -> String {
    format!(
        "<!DOCTYPE html>\n\
         <html lang=\"en\">\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title}</title>\n\
         <style>{STYLE}</style>\n\
         </head>\n\
         <body>\n\
         <article class=\"muse-document\">\n\
         {body}\n\
         </article>\n\
         </body>\n\
         </html>\n",
        title = escape_attribute(title),
        body = body_html.trim_end(),
    )
}
