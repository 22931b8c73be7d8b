use super::Input;
use anyhow::Result;
use clap::Parser;
use muse_core::export::standalone_html;
use muse_core::render::{to_html, RenderOptions};
use muse_core::SourceFormat;

/// Render Markdown into HTML.
#[derive(Parser, Debug, Clone)]
pub struct Render {
    /// Wrap the output into a complete HTML page.
    #[clap(long)]
    standalone: bool,

    /// Page title for `--standalone`, the file name by default.
    #[clap(long)]
    title: Option<String>,

    /// Plain CommonMark, no tables, heading ids or chart placeholders.
    #[clap(long)]
    commonmark: bool,

    /// Source format, guessed from the file extension by default.
    #[clap(long)]
    format: Option<SourceFormat>,

    #[clap(flatten)]
    input: Input,
}

impl Render {
    pub fn run(self) -> Result<()> {
        let markdown = self.input.read_markdown(self.format)?;

        let options = if self.commonmark {
            RenderOptions::commonmark()
        } else {
            RenderOptions::default()
        };
        let html = to_html(&markdown, &options);

        if self.standalone {
            let title = self
                .title
                .or_else(|| self.input.file_stem())
                .unwrap_or_else(|| "MagicMuse".to_string());
            print!("{}", standalone_html(&title, &html));
        } else {
            print!("{html}");
        }

        Ok(())
    }
}
