use super::Input;
use anyhow::Result;
use clap::Parser;
use muse_core::outline::{generate_outline, OutlineConfig};
use muse_core::SourceFormat;
use std::io::Write;

/// Print a linked outline of the headings.
#[derive(Parser, Debug, Clone)]
pub struct Outline {
    /// Deepest heading level to include.
    #[clap(long, default_value_t = 3)]
    max_level: usize,

    /// Number of spaces per nesting level.
    #[clap(long, default_value_t = 2)]
    indent: usize,

    /// List titles without anchor links.
    #[clap(long)]
    no_link: bool,

    /// Source format, guessed from the file extension by default.
    #[clap(long)]
    format: Option<SourceFormat>,

    #[clap(flatten)]
    input: Input,
}

impl Outline {
    pub fn run(self) -> Result<()> {
        let markdown = self.input.read_markdown(self.format)?;

        let config = OutlineConfig {
            max_level: self.max_level,
            indent: self.indent,
            no_link: self.no_link,
            ..Default::default()
        };

        let stdout = std::io::stdout();
        let mut lock = stdout.lock();
        for line in generate_outline(&markdown, &config) {
            writeln!(lock, "{line}")?;
        }

        Ok(())
    }
}
