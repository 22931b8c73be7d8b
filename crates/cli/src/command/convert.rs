use super::Input;
use anyhow::Result;
use clap::Parser;
use std::io::Write;

/// Convert an HTML fragment into Markdown.
#[derive(Parser, Debug, Clone)]
pub struct Convert {
    #[clap(flatten)]
    input: Input,
}

impl Convert {
    pub fn run(self) -> Result<()> {
        let html = self.input.read()?;
        let markdown = muse_core::html_to_markdown(&html);

        let stdout = std::io::stdout();
        let mut lock = stdout.lock();
        writeln!(lock, "{markdown}")?;

        Ok(())
    }
}
