use super::Input;
use anyhow::Result;
use clap::Parser;
use muse_core::{split_blocks, SourceFormat};

/// Split content into blocks and print them as a JSON array.
#[derive(Parser, Debug, Clone)]
pub struct Split {
    /// Source format, guessed from the file extension by default.
    #[clap(long)]
    format: Option<SourceFormat>,

    /// Print the JSON on a single line.
    #[clap(long)]
    compact: bool,

    #[clap(flatten)]
    input: Input,
}

impl Split {
    pub fn run(self) -> Result<()> {
        let content = self.input.read()?;
        let format = self.input.format(self.format, SourceFormat::Markdown);
        let blocks = split_blocks(&content, format);

        let json = if self.compact {
            serde_json::to_string(&blocks)?
        } else {
            serde_json::to_string_pretty(&blocks)?
        };
        println!("{json}");

        Ok(())
    }
}
