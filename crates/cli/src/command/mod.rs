pub mod convert;
pub mod export;
pub mod outline;
pub mod play;
pub mod render;
pub mod split;
pub mod stats;

use anyhow::{Context, Result};
use clap::Parser;
use muse_core::SourceFormat;
use std::io::Read;
use std::path::PathBuf;

/// Content read from a file or stdin.
#[derive(Parser, Debug, Clone, Default)]
pub struct Input {
    /// File to read, stdin when omitted or `-`.
    #[clap(index = 1)]
    pub input: Option<PathBuf>,
}

impl Input {
    fn path(&self) -> Option<&PathBuf> {
        self.input.as_ref().filter(|path| path.as_os_str() != "-")
    }

    pub fn read(&self) -> Result<String> {
        match self.path() {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display())),
            None => {
                let mut content = String::new();
                std::io::stdin()
                    .read_to_string(&mut content)
                    .context("failed to read stdin")?;
                Ok(content)
            }
        }
    }

    /// Format given explicitly, else guessed from the file extension, else `fallback`.
    pub fn format(&self, explicit: Option<SourceFormat>, fallback: SourceFormat) -> SourceFormat {
        explicit
            .or_else(|| self.path().and_then(|path| SourceFormat::from_path(path)))
            .unwrap_or(fallback)
    }

    /// File name without extension, used to name exports.
    pub fn file_stem(&self) -> Option<String> {
        self.path()
            .and_then(|path| path.file_stem())
            .map(|stem| stem.to_string_lossy().into_owned())
    }

    /// Reads the content as Markdown, converting HTML input first.
    pub fn read_markdown(&self, explicit: Option<SourceFormat>) -> Result<String> {
        let content = self.read()?;
        Ok(match self.format(explicit, SourceFormat::Markdown) {
            SourceFormat::Html => muse_core::html_to_markdown(&content),
            SourceFormat::Markdown | SourceFormat::PlainText => content,
        })
    }
}
