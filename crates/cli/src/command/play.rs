use super::Input;
use anyhow::Result;
use clap::Parser;
use muse_config::Config;
use muse_core::{split_blocks, SourceFormat, TypingSession};
use std::io::Write;
use std::time::Duration;

/// Reveal content in the terminal, one character at a time.
#[derive(Parser, Debug, Clone)]
pub struct Play {
    /// Delay before each character in milliseconds, overrides `typing.speed-ms`.
    #[clap(long)]
    speed_ms: Option<u64>,

    /// Pause between blocks in milliseconds, overrides `typing.block-delay-ms`.
    #[clap(long)]
    block_delay_ms: Option<u64>,

    /// Source format, guessed from the file extension by default.
    #[clap(long)]
    format: Option<SourceFormat>,

    #[clap(flatten)]
    input: Input,
}

impl Play {
    pub async fn run(self, config: &Config) -> Result<()> {
        let content = self.input.read()?;
        let format = self.input.format(self.format, SourceFormat::Markdown);
        let blocks = split_blocks(&content, format);

        let mut options = config.typing.reveal_options();
        if let Some(speed_ms) = self.speed_ms {
            options.speed = Duration::from_millis(speed_ms);
        }
        if let Some(block_delay_ms) = self.block_delay_ms {
            options.block_delay = Duration::from_millis(block_delay_ms);
        }

        let session = TypingSession::start(blocks, options);
        let mut frames = session.subscribe();

        let stdout = std::io::stdout();
        let mut printed = 0;

        loop {
            let (text, complete) = {
                let frame = frames.borrow_and_update();
                (frame.text(), frame.is_complete())
            };

            // Revealed text only grows, print what is new since the last frame.
            let fresh = text.chars().skip(printed).collect::<String>();
            if !fresh.is_empty() {
                printed += fresh.chars().count();
                let mut lock = stdout.lock();
                write!(lock, "{fresh}")?;
                lock.flush()?;
            }

            if complete || session.inspect(|reveal| reveal.blocks().is_empty()) {
                break;
            }

            if frames.changed().await.is_err() {
                break;
            }
        }

        writeln!(stdout.lock())?;

        Ok(())
    }
}
