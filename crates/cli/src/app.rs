use crate::{command, logging};
use anyhow::Result;
use clap::Parser;

#[derive(Parser, Debug)]
pub enum RunCmd {
    /// Convert editor HTML into Markdown.
    #[clap(name = "convert")]
    Convert(command::convert::Convert),
    /// Split content into typed blocks, printed as JSON.
    #[clap(name = "split")]
    Split(command::split::Split),
    /// Reveal content in the terminal with the typing effect.
    #[clap(name = "play")]
    Play(command::play::Play),
    /// Render Markdown into HTML.
    #[clap(name = "render")]
    Render(command::render::Render),
    /// Print the heading outline of Markdown content.
    #[clap(name = "outline")]
    Outline(command::outline::Outline),
    /// Show word count, blocks and reading time.
    #[clap(name = "stats")]
    Stats(command::stats::Stats),
    /// Export content as a Markdown, HTML or PDF file.
    #[clap(name = "export")]
    Export(command::export::Export),
}

/// MagicMuse CLI arguments.
#[derive(Parser, Debug)]
pub struct Args {
    /// Enable the logging system.
    #[clap(long)]
    pub log: Option<std::path::PathBuf>,

    /// Specify the path of the config file.
    #[clap(long)]
    pub config_file: Option<std::path::PathBuf>,
}

impl RunCmd {
    pub async fn run(self, args: Args) -> Result<()> {
        let (config, config_err) = muse_config::load_config_on_startup(args.config_file.clone());

        let _guard = logging::init(args.log.as_deref(), config)?;

        if let Some(err) = config_err {
            tracing::warn!(?err, "Invalid config file, falling back to the defaults");
            eprintln!("warning: ignoring invalid config file: {err}");
        }

        match self {
            Self::Convert(convert) => convert.run(),
            Self::Split(split) => split.run(),
            Self::Play(play) => play.run(config).await,
            Self::Render(render) => render.run(),
            Self::Outline(outline) => outline.run(),
            Self::Stats(stats) => stats.run(config),
            Self::Export(export) => export.run(config).await,
        }
    }
}
