use super::Input;
use anyhow::Result;
use clap::Parser;
use muse_config::Config;
use muse_core::stats::calculate_content_stats;
use muse_core::SourceFormat;

/// Show content statistics.
#[derive(Parser, Debug, Clone)]
pub struct Stats {
    /// Print the statistics as JSON.
    #[clap(long)]
    json: bool,

    /// Source format, guessed from the file extension by default.
    #[clap(long)]
    format: Option<SourceFormat>,

    #[clap(flatten)]
    input: Input,
}

impl Stats {
    pub fn run(self, config: &Config) -> Result<()> {
        let markdown = self.input.read_markdown(self.format)?;
        let stats = calculate_content_stats(&markdown);

        if self.json {
            println!("{}", serde_json::to_string_pretty(&stats)?);
            return Ok(());
        }

        let typing = stats.typing_duration(&config.typing.reveal_options());

        println!("words:           {}", stats.words);
        println!("characters:      {}", stats.characters);
        println!("with spaces:     {}", stats.characters_with_spaces);
        println!("blocks:          {}", stats.blocks);
        println!("headings:        {}", stats.headings);
        println!("reading time:    {} min", stats.reading_minutes);
        println!("typing reveal:   {:.1}s", typing.as_secs_f64());

        Ok(())
    }
}
