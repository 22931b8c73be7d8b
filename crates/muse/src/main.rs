use clap::Parser;
use cli::{Args, RunCmd};

const BUILD_TIME: &str = include!(concat!(env!("OUT_DIR"), "/compiled_at.txt"));
const TARGET: &str = include!(concat!(env!("OUT_DIR"), "/target.txt"));

#[derive(Parser, Debug)]
pub enum Cmd {
    /// Display the current version.
    #[clap(name = "version")]
    Version,

    /// Run a MagicMuse command.
    #[clap(flatten)]
    Run(Box<RunCmd>),
}

#[derive(Parser, Debug)]
#[clap(name = "muse", disable_version_flag = true)]
pub struct Muse {
    #[clap(flatten)]
    pub args: Args,

    #[clap(subcommand)]
    pub cmd: Cmd,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let muse = Muse::parse();

    match muse.cmd {
        Cmd::Version => {
            println!(
                "version {}, compiled at: {BUILD_TIME}, built for {TARGET}.",
                env!("CARGO_PKG_VERSION"),
            );
        }
        Cmd::Run(run_cmd) => {
            if let Err(e) = run_cmd.run(muse.args).await {
                eprintln!("error: {e:?}");
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
