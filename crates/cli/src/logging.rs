use anyhow::{anyhow, Result};
use muse_config::Config;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Log files larger than this are truncated on startup.
const MAX_LOG_FILE_SIZE: u64 = 8 * 1024 * 1024;

/// Installs the global subscriber.
///
/// With a log file (`--log`, `MUSE_LOG_PATH` or `log.log-file`) events go to
/// that file through a non-blocking writer, whose guard must outlive the
/// command. Otherwise warnings go to stderr, tuned with `RUST_LOG`.
pub(crate) fn init(log: Option<&Path>, config: &Config) -> Result<Option<WorkerGuard>> {
    let maybe_log = if let Some(log_path) = log {
        Some(log_path.to_path_buf())
    } else if let Ok(log_path) = std::env::var("MUSE_LOG_PATH").map(PathBuf::from) {
        Some(log_path)
    } else {
        config.log.log_file.as_ref().map(PathBuf::from)
    };

    let Some(log_path) = maybe_log else {
        let env_filter = EnvFilter::builder()
            .with_default_directive(LevelFilter::WARN.into())
            .from_env_lossy();

        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_ansi(std::io::stderr().is_terminal())
            .try_init()
            .map_err(|err| anyhow!("failed to install the stderr logger: {err}"))?;

        return Ok(None);
    };

    if let Ok(metadata) = std::fs::metadata(&log_path) {
        if log_path.is_file() && metadata.len() > MAX_LOG_FILE_SIZE {
            std::fs::remove_file(&log_path)?;
        }
    }

    let file_name = log_path
        .file_name()
        .ok_or_else(|| anyhow!("no file name in {log_path:?}"))?;

    let directory = log_path
        .parent()
        .ok_or_else(|| anyhow!("{log_path:?} has no parent"))?;

    let file_appender = tracing_appender::rolling::never(directory, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let max_level = config
        .log
        .max_level
        .parse()
        .unwrap_or(tracing::Level::DEBUG);

    if config.log.log_target.is_empty() {
        let subscriber = tracing_subscriber::FmtSubscriber::builder()
            .with_max_level(max_level)
            .with_line_number(true)
            .with_writer(non_blocking)
            .with_ansi(false)
            .finish();

        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = tracing_subscriber::FmtSubscriber::builder()
            .with_env_filter(EnvFilter::new(&config.log.log_target))
            .with_line_number(true)
            .with_writer(non_blocking)
            .with_ansi(false)
            .finish();

        tracing::subscriber::set_global_default(subscriber)?;
    }

    tracing::debug!(path = %log_path.display(), "Logging initialized");

    Ok(Some(guard))
}
