use dirs::Dirs;
use muse_core::export::PageGeometry;
use muse_core::reveal::RevealOptions;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

static CONFIG: OnceCell<ConfigInner> = OnceCell::new();

#[derive(Debug)]
struct ConfigInner {
    config: Config,
    file_path: PathBuf,
}

#[derive(Debug)]
pub struct LoadedConfig {
    pub config: Config,
    pub file_path: PathBuf,
    pub maybe_error: Option<toml::de::Error>,
}

/// Reads the config file, falling back to the defaults if it is missing or
/// malformed. A parse error is handed back rather than aborting.
pub fn load_config(specified_config_file: Option<PathBuf>) -> LoadedConfig {
    let config_file = specified_config_file.unwrap_or_else(|| {
        let config_file_path = Dirs::config_file();

        if let Some(parent) = config_file_path.parent() {
            std::fs::create_dir_all(parent).ok();
        }

        config_file_path
    });

    let mut maybe_config_err = None;
    let config = std::fs::read_to_string(&config_file)
        .ok()
        .and_then(|contents| {
            toml::from_str(&contents)
                .map_err(|err| {
                    maybe_config_err.replace(err);
                })
                .ok()
        })
        .unwrap_or_default();

    LoadedConfig {
        config,
        file_path: config_file,
        maybe_error: maybe_config_err,
    }
}

/// Initializes the global [`Config`] once, later calls return the first one.
pub fn load_config_on_startup(
    specified_config_file: Option<PathBuf>,
) -> (&'static Config, Option<toml::de::Error>) {
    let mut maybe_error = None;

    let inner = CONFIG.get_or_init(|| {
        let loaded = load_config(specified_config_file);
        maybe_error = loaded.maybe_error;
        ConfigInner {
            config: loaded.config,
            file_path: loaded.file_path,
        }
    });

    (&inner.config, maybe_error)
}

/// [`Config`] is a global singleton, initialized by [`load_config_on_startup`]
/// when the program is started from CLI, otherwise from the default config
/// file location.
pub fn config() -> &'static Config {
    &CONFIG
        .get_or_init(|| {
            let LoadedConfig {
                config, file_path, ..
            } = load_config(None);
            ConfigInner { config, file_path }
        })
        .config
}

pub fn config_file() -> Option<&'static PathBuf> {
    CONFIG.get().map(|inner| &inner.file_path)
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct LogConfig {
    /// Specify the log file path.
    ///
    /// This path must be an absolute path.
    pub log_file: Option<String>,

    /// Specify the max log level.
    pub max_level: String,

    /// Specify the log target to enable more detailed logging.
    ///
    /// ```toml
    /// [log]
    /// log-target = "muse_core::typing=trace"
    /// ```
    pub log_target: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_file: None,
            max_level: "debug".into(),
            log_target: "".into(),
        }
    }
}

/// Typing reveal.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct TypingConfig {
    /// Delay before each character in milliseconds.
    pub speed_ms: u64,

    /// Pause between two blocks in milliseconds.
    pub block_delay_ms: u64,

    /// Text shown when there is nothing to reveal.
    pub placeholder: String,
}

impl Default for TypingConfig {
    fn default() -> Self {
        let RevealOptions {
            speed,
            block_delay,
            placeholder,
        } = RevealOptions::default();

        Self {
            speed_ms: speed.as_millis() as u64,
            block_delay_ms: block_delay.as_millis() as u64,
            placeholder,
        }
    }
}

impl TypingConfig {
    pub fn reveal_options(&self) -> RevealOptions {
        RevealOptions {
            speed: Duration::from_millis(self.speed_ms),
            block_delay: Duration::from_millis(self.block_delay_ms),
            placeholder: self.placeholder.clone(),
        }
    }
}

/// Document export.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct ExportConfig {
    pub page_width_mm: f32,

    pub page_height_mm: f32,

    pub margin_mm: f32,

    /// Directory for exported files.
    ///
    /// Defaults to `~/Documents/MagicMuse`.
    pub output_dir: Option<PathBuf>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        let PageGeometry {
            width_mm,
            height_mm,
            margin_mm,
        } = PageGeometry::default();

        Self {
            page_width_mm: width_mm,
            page_height_mm: height_mm,
            margin_mm,
            output_dir: None,
        }
    }
}

impl ExportConfig {
    pub fn page_geometry(&self) -> PageGeometry {
        PageGeometry {
            width_mm: self.page_width_mm,
            height_mm: self.page_height_mm,
            margin_mm: self.margin_mm,
        }
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(Dirs::default_export_dir)
    }
}

#[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Config {
    /// Log configuration.
    pub log: LogConfig,

    /// Typing reveal configuration.
    pub typing: TypingConfig,

    /// Export configuration.
    pub export: ExportConfig,
}
