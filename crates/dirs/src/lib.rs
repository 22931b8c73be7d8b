use directories::{ProjectDirs, UserDirs};
use std::path::PathBuf;
use std::sync::OnceLock;

pub struct Dirs;

impl Dirs {
    /// Project directory specifically for MagicMuse.
    ///
    /// Config, logs and fallback exports live there.
    pub fn project() -> &'static ProjectDirs {
        static CELL: OnceLock<ProjectDirs> = OnceLock::new();

        CELL.get_or_init(|| {
            ProjectDirs::from("com", "magicmuse", "MagicMuse")
                .expect("Couldn't create project directory for MagicMuse")
        })
    }

    /// Default location of `config.toml`.
    ///
    /// Linux: ~/.config/magicmuse/config.toml
    /// macOS: ~/Library/Application\ Support/com.magicmuse.MagicMuse/config.toml
    /// Windows: ~\AppData\Roaming\magicmuse\MagicMuse\config\config.toml
    pub fn config_file() -> PathBuf {
        Self::project().config_dir().join("config.toml")
    }

    /// Directory exported documents are written to when none is configured.
    ///
    /// `~/Documents/MagicMuse` if the platform has a documents folder, the
    /// project data directory otherwise.
    pub fn default_export_dir() -> PathBuf {
        UserDirs::new()
            .and_then(|user_dirs| user_dirs.document_dir().map(|dir| dir.join("MagicMuse")))
            .unwrap_or_else(|| Self::project().data_dir().join("exports"))
    }
}
