//! Configuration management.

use crate::storage::{DEFAULT_CHECKPOINT_INTERVAL, StoreOptions};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration for lessonbank.
#[derive(Debug, Clone)]
pub struct LessonbankConfig {
    /// Directory holding the snapshot file and logs.
    pub data_dir: PathBuf,
    /// Path of the snapshot file.
    pub db_path: PathBuf,
    /// Path of the bootstrap DDL script.
    pub bootstrap_ddl: PathBuf,
    /// Interval between periodic snapshots.
    pub checkpoint_interval: Duration,
    /// Logging configuration.
    pub logging: LoggingSettings,
}

/// Logging section of the configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingSettings {
    /// Output format: "pretty" or "json".
    pub format: Option<String>,
    /// Log file path (stderr if unset).
    pub file: Option<PathBuf>,
    /// Filter directive, e.g. "info" or "lessonbank=debug" (overridden by
    /// `RUST_LOG`).
    pub filter: Option<String>,
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    /// Data directory.
    pub data_dir: Option<String>,
    /// Snapshot file path.
    pub db_path: Option<String>,
    /// Bootstrap DDL path.
    pub bootstrap_ddl: Option<String>,
    /// Seconds between periodic snapshots.
    pub checkpoint_interval_secs: Option<u64>,
    /// Logging settings.
    pub logging: Option<LoggingSettings>,
}

impl Default for LessonbankConfig {
    fn default() -> Self {
        let data_dir = PathBuf::from(".lessonbank");
        Self {
            db_path: data_dir.join("lessonbank.db"),
            bootstrap_ddl: PathBuf::from("sql/bootstrap.sql"),
            checkpoint_interval: DEFAULT_CHECKPOINT_INTERVAL,
            logging: LoggingSettings::default(),
            data_dir,
        }
    }
}

impl LessonbankConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &std::path::Path) -> crate::Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| crate::Error::Init {
            cause: format!("config '{}' unreadable: {e}", path.display()),
        })?;

        let file: ConfigFile = toml::from_str(&contents).map_err(|e| crate::Error::Init {
            cause: format!("config '{}' invalid: {e}", path.display()),
        })?;

        Ok(Self::from_config_file(file))
    }

    /// Loads configuration from the default location.
    ///
    /// Checks the following paths in order:
    /// 1. Platform-specific config dir (`~/Library/Application Support/lessonbank/` on macOS)
    /// 2. XDG config dir (`~/.config/lessonbank/` for Unix compatibility)
    ///
    /// Returns default configuration if no config file is found.
    #[must_use]
    pub fn load_default() -> Self {
        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Self::default();
        };

        // Check platform-specific config dir first
        let platform_config = base_dirs
            .config_dir()
            .join("lessonbank")
            .join("config.toml");
        if platform_config.exists() {
            if let Ok(config) = Self::load_from_file(&platform_config) {
                return config;
            }
        }

        // Fall back to XDG-style ~/.config/lessonbank/ for Unix compatibility
        let xdg_config = base_dirs
            .home_dir()
            .join(".config")
            .join("lessonbank")
            .join("config.toml");
        if xdg_config.exists() {
            if let Ok(config) = Self::load_from_file(&xdg_config) {
                return config;
            }
        }

        Self::default()
    }

    /// Converts a `ConfigFile` to `LessonbankConfig`.
    fn from_config_file(file: ConfigFile) -> Self {
        let mut config = Self::default();

        if let Some(data_dir) = file.data_dir {
            config.data_dir = PathBuf::from(data_dir);
            // db_path follows the data dir unless explicitly overridden below
            config.db_path = config.data_dir.join("lessonbank.db");
        }
        if let Some(db_path) = file.db_path {
            config.db_path = PathBuf::from(db_path);
        }
        if let Some(bootstrap_ddl) = file.bootstrap_ddl {
            config.bootstrap_ddl = PathBuf::from(bootstrap_ddl);
        }
        if let Some(secs) = file.checkpoint_interval_secs {
            config.checkpoint_interval = Duration::from_secs(secs);
        }
        if let Some(logging) = file.logging {
            config.logging = logging;
        }

        config
    }

    /// Sets the data directory (and the snapshot path underneath it).
    #[must_use]
    pub fn with_data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_dir = path.into();
        self.db_path = self.data_dir.join("lessonbank.db");
        self
    }

    /// Sets the snapshot file path.
    #[must_use]
    pub fn with_db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.db_path = path.into();
        self
    }

    /// Sets the bootstrap DDL path.
    #[must_use]
    pub fn with_bootstrap_ddl(mut self, path: impl Into<PathBuf>) -> Self {
        self.bootstrap_ddl = path.into();
        self
    }

    /// The store options described by this configuration.
    #[must_use]
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            db_path: self.db_path.clone(),
            bootstrap_ddl: self.bootstrap_ddl.clone(),
        }
    }
}
