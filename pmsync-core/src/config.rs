//! Sync core configuration.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CALENDAR_NAME, DEFAULT_HOURS_PER_DAY, DEFAULT_RETRY_ATTEMPTS,
    DEFAULT_WORKDAY_START_HOUR,
};
use crate::error::{PmSyncError, PmSyncResult};

static DEFAULT_STORAGE_ROOT: &str = "~/.local/share/pmsync/collections";

fn default_storage_root() -> PathBuf {
    PathBuf::from(DEFAULT_STORAGE_ROOT)
}

fn default_calendar_name() -> String {
    DEFAULT_CALENDAR_NAME.to_string()
}

fn default_retry_attempts() -> u32 {
    DEFAULT_RETRY_ATTEMPTS
}

/// Configuration at ~/.config/pmsync/config.toml, overridable with
/// `PMSYNC_*` environment variables (`PMSYNC_WORKING_HOURS__START_HOUR=8`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PmSyncConfig {
    #[serde(default = "default_storage_root")]
    pub storage_root: PathBuf,

    #[serde(default = "default_calendar_name")]
    pub calendar_name: String,

    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    #[serde(default)]
    pub working_hours: WorkingHours,
}

/// The daily working window, in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorkingHours {
    pub start_hour: u32,
    pub hours_per_day: f64,
}

impl Default for WorkingHours {
    fn default() -> Self {
        WorkingHours {
            start_hour: DEFAULT_WORKDAY_START_HOUR,
            hours_per_day: DEFAULT_HOURS_PER_DAY,
        }
    }
}

impl WorkingHours {
    pub fn validate(&self) -> PmSyncResult<()> {
        if self.start_hour >= 24 {
            return Err(PmSyncError::Config(format!(
                "working_hours.start_hour must be below 24, got {}",
                self.start_hour
            )));
        }
        let end = self.start_hour as f64 + self.hours_per_day;
        if !(self.hours_per_day > 0.0) || end > 24.0 {
            return Err(PmSyncError::Config(format!(
                "working_hours.hours_per_day must be positive and end by midnight, got {}",
                self.hours_per_day
            )));
        }
        Ok(())
    }
}

impl Default for PmSyncConfig {
    fn default() -> Self {
        PmSyncConfig {
            storage_root: default_storage_root(),
            calendar_name: default_calendar_name(),
            retry_attempts: default_retry_attempts(),
            working_hours: WorkingHours::default(),
        }
    }
}

impl PmSyncConfig {
    pub fn config_path() -> PmSyncResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| PmSyncError::Config("Could not determine config directory".into()))?
            .join("pmsync");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location, writing a commented default file first
    /// if none exists.
    pub fn load() -> PmSyncResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    /// Load from `path` (optional) layered under the environment.
    pub fn load_from(path: &Path) -> PmSyncResult<Self> {
        let config: PmSyncConfig = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(
                Environment::with_prefix("PMSYNC")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| PmSyncError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| PmSyncError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> PmSyncResult<()> {
        if self.retry_attempts == 0 {
            return Err(PmSyncError::Config(
                "retry_attempts must be at least 1".into(),
            ));
        }
        if self.calendar_name.is_empty() || self.calendar_name.contains('/') {
            return Err(PmSyncError::Config(format!(
                "calendar_name '{}' is not a valid collection name",
                self.calendar_name
            )));
        }
        self.working_hours.validate()
    }

    /// Storage root with `~` expanded.
    pub fn storage_path(&self) -> PathBuf {
        let full_path_str =
            shellexpand::tilde(&self.storage_root.to_string_lossy()).into_owned();

        PathBuf::from(full_path_str)
    }

    /// The effective configuration as TOML.
    pub fn to_toml_string(&self) -> PmSyncResult<String> {
        toml::to_string_pretty(self).map_err(|e| PmSyncError::Config(e.to_string()))
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> PmSyncResult<()> {
        let contents = format!(
            "\
# pmsync configuration

# Where calendar collections are stored:
# storage_root = \"{}\"

# Calendar each owner's tasks are mirrored into:
# calendar_name = \"{}\"

# Attempts per store operation on transient failures:
# retry_attempts = {}

# Working window (UTC) used for scheduling:
# [working_hours]
# start_hour = {}
# hours_per_day = {}
",
            DEFAULT_STORAGE_ROOT,
            DEFAULT_CALENDAR_NAME,
            DEFAULT_RETRY_ATTEMPTS,
            DEFAULT_WORKDAY_START_HOUR,
            DEFAULT_HOURS_PER_DAY,
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                PmSyncError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| PmSyncError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
