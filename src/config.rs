//! # Configuration Module
//!
//! This module describes how a [`crate::Logger`] is initialized: where the log
//! file goes, how its name is stamped, and which identity (program name,
//! version, startup arguments) is printed in the header block.
//!
//! Configuration can be built in code, parsed from a TOML file, or loaded from
//! the platform configuration directory using the TOML format for human
//! readability.
//!
//! ## Configuration Storage Locations
//!
//! - **Windows**: `%APPDATA%\Logbook\config.toml`
//! - **macOS**: `~/Library/Application Support/Logbook/config.toml`
//! - **Linux**: `~/.config/logbook/config.toml`
//!
//! ## Required Fields
//!
//! `directory`, `base_name` and `time_format` must be non-empty and
//! `queue_capacity` must be positive. Everything else has a working default.

use crate::constants::{
    DEFAULT_FILE_TIME_FORMAT, DEFAULT_QUEUE_CAPACITY, DEFAULT_VERSION, NOT_AVAILABLE,
};
use crate::error::{LogError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Logger initialization record
///
/// ## Field Descriptions
///
/// - `time_format`: strftime pattern for the time component of the file name
/// - `directory`: output folder, created recursively if absent
/// - `base_name`: file name stem; the file is `directory/base_name_<time>.log`
/// - `program_name`: name printed in the header and in every entry tag
/// - `version`: program version, `"0.0.0.1"` when absent
/// - `arguments`: captured startup arguments, printed in the header
/// - `queue_capacity`: number of pending observer dispatch tasks
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    /// Pattern used to stamp the log file name
    pub time_format: String,

    /// Directory that receives the log file
    pub directory: PathBuf,

    /// Stem of the log file name
    pub base_name: String,

    /// Program name shown in the header and entry tags
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program_name: Option<String>,

    /// Program version shown in the header
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Startup arguments shown in the header
    pub arguments: Vec<String>,

    /// Capacity of the asynchronous dispatch queue
    pub queue_capacity: usize,
}

impl Default for LogConfig {
    /// Defaults capture the current process identity but leave `directory`
    /// and `base_name` empty, so a host must choose where the file goes.
    fn default() -> Self {
        let arguments: Vec<String> = std::env::args().collect();
        let program_name = arguments.first().map(|arg0| {
            Path::new(arg0)
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| arg0.clone())
        });

        Self {
            time_format: DEFAULT_FILE_TIME_FORMAT.to_string(),
            directory: PathBuf::new(),
            base_name: String::new(),
            program_name,
            version: None,
            arguments,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl LogConfig {
    /// Configuration writing `directory/base_name_<time>.log`
    pub fn new(directory: impl Into<PathBuf>, base_name: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            base_name: base_name.into(),
            ..Self::default()
        }
    }

    pub fn with_time_format(mut self, time_format: impl Into<String>) -> Self {
        self.time_format = time_format.into();
        self
    }

    pub fn with_program_name(mut self, program_name: impl Into<String>) -> Self {
        self.program_name = Some(program_name.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_arguments<I, S>(mut self, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arguments = arguments.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = queue_capacity;
        self
    }

    /// Check that every required field is present
    pub fn validate(&self) -> Result<()> {
        if self.directory.as_os_str().is_empty() {
            return Err(LogError::Config("output directory is required".into()));
        }
        if self.base_name.trim().is_empty() {
            return Err(LogError::Config("base file name is required".into()));
        }
        if self.time_format.is_empty() {
            return Err(LogError::Config("time format is required".into()));
        }
        if self.queue_capacity == 0 {
            return Err(LogError::Config("queue capacity must be positive".into()));
        }
        Ok(())
    }

    /// Version printed in the header
    pub fn effective_version(&self) -> &str {
        self.version.as_deref().unwrap_or(DEFAULT_VERSION)
    }

    /// Name printed in the header and in entry tags
    pub fn display_name(&self) -> &str {
        self.program_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .or_else(|| self.arguments.first().map(String::as_str))
            .unwrap_or(NOT_AVAILABLE)
    }

    /// Parse a TOML configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: LogConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from the platform config directory, using defaults
    /// if the file doesn't exist or is invalid
    ///
    /// The logger cannot report on itself before it exists, so failures here
    /// go to stderr, the same way a missing config is tolerated at startup.
    pub fn load() -> Self {
        match Self::config_path() {
            Ok(path) => {
                if path.exists() {
                    match Self::from_file(&path) {
                        Ok(config) => config,
                        Err(e) => {
                            eprintln!("Failed to load config {}: {}", path.display(), e);
                            Self::default()
                        }
                    }
                } else {
                    Self::default()
                }
            }
            Err(e) => {
                eprintln!("Failed to get config path: {}", e);
                Self::default()
            }
        }
    }

    /// Save configuration as pretty-printed TOML, creating parent directories
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Determine the platform-appropriate configuration file path
    ///
    /// Windows and macOS use a capitalised application folder, Linux and other
    /// Unix-like systems follow the lowercase XDG convention.
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| LogError::Config("could not find config directory".into()))?;

        let app_dir = if cfg!(any(target_os = "windows", target_os = "macos")) {
            config_dir.join("Logbook")
        } else {
            config_dir.join("logbook")
        };

        Ok(app_dir.join("config.toml"))
    }
}
