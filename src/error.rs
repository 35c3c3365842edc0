//! Error types for the logging engine

use thiserror::Error;

/// Main error type for logging engine operations
///
/// Startup failures (`Config`, `Io`, `Allocation`, `Thread`) are returned to the
/// host from [`crate::Logger::initialize`]. Registry and queue failures are
/// returned to the direct caller of those operations. Hot-path failures never
/// reach the caller of `emit`; they are counted and reported through
/// [`crate::diagnostics`].
#[derive(Error, Debug)]
pub enum LogError {
    /// A required configuration field is missing or invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file could not be parsed or serialized
    #[error("Configuration parse error: {0}")]
    ConfigParse(String),

    /// Directory creation, file open or write failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A string or buffer could not be allocated
    #[error("Allocation error: {0}")]
    Allocation(String),

    /// The observer registry is at capacity
    #[error("Observer registry full (capacity {capacity})")]
    ObserverLimit { capacity: usize },

    /// The same observer is already registered
    #[error("Observer already registered")]
    DuplicateObserver,

    /// No registered observer matches
    #[error("Observer not found")]
    ObserverNotFound,

    /// The observer handle is missing
    #[error("Invalid observer")]
    InvalidObserver,

    /// The dispatch queue is at capacity
    #[error("Dispatch queue full (capacity {capacity})")]
    QueueFull { capacity: usize },

    /// The dispatch worker is not running
    #[error("Dispatch worker not running")]
    NotRunning,

    /// The dispatch worker thread could not be spawned
    #[error("Thread error: {0}")]
    Thread(String),

    /// The log file has already been closed
    #[error("Logger not initialized")]
    NotInitialized,

    /// A best-effort write was skipped because the write lock was held
    #[error("Log entry dropped due to write lock contention")]
    Dropped,

    /// Another thread is finalizing the log right now
    #[error("Shutdown already in progress")]
    ShutdownInProgress,
}

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, LogError>;

impl From<toml::de::Error> for LogError {
    fn from(err: toml::de::Error) -> Self {
        LogError::ConfigParse(err.to_string())
    }
}

impl From<toml::ser::Error> for LogError {
    fn from(err: toml::ser::Error) -> Self {
        LogError::ConfigParse(err.to_string())
    }
}

impl From<std::collections::TryReserveError> for LogError {
    fn from(err: std::collections::TryReserveError) -> Self {
        LogError::Allocation(err.to_string())
    }
}
