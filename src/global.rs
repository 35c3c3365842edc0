//! # Process-wide Logger
//!
//! Most hosts pass a [`Logger`] around explicitly. For programs that want one
//! logger reachable from anywhere, this module keeps an optional shared
//! instance. Entries emitted before [`init_global`] or after
//! [`shutdown_global`] are written to the console only.

use crate::config::LogConfig;
use crate::engine::{console_fallback, Logger, ShutdownReport, Visibility};
use crate::error::{LogError, Result};
use crate::level::Level;
use once_cell::sync::Lazy;
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

static GLOBAL: Lazy<RwLock<Option<Arc<Logger>>>> = Lazy::new(|| RwLock::new(None));

fn read() -> RwLockReadGuard<'static, Option<Arc<Logger>>> {
    GLOBAL.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write() -> RwLockWriteGuard<'static, Option<Arc<Logger>>> {
    GLOBAL.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Initialize the process-wide logger.
///
/// Fails with `Config` if one is already installed; shut it down first.
pub fn init_global(config: LogConfig) -> Result<Arc<Logger>> {
    let mut slot = write();
    if slot.is_some() {
        return Err(LogError::Config("global logger already initialized".into()));
    }

    let logger = Arc::new(Logger::initialize(config)?);
    *slot = Some(Arc::clone(&logger));
    Ok(logger)
}

/// The process-wide logger, if installed
pub fn global() -> Option<Arc<Logger>> {
    read().clone()
}

/// Emit through the process-wide logger, or to the console when there is none
pub fn emit_global(visibility: Visibility, code: &str, args: fmt::Arguments<'_>) {
    match global() {
        Some(logger) => logger.emit(visibility, code, args),
        None => console_fallback(Level::from_code(code), args),
    }
}

/// Uninstall and shut down the process-wide logger
pub fn shutdown_global(status: i32) -> Result<ShutdownReport> {
    let logger = write().take().ok_or(LogError::NotInitialized)?;
    logger.shutdown(status)
}

/// Shut down the process-wide logger, if any, then exit with `status`
pub fn exit_global(status: i32) -> ! {
    if let Err(e) = shutdown_global(status) {
        if !matches!(e, LogError::NotInitialized) {
            eprintln!("Failed to finalize global log: {}", e);
        }
    }
    std::process::exit(status)
}
