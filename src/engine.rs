//! # Logging Engine
//!
//! [`Logger`] is the façade a host talks to. Every `emit` call:
//!
//! 1. falls back to a best-effort console line if the logger has been shut down
//! 2. timestamps the entry and resolves its level code
//! 3. renders the message into a bounded buffer (truncating visibly)
//! 4. echoes the message to stdout when `Visible`
//! 5. appends the entry to the file if the write lock is free, otherwise
//!    drops the file write and reports the drop
//! 6. notifies observers, through the dispatch worker when it is running and
//!    inline otherwise
//!
//! ## Failure Policy
//!
//! `emit` never returns an error. Contention, a full dispatch queue and
//! truncation are counted and reported on the diagnostics channel so that
//! logging never fails the caller's business logic.
//!
//! ## Shutdown Order
//!
//! The dispatch worker is stopped (and joined) before the writer is
//! finalized, so no observer callback can run against a closed file.
//!
//! Exactly one caller finalizes the log. A caller that arrives while another
//! thread is still finalizing gets `ShutdownInProgress` immediately instead of
//! waiting, which keeps an observer that shuts the logger down from blocking
//! the worker the finalizing thread is joining.

use crate::bounded;
use crate::config::LogConfig;
use crate::constants::{DIAGNOSTICS_TARGET, MESSAGE_CAPACITY, STANDARD_TIME_FORMAT};
use crate::dispatch::AsyncDispatcher;
use crate::error::{LogError, Result};
use crate::level::Level;
use crate::registry::{CallbackRegistry, LogEvent, Observer};
use crate::timestamp;
use crate::writer::LogWriter;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, TryLockError};
use std::time::Duration;
use tracing::{debug, error, warn};

/// Whether an entry is echoed to the console as well as the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

/// Summary of a completed shutdown
#[derive(Debug, Clone, PartialEq)]
pub struct ShutdownReport {
    /// Entry lines written to the file
    pub entries: u64,
    /// Time between initialization and the footer
    pub elapsed: Duration,
    /// Exit status recorded in the footer
    pub status: i32,
    /// Log file that was closed
    pub path: PathBuf,
}

/// Console-only line used when no file is available.
///
/// Unlocked and best-effort: output errors are ignored.
pub(crate) fn console_fallback(level: Level, args: fmt::Arguments<'_>) {
    let message = bounded::render(args, MESSAGE_CAPACITY);
    let stamp = timestamp::now(STANDARD_TIME_FORMAT);
    let _ = writeln!(std::io::stdout().lock(), "[{}][{}] {}", stamp, level, message.text);
}

/// File logger with observer dispatch
pub struct Logger {
    writer: Mutex<LogWriter>,
    registry: Arc<CallbackRegistry>,
    dispatcher: AsyncDispatcher,
    initialized: AtomicBool,
    path: PathBuf,
    shutdown_claimed: AtomicBool,
    report: Mutex<Option<ShutdownReport>>,
    dropped_writes: AtomicU64,
    dropped_dispatches: AtomicU64,
    truncations: AtomicU64,
}

impl Logger {
    /// Open the log file and start the dispatch worker.
    ///
    /// ## Errors
    ///
    /// - `Config` when a required field is missing
    /// - `Io` when the directory or file cannot be created
    /// - `Allocation` when the identity or queue cannot be allocated
    /// - `Thread` when the worker cannot be spawned
    ///
    /// On error nothing is left running and the file, if opened, is closed.
    pub fn initialize(config: LogConfig) -> Result<Self> {
        let writer = LogWriter::open(&config)?;
        let path = writer.path().to_path_buf();

        let registry = Arc::new(CallbackRegistry::new());
        let dispatcher = AsyncDispatcher::new(Arc::clone(&registry), config.queue_capacity);
        dispatcher.start()?;

        debug!("Logger initialized, writing to {}", path.display());
        Ok(Self {
            writer: Mutex::new(writer),
            registry,
            dispatcher,
            initialized: AtomicBool::new(true),
            path,
            shutdown_claimed: AtomicBool::new(false),
            report: Mutex::new(None),
            dropped_writes: AtomicU64::new(0),
            dropped_dispatches: AtomicU64::new(0),
            truncations: AtomicU64::new(0),
        })
    }

    /// Log one entry. `code` is a level code: `e`, `f`, `i`, `w`; anything else
    /// is logged as `UNKNOWN`.
    pub fn emit(&self, visibility: Visibility, code: &str, args: fmt::Arguments<'_>) {
        self.log(visibility, Level::from_code(code), args);
    }

    /// Log one entry at `level`
    pub fn log(&self, visibility: Visibility, level: Level, args: fmt::Arguments<'_>) {
        if !self.initialized.load(Ordering::Acquire) {
            console_fallback(level, args);
            return;
        }

        let stamp = timestamp::standard_now();
        let rendered = bounded::render(args, MESSAGE_CAPACITY);
        if rendered.truncated {
            self.truncations.fetch_add(1, Ordering::Relaxed);
            warn!(
                target: DIAGNOSTICS_TARGET,
                "{} entry truncated to {} bytes", level, MESSAGE_CAPACITY
            );
        }
        let message = rendered.text;

        if visibility == Visibility::Visible {
            let _ = writeln!(std::io::stdout().lock(), "{}", message);
        }

        if let Err(e) = self.write_or_drop(level, &stamp, &message) {
            self.dropped_writes.fetch_add(1, Ordering::Relaxed);
            warn!(target: DIAGNOSTICS_TARGET, "{} entry not written: {}", level, e);
        }

        self.notify(level, &stamp, message);
    }

    /// Append the entry if the write lock is free. Never waits for it:
    /// contention yields `Dropped` and the line is lost.
    fn write_or_drop(&self, level: Level, stamp: &str, message: &str) -> Result<()> {
        match self.writer.try_lock() {
            Ok(mut writer) => self.write_entry(&mut writer, level, stamp, message),
            Err(TryLockError::Poisoned(poisoned)) => {
                self.write_entry(&mut poisoned.into_inner(), level, stamp, message)
            }
            Err(TryLockError::WouldBlock) => return Err(LogError::Dropped),
        }
        Ok(())
    }

    fn write_entry(&self, writer: &mut LogWriter, level: Level, stamp: &str, message: &str) {
        if let Err(e) = writer.write_header_once(stamp) {
            error!(target: DIAGNOSTICS_TARGET, "Failed to write log header: {}", e);
        }
        if let Err(e) = writer.record_entry(level, stamp, message) {
            error!(target: DIAGNOSTICS_TARGET, "Failed to write {} entry: {}", level, e);
        }
    }

    fn notify(&self, level: Level, stamp: &str, message: String) {
        if self.registry.is_empty() {
            return;
        }

        match self.dispatcher.submit(level.as_str(), &message, stamp) {
            Ok(_) => {}
            Err(LogError::NotRunning) => {
                let event = LogEvent {
                    level,
                    message,
                    timestamp: stamp.to_string(),
                };
                self.registry.snapshot_and_dispatch(&event);
            }
            Err(e) => {
                self.dropped_dispatches.fetch_add(1, Ordering::Relaxed);
                warn!(target: DIAGNOSTICS_TARGET, "{} entry not dispatched: {}", level, e);
            }
        }
    }

    pub fn info(&self, message: &str) {
        self.log(Visibility::Visible, Level::Info, format_args!("{}", message));
    }

    pub fn warn(&self, message: &str) {
        self.log(Visibility::Visible, Level::Warn, format_args!("{}", message));
    }

    pub fn error(&self, message: &str) {
        self.log(Visibility::Visible, Level::Error, format_args!("{}", message));
    }

    pub fn fatal(&self, message: &str) {
        self.log(Visibility::Visible, Level::Fatal, format_args!("{}", message));
    }

    /// Register an observer for every subsequent entry
    pub fn register_observer(&self, observer: Arc<dyn Observer>) -> Result<()> {
        self.registry.register(observer)
    }

    /// Remove a previously registered observer
    pub fn unregister_observer(&self, observer: &Arc<dyn Observer>) -> Result<()> {
        self.registry.unregister(observer)
    }

    pub fn registry(&self) -> &CallbackRegistry {
        &self.registry
    }

    pub fn dispatcher(&self) -> &AsyncDispatcher {
        &self.dispatcher
    }

    /// Stop the dispatch worker while keeping the file open. Later entries
    /// are delivered to observers synchronously on the emitting thread.
    pub fn stop_dispatch(&self) {
        self.dispatcher.stop();
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Log file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_writer(&self) -> MutexGuard<'_, LogWriter> {
        self.writer.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Entry lines written so far. Blocks on the write lock.
    pub fn entry_count(&self) -> u64 {
        self.lock_writer().entry_count()
    }

    /// File writes skipped because the write lock was busy
    pub fn dropped_writes(&self) -> u64 {
        self.dropped_writes.load(Ordering::Relaxed)
    }

    /// Observer notifications rejected by a full dispatch queue
    pub fn dropped_dispatches(&self) -> u64 {
        self.dropped_dispatches.load(Ordering::Relaxed)
    }

    /// Messages cut to the message capacity
    pub fn truncations(&self) -> u64 {
        self.truncations.load(Ordering::Relaxed)
    }

    fn stored_report(&self) -> Option<ShutdownReport> {
        self.report.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    /// Flush and release everything without terminating the process.
    ///
    /// Stops the dispatch worker, writes the header if no entry ever did,
    /// writes the footer with `status`, closes the file and clears the
    /// observers. Calling it again returns the first report.
    ///
    /// ## Errors
    ///
    /// - `ShutdownInProgress` when another thread is finalizing right now
    /// - `Io` when the header, footer or final flush fails
    pub fn shutdown(&self, status: i32) -> Result<ShutdownReport> {
        if self.shutdown_claimed.swap(true, Ordering::AcqRel) {
            return self.stored_report().ok_or(LogError::ShutdownInProgress);
        }

        self.initialized.store(false, Ordering::Release);
        self.dispatcher.stop();

        let mut writer = self.lock_writer();
        let stamp = timestamp::standard_now();
        let finished = writer
            .write_header_once(&stamp)
            .and_then(|_| writer.write_footer_once(status));
        let entries = writer.entry_count();
        let elapsed = writer.elapsed();
        let closed = writer.teardown();
        drop(writer);

        self.registry.clear();

        let done = ShutdownReport {
            entries,
            elapsed,
            status,
            path: self.path.clone(),
        };
        *self.report.lock().unwrap_or_else(|p| p.into_inner()) = Some(done.clone());
        debug!("Logger shut down after {} entries", entries);

        finished?;
        closed?;
        Ok(done)
    }

    /// Shut down, then terminate the process with `status`.
    ///
    /// If another thread is already finalizing, the process exits without
    /// waiting for it.
    pub fn exit(&self, status: i32) -> ! {
        match self.shutdown(status) {
            Ok(_) | Err(LogError::ShutdownInProgress) => {}
            Err(e) => eprintln!("Failed to finalize log {}: {}", self.path.display(), e),
        }
        std::process::exit(status)
    }

    /// Log `message` as an error, then shut down and exit with `status`
    pub fn fail(&self, message: &str, status: i32) -> ! {
        self.error(message);
        self.exit(status)
    }

    /// Log a fatal entry, then shut down and exit with a failure status
    pub fn abort(&self) -> ! {
        self.fatal("Program aborted due to critical error");
        self.exit(1)
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown(0) {
            warn!(target: DIAGNOSTICS_TARGET, "Failed to finalize log on drop: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;
    use std::fs;
    use std::sync::Weak;
    use std::thread;
    use tempfile::TempDir;

    fn test_logger(dir: &TempDir, base_name: &str) -> Logger {
        let config = LogConfig::new(dir.path(), base_name)
            .with_program_name("engine")
            .with_arguments(["engine"]);
        Logger::initialize(config).unwrap()
    }

    #[test]
    fn test_contended_write_is_dropped() {
        let dir = TempDir::new().unwrap();
        let logger = test_logger(&dir, "contended");
        let (tx, rx) = crossbeam_channel::unbounded::<LogEvent>();
        logger
            .register_observer(Arc::new(move |event: &LogEvent| {
                let _ = tx.send(event.clone());
            }))
            .unwrap();

        let (held_tx, held_rx) = bounded::<()>(0);
        let (release_tx, release_rx) = bounded::<()>(0);
        thread::scope(|scope| {
            scope.spawn(|| {
                let _guard = logger.writer.lock().unwrap();
                held_tx.send(()).unwrap();
                let _ = release_rx.recv();
            });
            held_rx.recv().unwrap();

            assert!(matches!(
                logger.write_or_drop(Level::Info, "now", "direct"),
                Err(LogError::Dropped)
            ));
            logger.emit(Visibility::Hidden, "w", format_args!("lost line"));
            drop(release_tx);
        });

        assert_eq!(logger.dropped_writes(), 1);
        assert_eq!(logger.entry_count(), 0);

        // The observer still hears about the entry the file missed
        let event = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(event.message, "lost line");
        assert_eq!(event.level, Level::Warn);

        let report = logger.shutdown(0).unwrap();
        let content = fs::read_to_string(report.path).unwrap();
        assert!(!content.contains("lost line"));
        assert!(!content.contains("direct"));
        assert!(content.contains("= Log entry: 0"));
    }

    #[test]
    fn test_observer_shutdown_during_host_shutdown() {
        let dir = TempDir::new().unwrap();
        let logger = Arc::new(test_logger(&dir, "reentrant"));
        let weak: Weak<Logger> = Arc::downgrade(&logger);
        let (entered_tx, entered_rx) = bounded::<()>(1);
        let (outcome_tx, outcome_rx) = bounded::<Result<ShutdownReport>>(1);

        logger
            .register_observer(Arc::new(move |event: &LogEvent| {
                if event.level != Level::Fatal {
                    return;
                }
                let _ = entered_tx.try_send(());
                // Give the host time to start its own shutdown
                thread::sleep(Duration::from_millis(200));
                if let Some(logger) = weak.upgrade() {
                    let _ = outcome_tx.try_send(logger.shutdown(1));
                }
            }))
            .unwrap();

        logger.emit(Visibility::Hidden, "f", format_args!("fatal"));
        entered_rx.recv_timeout(Duration::from_secs(5)).unwrap();

        let (done_tx, done_rx) = bounded::<Result<ShutdownReport>>(1);
        let host = Arc::clone(&logger);
        thread::spawn(move || {
            let _ = done_tx.send(host.shutdown(0));
        });

        let report = done_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("host shutdown must finish while an observer shuts down")
            .unwrap();
        assert_eq!(report.status, 0);
        assert_eq!(report.entries, 1);

        let observer_outcome = outcome_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(matches!(observer_outcome, Err(LogError::ShutdownInProgress)));

        // Once finished, every caller sees the stored report
        assert_eq!(logger.shutdown(7).unwrap(), report);
        let content = fs::read_to_string(&report.path).unwrap();
        assert_eq!(content.matches("= End of log -").count(), 1);
        assert!(content.contains("= Exit status: 0"));
    }
}
