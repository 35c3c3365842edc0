//! # Logbook
//!
//! An in-process logging facility: it timestamps and formats entries, appends
//! them durably to a log file, optionally echoes them to the console, and
//! notifies registered observers without blocking the caller on slow observer
//! code.
//!
//! ## Architecture Overview
//!
//! ```text
//! caller ──► Logger::emit ──┬──► LogWriter (write lock, try-lock only)
//!                           │
//!                           └──► AsyncDispatcher queue ──► worker thread
//!                                                            │
//!                                        CallbackRegistry ◄──┘
//!                                        (snapshot, then invoke)
//! ```
//!
//! - [`writer`]: log file, one-shot header/footer, entry counter
//! - [`registry`]: bounded set of observers
//! - [`dispatch`]: bounded FIFO plus the dedicated worker
//! - [`engine`]: the [`Logger`] façade
//!
//! ## Example
//!
//! ```no_run
//! use logbook::{log_info, LogConfig, Logger};
//!
//! let logger = Logger::initialize(LogConfig::new("logs", "app").with_time_format("%Y%m%d"))?;
//! log_info!(logger, "hello {}", 5);
//! logger.shutdown(0)?;
//! # Ok::<(), logbook::LogError>(())
//! ```

pub mod bounded;
pub mod config;
pub mod constants;
pub mod diagnostics;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod global;
pub mod level;
#[macro_use]
mod macros;
pub mod registry;
pub mod system_info;
pub mod timestamp;
pub mod writer;

pub use config::LogConfig;
pub use dispatch::{AsyncDispatcher, DispatchState, DispatchTask};
pub use engine::{Logger, ShutdownReport, Visibility};
pub use error::{LogError, Result};
pub use level::Level;
pub use registry::{CallbackRegistry, LogEvent, Observer};
pub use writer::LogWriter;
