//! # Logging Constants
//!
//! This module contains the fixed capacities and formatting constants shared
//! by the writer, the observer registry and the dispatch queue. Keeping them
//! in one place makes the bounded-capacity invariants easy to audit.
//!
//! ## Capacity Constants
//!
//! Every buffer in the engine is bounded. Content that exceeds a capacity is
//! truncated (strings) or rejected (registry, queue) and the event is reported
//! on the diagnostics channel.

/// Maximum number of observers that may be registered at the same time
pub const MAX_OBSERVERS: usize = 10;

/// Maximum number of captured startup arguments
pub const MAX_ARGUMENTS: usize = 100;

/// Number of startup arguments printed in the header block
pub const HEADER_ARGUMENT_LIMIT: usize = 10;

/// Maximum rendered message size in bytes
pub const MESSAGE_CAPACITY: usize = 4096;

/// Maximum level name size carried by a dispatch task
pub const LEVEL_CAPACITY: usize = 32;

/// Maximum timestamp size carried by a dispatch task
pub const TIMESTAMP_CAPACITY: usize = 128;

/// Default number of pending dispatch tasks
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// Version reported when the host does not supply one
pub const DEFAULT_VERSION: &str = "0.0.0.1";

/// Placeholder for identity fields that were never supplied
pub const NOT_AVAILABLE: &str = "N/A";

/// Pattern used for entry, header and footer timestamps
pub const STANDARD_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Default pattern used for the time component of the log file name
pub const DEFAULT_FILE_TIME_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Separator line framing the header and footer blocks
pub const BANNER_RULE: &str = "============================================================";

/// Marker appended to a message that did not fit its buffer
pub const TRUNCATION_MARKER: &str = "...[truncated]";

/// Tracing target for drop, truncation and teardown reports
pub const DIAGNOSTICS_TARGET: &str = "logbook::diagnostics";

/// Name given to the observer dispatch thread
pub const DISPATCH_THREAD_NAME: &str = "logbook-dispatch";

/// Cosmetic taglines, one of which closes every header block
pub const HEADER_TAGLINES: &[&str] = &[
    "Welcome to our sister log system - Microsoft",
    "Happy birthday! If today is your birthday",
    "Cat is a pigeon, don't learn it",
];
