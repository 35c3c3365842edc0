// Logging macros for convenient formatted entries

/// Emit an entry with explicit visibility and level code
///
/// # Examples
/// ```ignore
/// log_emit!(logger, Visibility::Hidden, "w", "retrying {} of {}", attempt, limit);
/// ```
#[macro_export]
macro_rules! log_emit {
    ($logger:expr, $visibility:expr, $code:expr, $($arg:tt)+) => {
        $logger.emit($visibility, $code, format_args!($($arg)+))
    };
}

/// Log a visible message with info level
///
/// # Examples
/// ```ignore
/// log_info!(logger, "hello {}", 5);
/// ```
#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)+) => {
        $logger.log($crate::Visibility::Visible, $crate::Level::Info, format_args!($($arg)+))
    };
}

/// Log a visible message with warning level
#[macro_export]
macro_rules! log_warn {
    ($logger:expr, $($arg:tt)+) => {
        $logger.log($crate::Visibility::Visible, $crate::Level::Warn, format_args!($($arg)+))
    };
}

/// Log a visible message with error level
#[macro_export]
macro_rules! log_error {
    ($logger:expr, $($arg:tt)+) => {
        $logger.log($crate::Visibility::Visible, $crate::Level::Error, format_args!($($arg)+))
    };
}

/// Log a visible message with fatal level
#[macro_export]
macro_rules! log_fatal {
    ($logger:expr, $($arg:tt)+) => {
        $logger.log($crate::Visibility::Visible, $crate::Level::Fatal, format_args!($($arg)+))
    };
}

/// Emit through the process-wide logger (console only when none is installed)
///
/// # Examples
/// ```ignore
/// log_global!(Visibility::Visible, "i", "worker {} ready", id);
/// ```
#[macro_export]
macro_rules! log_global {
    ($visibility:expr, $code:expr, $($arg:tt)+) => {
        $crate::global::emit_global($visibility, $code, format_args!($($arg)+))
    };
}
