//! # Diagnostics Channel
//!
//! The engine never fails a caller of `emit`. When a line is dropped under
//! write-lock contention, an observer dispatch is rejected by a full queue,
//! a message is truncated, or an observer panics, the event is reported here
//! instead. Reports are `tracing` events under the `logbook::diagnostics`
//! target, so a host that already runs a subscriber receives them without
//! any extra wiring.
//!
//! ## Environment Configuration
//!
//! When the host has no subscriber of its own, [`init_diagnostics`] installs
//! one that writes to stderr. Set `RUST_LOG` to control it:
//! - `RUST_LOG=logbook=debug` - Show worker lifecycle events as well
//! - `RUST_LOG=logbook::diagnostics=warn` - Only drops and truncations

use once_cell::sync::Lazy;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install a stderr subscriber for diagnostics.
///
/// Safe to call any number of times: the subscriber is installed once, and a
/// subscriber the host installed earlier is left in place.
pub fn init_diagnostics() {
    static INIT: Lazy<()> = Lazy::new(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("logbook=warn"));

        // try_init: the host may already own the global subscriber
        let _ = tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_names(true)
                    .with_level(true),
            )
            .try_init();
    });

    Lazy::force(&INIT);
}

