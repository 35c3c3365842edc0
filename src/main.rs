//! # Logbook Demo
//!
//! Small host program exercising the logger end to end:
//! 1. Load configuration (a `.toml` path given as the first argument, the
//!    platform config file, or defaults writing to `./logs`)
//! 2. Install the diagnostics subscriber
//! 3. Register an observer that forwards events to this thread over a channel
//! 4. Emit a handful of entries and print what the observer saw
//! 5. Finalize the log and exit with status 0

use crossbeam_channel::unbounded;
use logbook::diagnostics::init_diagnostics;
use logbook::{log_emit, log_info, log_warn, LogConfig, LogEvent, Logger, Observer, Visibility};
use std::path::PathBuf;
use std::sync::Arc;

fn load_config() -> LogConfig {
    let from_argument = std::env::args()
        .nth(1)
        .filter(|arg| arg.ends_with(".toml"))
        .map(PathBuf::from);

    let mut config = match from_argument {
        Some(path) => match LogConfig::from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load {}: {}", path.display(), e);
                LogConfig::load()
            }
        },
        None => LogConfig::load(),
    };

    // Fill in a location so the demo runs without any config file
    if config.directory.as_os_str().is_empty() {
        config.directory = PathBuf::from("logs");
    }
    if config.base_name.is_empty() {
        config.base_name = "logbook".to_string();
    }
    if config.version.is_none() {
        config.version = Some(env!("CARGO_PKG_VERSION").to_string());
    }
    config
}

fn main() {
    init_diagnostics();

    let logger = match Logger::initialize(load_config()) {
        Ok(logger) => logger,
        Err(e) => {
            eprintln!("Failed to initialize logger: {}", e);
            std::process::exit(1);
        }
    };

    let (tx, rx) = unbounded::<LogEvent>();
    let forwarder: Arc<dyn Observer> = Arc::new(move |event: &LogEvent| {
        let _ = tx.send(event.clone());
    });
    if let Err(e) = logger.register_observer(forwarder) {
        logger.fail(&format!("Failed to register observer: {}", e), 1);
    }

    log_info!(logger, "Logbook demo started with {} argument(s)", std::env::args().count());
    log_warn!(logger, "This is a warning message.");
    log_emit!(logger, Visibility::Visible, "e", "This is an error message.");
    log_emit!(logger, Visibility::Visible, "f", "This is a fatal message.");
    log_emit!(logger, Visibility::Hidden, "i", "This is an invisible message.");

    // Stopping dispatch joins the worker, so every event has been forwarded
    logger.stop_dispatch();
    for event in rx.try_iter() {
        println!("observer: [{}][{}] {}", event.timestamp, event.level, event.message);
    }

    println!("Log written to {}", logger.path().display());
    logger.exit(0)
}
