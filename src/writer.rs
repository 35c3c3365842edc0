//! # Log Writer
//!
//! The writer owns the open log file and everything that must change together
//! with it: the one-shot header and footer flags, the entry counter, the start
//! instant, and the deep-copied identity (program name, version, arguments).
//!
//! ## Locking
//!
//! `LogWriter` itself is not synchronized. The engine keeps it behind a single
//! mutex (the write lock) and every method that touches the file takes
//! `&mut self`, so the borrow checker enforces that callers hold the lock.
//!
//! ## File Layout
//!
//! A header block is written exactly once, followed by entry lines of the form
//! `\n[<timestamp>][<LEVEL>/<program>] <message>`, followed by a footer block
//! written exactly once. The flags are plain booleans: there are only two
//! transitions (unwritten to written) and no way back short of a new writer.

use crate::config::LogConfig;
use crate::constants::{
    BANNER_RULE, DIAGNOSTICS_TARGET, HEADER_ARGUMENT_LIMIT, HEADER_TAGLINES, MAX_ARGUMENTS,
    NOT_AVAILABLE,
};
use crate::error::{LogError, Result};
use crate::level::Level;
use crate::system_info::{self, SystemInfo};
use crate::timestamp;
use rand::seq::SliceRandom;
use std::fmt::Write as _;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Owned copy of the identity printed in the header and entry tags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub program_name: String,
    pub version: String,
    pub arguments: Vec<String>,
}

impl Identity {
    /// Deep-copy the identity out of `config`.
    ///
    /// Every string is reserved fallibly. If any reservation fails the
    /// partially built copy is dropped as a whole and `Allocation` is returned.
    /// Arguments beyond [`MAX_ARGUMENTS`] are not captured.
    pub fn capture(config: &LogConfig) -> Result<Self> {
        let kept = config.arguments.len().min(MAX_ARGUMENTS);
        if kept < config.arguments.len() {
            warn!(
                target: DIAGNOSTICS_TARGET,
                "Captured {} of {} startup arguments",
                kept,
                config.arguments.len()
            );
        }

        let mut arguments = Vec::new();
        arguments.try_reserve_exact(kept)?;
        for argument in &config.arguments[..kept] {
            arguments.push(copy_string(argument)?);
        }

        Ok(Self {
            program_name: copy_string(config.display_name())?,
            version: copy_string(config.effective_version())?,
            arguments,
        })
    }
}

fn copy_string(source: &str) -> Result<String> {
    let mut copy = String::new();
    copy.try_reserve_exact(source.len())?;
    copy.push_str(source);
    Ok(copy)
}

/// Build `directory/base_name_stamp.log`
pub fn build_file_path(directory: &Path, base_name: &str, stamp: &str) -> PathBuf {
    directory.join(format!("{}_{}.log", base_name, stamp))
}

/// File handle plus the state that is mutated together with it
pub struct LogWriter {
    stream: Option<BufWriter<File>>,
    path: PathBuf,
    identity: Option<Identity>,
    entry_count: u64,
    header_written: bool,
    footer_written: bool,
    start: Option<Instant>,
}

impl LogWriter {
    /// Validate `config`, create the output directory, open a fresh log file
    /// and capture the start instant and identity.
    ///
    /// ## Errors
    ///
    /// - `Config` when a required field is missing
    /// - `Io` when the directory cannot be created or the file cannot be opened
    /// - `Allocation` when the identity cannot be copied
    pub fn open(config: &LogConfig) -> Result<Self> {
        config.validate()?;

        // create_dir_all already tolerates an existing directory
        let existed = config.directory.is_dir();
        fs::create_dir_all(&config.directory)?;
        if !existed {
            debug!("Created log directory {}", config.directory.display());
        }

        let stamp = timestamp::now(&config.time_format);
        let path = build_file_path(&config.directory, &config.base_name, &stamp);
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)?;

        let identity = Identity::capture(config)?;
        debug!("Opened log file {}", path.display());

        Ok(Self {
            stream: Some(BufWriter::new(file)),
            path,
            identity: Some(identity),
            entry_count: 0,
            header_written: false,
            footer_written: false,
            start: Some(Instant::now()),
        })
    }

    /// Path of the log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the file is still open
    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    /// Number of entry lines written so far
    pub fn entry_count(&self) -> u64 {
        self.entry_count
    }

    pub fn header_written(&self) -> bool {
        self.header_written
    }

    pub fn footer_written(&self) -> bool {
        self.footer_written
    }

    /// Identity captured at open, `None` after teardown
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Name used in the header and entry tags, `N/A` after teardown
    pub fn program_name(&self) -> &str {
        self.identity
            .as_ref()
            .map_or(NOT_AVAILABLE, |identity| identity.program_name.as_str())
    }

    /// Time since open, zero when the start instant was never captured
    pub fn elapsed(&self) -> Duration {
        self.start.map(|start| start.elapsed()).unwrap_or_default()
    }

    /// Write the header block unless it has been written already.
    ///
    /// Returns `Ok(true)` when this call wrote the header.
    pub fn write_header_once(&mut self, timestamp: &str) -> Result<bool> {
        if self.header_written {
            return Ok(false);
        }

        let header = self.render_header(timestamp);
        let stream = self.stream.as_mut().ok_or(LogError::NotInitialized)?;
        stream.write_all(header.as_bytes())?;
        stream.flush()?;

        self.header_written = true;
        Ok(true)
    }

    fn render_header(&self, timestamp: &str) -> String {
        let system = SystemInfo::collect();
        let (version, arguments) = match &self.identity {
            Some(identity) => (identity.version.as_str(), identity.arguments.as_slice()),
            None => (NOT_AVAILABLE, &[][..]),
        };
        let program_name = self.program_name();
        let tagline = HEADER_TAGLINES
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or_default();

        let mut header = String::new();
        let _ = writeln!(header, "{}", BANNER_RULE);
        let _ = writeln!(header, "= Application log- {}", program_name);
        let _ = writeln!(header, "= Version number: {}", version);
        let _ = writeln!(header, "= Operating Environment: {}", system.environment_line());
        let _ = writeln!(header, "= Startup parameters:");
        for (index, argument) in arguments.iter().take(HEADER_ARGUMENT_LIMIT).enumerate() {
            let _ = writeln!(header, "    {}: {}", index, argument);
        }
        let _ = writeln!(header, "= Start time: {}", timestamp);
        let _ = writeln!(header, "= {}", tagline);
        let _ = write!(header, "{}", BANNER_RULE);
        header
    }

    /// Write the footer block unless it has been written already.
    ///
    /// Returns `Ok(true)` when this call wrote the footer.
    pub fn write_footer_once(&mut self, status: i32) -> Result<bool> {
        if self.footer_written {
            return Ok(false);
        }

        let footer = self.render_footer(status);
        let stream = self.stream.as_mut().ok_or(LogError::NotInitialized)?;
        stream.write_all(footer.as_bytes())?;
        stream.flush()?;

        self.footer_written = true;
        Ok(true)
    }

    fn render_footer(&self, status: i32) -> String {
        let peak = system_info::peak_memory_mb()
            .map(|mb| mb.to_string())
            .unwrap_or_default();

        let mut footer = String::new();
        let _ = writeln!(footer);
        let _ = writeln!(footer, "{}", BANNER_RULE);
        let _ = writeln!(footer, "= End of log -");
        let _ = writeln!(footer, "= Exit time: {}", timestamp::standard_now());
        let _ = writeln!(footer, "= Running time: {:.6} seconds", self.elapsed().as_secs_f64());
        let _ = writeln!(footer, "= Log entry: {}", self.entry_count);
        let _ = writeln!(footer, "= Exit status: {}", status);
        let _ = writeln!(footer, "= Peak memory(MB): {}", peak);
        let _ = writeln!(footer, "{}", BANNER_RULE);
        footer
    }

    /// Append one entry line, flush it, and bump the counter.
    ///
    /// Returns the counter value after this entry. Fails with
    /// `NotInitialized` after teardown; the line is not written.
    pub fn record_entry(&mut self, level: Level, timestamp: &str, message: &str) -> Result<u64> {
        let program_name = self
            .identity
            .as_ref()
            .map_or(NOT_AVAILABLE, |identity| identity.program_name.as_str());
        let stream = self.stream.as_mut().ok_or(LogError::NotInitialized)?;
        write!(
            stream,
            "\n[{}][{}/{}] {}",
            timestamp, level, program_name, message
        )?;
        stream.flush()?;

        self.entry_count += 1;
        Ok(self.entry_count)
    }

    /// Flush and close the file and release the identity copy.
    ///
    /// Safe to call more than once; later calls do nothing.
    pub fn teardown(&mut self) -> Result<()> {
        self.identity = None;
        match self.stream.take() {
            Some(mut stream) => {
                stream.flush()?;
                debug!("Closed log file {}", self.path.display());
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl Drop for LogWriter {
    fn drop(&mut self) {
        if let Err(e) = self.teardown() {
            warn!(target: DIAGNOSTICS_TARGET, "Failed to flush log file on drop: {}", e);
        }
    }
}
