//! # System Information Module
//!
//! This module gathers the host details printed in the log header block
//! (operating system name, kernel/OS release, architecture) and the peak
//! resident memory printed in the footer block.
//!
//! ## Information Collected
//!
//! - Operating System name
//! - Operating System release (kernel release on Linux)
//! - System architecture (x86_64, aarch64, ...)
//! - Peak resident set size of the current process (Linux only)
//!
//! Every probe degrades to a placeholder value instead of failing: a missing
//! `/proc` entry or command never prevents the header from being written.

use serde::{Deserialize, Serialize};
#[cfg(any(target_os = "windows", target_os = "macos"))]
use std::process::Command;

/// Host details shown in the header's `Operating Environment` line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemInfo {
    /// Operating system name (e.g., "Linux", "macOS", "Windows")
    pub os_name: String,
    /// Operating system or kernel release
    pub os_release: String,
    /// System architecture (e.g., "x86_64", "aarch64")
    pub architecture: String,
}

impl SystemInfo {
    /// Collect host information, using fallback values where a probe fails
    pub fn collect() -> Self {
        Self {
            os_name: Self::get_os_name(),
            os_release: Self::get_os_release(),
            architecture: std::env::consts::ARCH.to_string(),
        }
    }

    /// `"<os> <release> (<arch>)"`
    pub fn environment_line(&self) -> String {
        format!("{} {} ({})", self.os_name, self.os_release, self.architecture)
    }

    fn get_os_name() -> String {
        if cfg!(target_os = "windows") {
            "Windows".to_string()
        } else if cfg!(target_os = "macos") {
            "macOS".to_string()
        } else if cfg!(target_os = "linux") {
            "Linux".to_string()
        } else {
            std::env::consts::OS.to_string()
        }
    }

    fn get_os_release() -> String {
        #[cfg(target_os = "linux")]
        {
            // Same value `uname -r` reports
            if let Ok(release) = std::fs::read_to_string("/proc/sys/kernel/osrelease") {
                let release = release.trim();
                if !release.is_empty() {
                    return release.to_string();
                }
            }
            "unknown".to_string()
        }

        #[cfg(target_os = "macos")]
        {
            if let Ok(output) = Command::new("sw_vers").arg("-productVersion").output() {
                let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !version.is_empty() {
                    return version;
                }
            }
            "unknown".to_string()
        }

        #[cfg(target_os = "windows")]
        {
            if let Ok(output) = Command::new("cmd").args(["/C", "ver"]).output() {
                let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !version.is_empty() {
                    return version;
                }
            }
            "unknown".to_string()
        }

        #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
        {
            "unknown".to_string()
        }
    }
}

/// Peak resident memory of this process in MB, if the platform reports it
pub fn peak_memory_mb() -> Option<u64> {
    #[cfg(target_os = "linux")]
    {
        let status = std::fs::read_to_string("/proc/self/status").ok()?;
        status
            .lines()
            .find(|line| line.starts_with("VmHWM:"))
            .and_then(|line| line.split_whitespace().nth(1))
            .and_then(|kb| kb.parse::<u64>().ok())
            .map(|kb| kb / 1024)
    }

    #[cfg(not(target_os = "linux"))]
    {
        None
    }
}
