//! Abstraction over the zonestat invocation.
//!
//! The `ZonestatSource` trait lets the collector run against the real
//! `zonestat(1)` binary in production and against canned reports in tests
//! (see [`crate::collector::mock`]).

use std::process::Command;

use tracing::debug;

/// Default location of the zonestat executable.
pub const DEFAULT_ZONESTAT_PATH: &str = "/usr/bin/zonestat";

/// Error raised when the statistics source cannot produce a report.
#[derive(Debug)]
pub enum SourceError {
    /// The executable could not be started (missing binary, permissions).
    Spawn(std::io::Error),
    /// zonestat ran but exited non-zero.
    Failed { code: Option<i32>, output: String },
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::Spawn(e) => {
                write!(f, "failed to run zonestat (Solaris 11 only): {}", e)
            }
            SourceError::Failed { code, output } => {
                let code = code.map_or_else(|| "signal".to_string(), |c| c.to_string());
                write!(f, "zonestat exited with status {}: {}", code, output.trim())
            }
        }
    }
}

impl std::error::Error for SourceError {}

impl From<std::io::Error> for SourceError {
    fn from(e: std::io::Error) -> Self {
        SourceError::Spawn(e)
    }
}

/// Source of raw zonestat reports.
pub trait ZonestatSource {
    /// Runs one sampling cycle and returns the raw parsable report text.
    fn sample(&self) -> Result<String, SourceError>;
}

/// Real source: invokes zonestat for one 1-second sample of per-zone
/// psets and memory usage.
#[derive(Debug, Clone)]
pub struct ZonestatCommand {
    path: String,
}

impl ZonestatCommand {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for ZonestatCommand {
    fn default() -> Self {
        Self::new(DEFAULT_ZONESTAT_PATH)
    }
}

impl ZonestatSource for ZonestatCommand {
    fn sample(&self) -> Result<String, SourceError> {
        debug!("invoking {} for one sampling interval", self.path);
        let out = Command::new(&self.path)
            .args(["-p", "-P", "zones", "-r", "psets,memory", "1", "1"])
            .output()?;

        if !out.status.success() {
            // Fold stderr into the diagnostic; zonestat writes its own
            // complaints there.
            let mut output = String::from_utf8_lossy(&out.stdout).into_owned();
            output.push_str(&String::from_utf8_lossy(&out.stderr));
            return Err(SourceError::Failed {
                code: out.status.code(),
                output,
            });
        }

        Ok(String::from_utf8_lossy(&out.stdout).into_owned())
    }
}
