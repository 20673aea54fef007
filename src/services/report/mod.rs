//! Report sink for pipeline events.
//!
//! Every create/delete/move/rename/error is recorded as one human-readable line
//! prefixed with `(+)` (success), `(!)` (recoverable problem) or `(-)` (failure).
//! Components receive the sink as `&mut dyn Report`; nothing writes to a global log path.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::types::errors::{PipelineError, PipelineResult};

/// Outcome class of a recorded event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Success,
    Notice,
    Failure,
}

impl Marker {
    pub fn symbol(self) -> char {
        match self {
            Marker::Success => '+',
            Marker::Notice => '!',
            Marker::Failure => '-',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEvent {
    pub marker: Marker,
    pub message: String,
}

impl ReportEvent {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            marker: Marker::Success,
            message: message.into(),
        }
    }

    pub fn notice(message: impl Into<String>) -> Self {
        Self {
            marker: Marker::Notice,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            marker: Marker::Failure,
            message: message.into(),
        }
    }
}

impl fmt::Display for ReportEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}) {}", self.marker.symbol(), self.message)
    }
}

/// Append-only event sink.
pub trait Report {
    fn record(&mut self, event: ReportEvent);

    /// Where the events end up, if they are persisted anywhere.
    fn location(&self) -> Option<&Path> {
        None
    }
}

/// Writes one line per event to a log file and mirrors it to the `log` facade.
pub struct LogFileReport {
    path: PathBuf,
    file: File,
}

impl LogFileReport {
    /// Create (or append to) the log file at `path`.
    pub fn create(path: &Path) -> PipelineResult<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| PipelineError::from_io(path, e))?;

        let mut report = Self {
            path: path.to_path_buf(),
            file,
        };
        report.record(ReportEvent::success(format!(
            "Log file '{}' created successfully",
            path.display()
        )));
        Ok(report)
    }

    /// Build the default `Log <timestamp>.log` file name inside `dir`.
    pub fn default_path(dir: &Path, run_timestamp: &str) -> PathBuf {
        dir.join(format!("Log {run_timestamp}.log"))
    }
}

impl Report for LogFileReport {
    fn record(&mut self, event: ReportEvent) {
        match event.marker {
            Marker::Success => log::info!("{}", event.message),
            Marker::Notice => log::warn!("{}", event.message),
            Marker::Failure => log::error!("{}", event.message),
        }

        if let Err(e) = writeln!(self.file, "{event}") {
            log::error!("Failed to write to log file {}: {e}", self.path.display());
        }
    }

    fn location(&self) -> Option<&Path> {
        Some(&self.path)
    }
}

/// Keeps events in memory. Used by tests and by callers that render their own output.
#[derive(Debug, Default)]
pub struct MemoryReport {
    pub events: Vec<ReportEvent>,
}

impl MemoryReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failures(&self) -> Vec<&ReportEvent> {
        self.with_marker(Marker::Failure)
    }

    pub fn notices(&self) -> Vec<&ReportEvent> {
        self.with_marker(Marker::Notice)
    }

    fn with_marker(&self, marker: Marker) -> Vec<&ReportEvent> {
        self.events.iter().filter(|e| e.marker == marker).collect()
    }

    pub fn lines(&self) -> Vec<String> {
        self.events.iter().map(|e| e.to_string()).collect()
    }
}

impl Report for MemoryReport {
    fn record(&mut self, event: ReportEvent) {
        log::debug!("{event}");
        self.events.push(event);
    }
}

#[cfg(test)]
#[path = "tests/report_tests.rs"]
mod tests;
