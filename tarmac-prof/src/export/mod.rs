//! Timeline export
//!
//! Completed invocations are streamed to one of two sinks, selected once from
//! the output file extension:
//! - [`ChromeTraceWriter`]: JSON array of trace events for Perfetto,
//!   Speedscope or `chrome://tracing`
//! - [`StatsCsvWriter`]: one row of per-invocation statistics per line
//!
//! Both sinks are append-only and write events in emission order, which is
//! return order rather than call order.

pub mod chrome_trace;
pub mod stats_csv;

pub use chrome_trace::ChromeTraceWriter;
pub use stats_csv::StatsCsvWriter;

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::domain::{ExportError, SetupError};
use crate::profiling::Invocation;

/// Destination for completed invocations and debug markers
pub trait TimelineSink {
    /// Write one completed invocation (times already in timeline units)
    ///
    /// # Errors
    /// Returns an error if the underlying writer fails
    fn write_invocation(&mut self, invocation: &Invocation) -> Result<(), ExportError>;

    /// Write an instantaneous debug marker at `ts`
    ///
    /// # Errors
    /// Returns an error if the underlying writer fails
    fn write_marker(&mut self, ts: f64, label: &str) -> Result<(), ExportError>;

    /// Terminate the output and flush it
    ///
    /// # Errors
    /// Returns an error if the underlying writer fails
    fn finish(&mut self) -> Result<(), ExportError>;
}

impl<T: TimelineSink + ?Sized> TimelineSink for Box<T> {
    fn write_invocation(&mut self, invocation: &Invocation) -> Result<(), ExportError> {
        (**self).write_invocation(invocation)
    }

    fn write_marker(&mut self, ts: f64, label: &str) -> Result<(), ExportError> {
        (**self).write_marker(ts, label)
    }

    fn finish(&mut self) -> Result<(), ExportError> {
        (**self).finish()
    }
}

/// Timeline output flavor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    /// Flame-graph JSON
    ChromeTrace,
    /// Per-invocation statistics table
    StatsCsv,
}

impl OutputKind {
    /// `.json` selects the flame-graph sink, anything else the statistics table
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => OutputKind::ChromeTrace,
            _ => OutputKind::StatsCsv,
        }
    }
}

/// Create the output file and wrap it in the sink its extension selects
///
/// # Errors
/// Returns [`SetupError::OutputFile`] if the file cannot be created
pub fn create_sink(path: &Path) -> Result<Box<dyn TimelineSink + Send>, SetupError> {
    let file = File::create(path)
        .map_err(|source| SetupError::OutputFile { path: path.to_path_buf(), source })?;
    let writer = BufWriter::new(file);

    Ok(match OutputKind::from_path(path) {
        OutputKind::ChromeTrace => Box::new(ChromeTraceWriter::new(writer)),
        OutputKind::StatsCsv => Box::new(StatsCsvWriter::new(writer)),
    })
}
