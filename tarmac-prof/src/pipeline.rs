//! End-to-end run: load symbols, stream the trace through the processor,
//! finalize the timeline and write the coverage report.

use anyhow::{Context, Result};
use log::info;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::coverage::write_report;
use crate::domain::SetupError;
use crate::export::{create_sink, TimelineSink};
use crate::profiling::{
    display_statistics, CancellationToken, ProcessingStats, ProgressReporter, TraceProcessor,
};
use crate::symbols::{load_symbol_file, SymbolTable};

/// Everything a run needs, independent of how it was configured
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub symbols: PathBuf,
    pub trace: PathBuf,
    pub output: PathBuf,
    pub coverage: PathBuf,
    pub coverage_details: bool,
    pub flush_open_frames: bool,
    pub quiet: bool,
}

/// Outcome of a run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub stats: ProcessingStats,
    /// Label of the detected trace format
    pub format: Option<&'static str>,
    /// The run was cancelled before the end of the trace
    pub interrupted: bool,
    /// Share of trace lines processed
    pub percent: f64,
}

fn open_trace(path: &Path) -> Result<BufReader<File>, SetupError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| SetupError::TraceFile { path: path.to_path_buf(), source })
}

/// Count the lines of the trace, for percentage progress
///
/// # Errors
/// Returns [`SetupError::TraceFile`] if the trace cannot be read
pub fn count_lines(path: &Path) -> Result<u64, SetupError> {
    let mut count = 0;
    for line in open_trace(path)?.split(b'\n') {
        line.map_err(|source| SetupError::TraceFile { path: path.to_path_buf(), source })?;
        count += 1;
    }
    Ok(count)
}

/// Run the whole profiling pass
///
/// Input and output files are all opened before the first trace line is
/// processed, so a [`SetupError`] leaves no partial timeline behind it. When
/// `cancel` fires the pass stops at the next line; the timeline is still
/// terminated and the coverage report still written.
///
/// # Errors
/// Returns a [`SetupError`] if a file cannot be opened or created, or an
/// export error if writing the timeline or the report fails
pub fn run(config: &RunConfig, cancel: &CancellationToken) -> Result<RunSummary> {
    let symbols = load_symbol_file(&config.symbols)?;
    let total = count_lines(&config.trace)?;
    let trace = open_trace(&config.trace)?;
    let sink = create_sink(&config.output)?;
    let coverage_file = File::create(&config.coverage)
        .map_err(|source| SetupError::CoverageFile { path: config.coverage.clone(), source })?;

    run_pass(config, &symbols, trace, total, sink, BufWriter::new(coverage_file), cancel)
}

/// Stream `trace` through the processor into `sink`, then write the coverage
/// report to `report`
fn run_pass<R: BufRead, S: TimelineSink, W: Write>(
    config: &RunConfig,
    symbols: &SymbolTable,
    trace: R,
    total: u64,
    sink: S,
    report: W,
    cancel: &CancellationToken,
) -> Result<RunSummary> {
    info!("Processing {total} trace lines");

    let mut processor = TraceProcessor::new(symbols, sink);
    let mut progress = ProgressReporter::new(total, !config.quiet);
    let mut interrupted = false;

    for line in trace.split(b'\n') {
        if cancel.is_cancelled() {
            interrupted = true;
            break;
        }

        let bytes = line
            .with_context(|| format!("Failed to read trace file {}", config.trace.display()))?;
        let line = String::from_utf8_lossy(&bytes);
        processor
            .process_line(line.trim_end_matches('\r'))
            .with_context(|| format!("Failed to write {}", config.output.display()))?;
        progress.advance();
    }
    progress.finish();

    let percent = progress.percent();
    if interrupted {
        eprintln!("Abort after {percent:.1} %");
    }

    let output = processor
        .finish(config.flush_open_frames)
        .with_context(|| format!("Failed to finalize {}", config.output.display()))?;

    write_report(&output.coverage, symbols, report, config.coverage_details)
        .with_context(|| format!("Failed to write coverage report {}", config.coverage.display()))?;

    if !config.quiet {
        display_statistics(&output.stats, output.format);
    }
    info!(
        "Run finished: {} lines, {} invocations, {} markers",
        output.stats.lines, output.stats.invocations, output.stats.markers
    );

    Ok(RunSummary { stats: output.stats, format: output.format, interrupted, percent })
}
