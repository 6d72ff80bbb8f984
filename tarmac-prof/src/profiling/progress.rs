// Percentages intentionally lose precision for display purposes
#![allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]

use std::io::Write;

use super::ProcessingStats;

/// Percentage progress over a trace of known length
#[derive(Debug)]
pub struct ProgressReporter {
    total: u64,
    processed: u64,
    next_percent: u64,
    enabled: bool,
}

impl ProgressReporter {
    /// `enabled = false` tracks progress without printing it
    #[must_use]
    pub fn new(total: u64, enabled: bool) -> Self {
        Self { total, processed: 0, next_percent: 0, enabled }
    }

    /// Share of the trace processed so far, in percent
    #[must_use]
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            (self.processed as f64 / self.total as f64 * 100.0).min(100.0)
        }
    }

    /// Count one processed line, redrawing the bar on each new percent
    pub fn advance(&mut self) {
        self.processed += 1;
        let percent = self.percent() as u64;
        if percent >= self.next_percent {
            if self.enabled {
                display_progress(percent);
            }
            self.next_percent = percent + 1;
        }
    }

    /// Terminate the progress bar line
    pub fn finish(&self) {
        if self.enabled {
            eprintln!();
        }
    }
}

/// Draw a `[####      ] 40%` progress bar on stderr
pub fn display_progress(percent: u64) {
    let filled = usize::try_from(percent.min(100) / 10).unwrap_or(10);
    eprint!("\r[{:<10}]{:>3}%", "#".repeat(filled), percent);
    std::io::stderr().flush().ok();
}

/// Display the end-of-run statistics
pub fn display_statistics(stats: &ProcessingStats, format: Option<&str>) {
    eprintln!(
        "stats: format={} lines={} decoded={} resolved={} invocations={} markers={}",
        format.unwrap_or("unknown"),
        stats.lines,
        stats.decoded,
        stats.resolved,
        stats.invocations,
        stats.markers,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_tracks_processed_lines() {
        let mut progress = ProgressReporter::new(4, false);
        assert_eq!(progress.percent(), 0.0);

        progress.advance();
        assert_eq!(progress.percent(), 25.0);
        progress.advance();
        progress.advance();
        progress.advance();
        assert_eq!(progress.percent(), 100.0);
    }

    #[test]
    fn test_empty_trace_is_complete() {
        assert_eq!(ProgressReporter::new(0, false).percent(), 100.0);
    }
}
