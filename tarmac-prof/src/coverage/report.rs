use std::io::Write;

use super::{CoverageAggregator, CoverageSummary};
use crate::domain::ExportError;
use crate::symbols::SymbolTable;

/// Column header of the coverage report
pub const COVERAGE_HEADER: &str =
    "func, size, size covered, coverage (%), inst, (t16,t32), <address/hit-count details>";

/// Placeholder for the detail column when details are off
const NO_DETAILS: &str = "..no details..";

/// Format the detail column of one summary
fn format_details(summary: &CoverageSummary) -> String {
    summary
        .details
        .iter()
        .map(|detail| match detail.jump {
            Some(gap) => format!("({}, {}) [<-jump {gap}->]", detail.address, detail.hits),
            None => format!("({}, {})", detail.address, detail.hits),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Write the coverage report
///
/// # Errors
/// Returns an error if writing to `writer` fails
pub fn write_report<W: Write>(
    coverage: &CoverageAggregator,
    symbols: &SymbolTable,
    mut writer: W,
    detailed: bool,
) -> Result<(), ExportError> {
    writeln!(writer, "{COVERAGE_HEADER}")?;

    for summary in coverage.summaries(symbols) {
        let details = if detailed { format_details(&summary) } else { NO_DETAILS.to_owned() };
        writeln!(
            writer,
            "{}, {}, {}, {:.2}, {}, ({}, {}), \"{}\"",
            summary.name,
            summary.size,
            summary.covered_bytes,
            summary.percent,
            summary.distinct_addresses,
            summary.t16,
            summary.t32,
            details,
        )?;
    }

    writer.flush()?;
    Ok(())
}
