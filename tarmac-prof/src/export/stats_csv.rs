use std::io::Write;

use super::TimelineSink;
use crate::domain::ExportError;
use crate::profiling::Invocation;

/// Column header of the statistics table
pub const STATS_HEADER: &str = "function, start time, duration, instructions count, DTCM LD, DTCM ST, \
Vec LD count, Vec ST count, Sc LD count, Sc ST count, I Fetch Count, IO Read, IO Write";

/// Streams one statistics row per completed invocation
///
/// Debug markers become `//  <- label -> //` comment lines between rows.
pub struct StatsCsvWriter<W: Write> {
    writer: W,
    started: bool,
    row_count: usize,
}

impl<W: Write> StatsCsvWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, started: false, row_count: 0 }
    }

    /// Number of invocation rows written
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn ensure_started(&mut self) -> Result<(), ExportError> {
        if !self.started {
            writeln!(self.writer, "{STATS_HEADER}")?;
            self.started = true;
        }
        Ok(())
    }
}

impl<W: Write> TimelineSink for StatsCsvWriter<W> {
    fn write_invocation(&mut self, invocation: &Invocation) -> Result<(), ExportError> {
        self.ensure_started()?;
        let c = &invocation.counters;
        writeln!(
            self.writer,
            "{}, {:.6}, {:.6}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}",
            invocation.name,
            invocation.start,
            invocation.duration,
            c.instructions,
            c.loads,
            c.stores,
            c.vector_loads,
            c.vector_stores,
            c.scalar_loads,
            c.scalar_stores,
            c.instruction_fetches,
            c.io_reads,
            c.io_writes,
        )?;
        self.row_count += 1;
        Ok(())
    }

    fn write_marker(&mut self, _ts: f64, label: &str) -> Result<(), ExportError> {
        self.ensure_started()?;
        writeln!(self.writer, "//  <- {label} -> //")?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), ExportError> {
        self.ensure_started()?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiling::InstructionCounters;

    fn output(writer: StatsCsvWriter<Vec<u8>>) -> String {
        String::from_utf8(writer.into_inner()).unwrap()
    }

    #[test]
    fn test_header_has_thirteen_columns() {
        assert_eq!(STATS_HEADER.split(", ").count(), 13);
    }

    #[test]
    fn test_row_contains_all_counters() {
        let mut writer = StatsCsvWriter::new(Vec::new());
        let counters = InstructionCounters {
            instructions: 12,
            loads: 1,
            stores: 2,
            vector_loads: 3,
            vector_stores: 4,
            scalar_loads: 5,
            scalar_stores: 6,
            instruction_fetches: 7,
            io_reads: 8,
            io_writes: 9,
        };
        writer
            .write_invocation(&Invocation {
                name: "arm_add_q7".to_string(),
                start: 1.0,
                duration: 0.5,
                counters,
            })
            .unwrap();
        writer.finish().unwrap();
        assert_eq!(writer.row_count(), 1);

        let text = output(writer);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], STATS_HEADER);
        assert_eq!(lines[1], "arm_add_q7, 1.000000, 0.500000, 12, 1, 2, 3, 4, 5, 6, 7, 8, 9");
    }

    #[test]
    fn test_marker_comment_line() {
        let mut writer = StatsCsvWriter::new(Vec::new());
        writer.write_marker(0.0, "DBG layer 2").unwrap();
        writer.finish().unwrap();

        let text = output(writer);
        assert_eq!(text.lines().nth(1), Some("//  <- DBG layer 2 -> //"));
    }

    #[test]
    fn test_empty_table_still_has_header() {
        let mut writer = StatsCsvWriter::new(Vec::new());
        writer.finish().unwrap();
        assert_eq!(output(writer), format!("{STATS_HEADER}\n"));
    }
}
