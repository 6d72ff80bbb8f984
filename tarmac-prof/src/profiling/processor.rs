//! # Trace Processing
//!
//! Consumes trace lines one at a time and routes them through the pipeline:
//!
//! ```text
//! line ─▶ FormatDetector ─▶ (clock, pc, opcode) ─▶ CallStackReconstructor ─▶ TimelineSink
//!   │                              │                         │
//!   │                              └─ DBG marker ─▶ sink     └─▶ CoverageAggregator
//!   └─▶ classify_line / classify_bus_access ─▶ active function counters
//! ```
//!
//! Lines that fail to decode are not errors: before detection they feed the
//! detector, afterwards they are only classified.

use super::call_stack::CallStackReconstructor;
use super::state::Invocation;
use crate::coverage::CoverageAggregator;
use crate::domain::ExportError;
use crate::export::TimelineSink;
use crate::symbols::SymbolTable;
use crate::trace::{classify_bus_access, classify_line, debug_marker, DecodedLine, FormatDetector};

/// Counters over one trace pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessingStats {
    /// Lines consumed
    pub lines: u64,
    /// Lines decoded as instruction records
    pub decoded: u64,
    /// Instruction records that resolved to a function
    pub resolved: u64,
    /// Completed invocations written to the sink
    pub invocations: u64,
    /// Debug markers written to the sink
    pub markers: u64,
}

/// Everything left over once the pass is finished
pub struct ProcessorOutput<S> {
    pub sink: S,
    pub coverage: CoverageAggregator,
    pub stats: ProcessingStats,
    /// Label of the detected trace format
    pub format: Option<&'static str>,
}

/// Encapsulates the per-line pipeline and its state
pub struct TraceProcessor<'a, S: TimelineSink> {
    detector: FormatDetector,
    reconstructor: CallStackReconstructor<'a>,
    coverage: CoverageAggregator,
    sink: S,
    pub stats: ProcessingStats,
    /// Raw clock of the last decoded instruction
    last_clock: f64,
}

impl<'a, S: TimelineSink> TraceProcessor<'a, S> {
    #[must_use]
    pub fn new(symbols: &'a SymbolTable, sink: S) -> Self {
        Self {
            detector: FormatDetector::new(),
            reconstructor: CallStackReconstructor::new(symbols),
            coverage: CoverageAggregator::new(symbols),
            sink,
            stats: ProcessingStats::default(),
            last_clock: 0.0,
        }
    }

    #[must_use]
    pub fn detector(&self) -> &FormatDetector {
        &self.detector
    }

    #[must_use]
    pub fn reconstructor(&self) -> &CallStackReconstructor<'a> {
        &self.reconstructor
    }

    #[must_use]
    pub fn coverage(&self) -> &CoverageAggregator {
        &self.coverage
    }

    /// Process a single trace line
    ///
    /// # Errors
    /// Returns an error only if writing to the sink fails
    pub fn process_line(&mut self, line: &str) -> Result<(), ExportError> {
        self.stats.lines += 1;

        if let Some(decoded) = self.detector.decode(line) {
            self.handle_instruction(&decoded, line)?;
        }

        if let Some(class) = classify_line(line) {
            self.reconstructor.record_class(class);
        }
        if let Some(class) = classify_bus_access(line) {
            self.reconstructor.record_class(class);
        }

        Ok(())
    }

    /// Finalize the sink and hand back the accumulated results
    ///
    /// With `flush_open_frames`, frames still on the call stack are closed at
    /// the last decoded clock; otherwise they produce no event.
    ///
    /// # Errors
    /// Returns an error if writing to the sink fails
    pub fn finish(mut self, flush_open_frames: bool) -> Result<ProcessorOutput<S>, ExportError> {
        if flush_open_frames {
            let open = self.reconstructor.flush_open_frames(self.last_clock);
            self.emit(&open)?;
        }
        self.sink.finish()?;

        Ok(ProcessorOutput {
            sink: self.sink,
            coverage: self.coverage,
            stats: self.stats,
            format: self.detector.active().map(|format| format.label),
        })
    }

    fn handle_instruction(&mut self, decoded: &DecodedLine, line: &str) -> Result<(), ExportError> {
        self.stats.decoded += 1;
        self.last_clock = decoded.clock;

        if let Some(label) = debug_marker(line) {
            self.sink.write_marker(decoded.clock / self.detector.time_scale(), &label)?;
            self.stats.markers += 1;
        }

        let Some(outcome) = self.reconstructor.record_instruction(decoded, line) else {
            return Ok(());
        };
        self.stats.resolved += 1;
        self.coverage.record_hit(outcome.symbol, outcome.pc, decoded.instruction_width());

        self.emit(&outcome.completed)
    }

    fn emit(&mut self, completed: &[Invocation]) -> Result<(), ExportError> {
        let time_scale = self.detector.time_scale();
        for invocation in completed {
            self.sink.write_invocation(&invocation.scaled(time_scale))?;
            self.stats.invocations += 1;
        }
        Ok(())
    }
}
