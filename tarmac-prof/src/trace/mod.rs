//! Trace line decoding
//!
//! - [`format`]: known trace grammars, format auto-detection and decoding of
//!   instruction records into `(clock, pc, opcode)`
//! - [`classify`]: ordered pattern rules that categorize memory traffic on
//!   any trace line

pub mod classify;
pub mod format;

pub use classify::{classify_bus_access, classify_line, debug_marker, LineClass};
pub use format::{DecodedLine, FormatDetector, TraceFormat, DETECTION_WARN_THRESHOLD, TRACE_FORMATS};
