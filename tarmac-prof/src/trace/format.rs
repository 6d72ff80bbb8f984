//! Trace grammar detection
//!
//! Different trace producers emit structurally different lines and count
//! time in different units. The detector tries every known grammar on each
//! line until one matches, then locks that grammar in for the rest of the run.
//!
//! ```text
//! MDK ETM : "0000012F","1234567",X : 0x00000100,...,"B510"
//! IpssFVP : 10000 ps cpu0 IT (1) 00000100 b510 T thread : PUSH {r4,lr}
//! ```

use log::{info, warn};
use regex::Regex;
use std::sync::OnceLock;

use crate::domain::Address;

/// Consecutive unmatched lines after which the detector reports the format
/// as unrecognized (it keeps trying afterwards)
pub const DETECTION_WARN_THRESHOLD: usize = 100;

/// A known trace-line grammar
#[derive(Debug)]
pub struct TraceFormat {
    pub label: &'static str,
    /// Raw clock values are divided by this to get timeline units
    pub time_scale: f64,
    pattern: &'static str,
    regex: OnceLock<Regex>,
}

impl TraceFormat {
    const fn new(label: &'static str, time_scale: f64, pattern: &'static str) -> Self {
        Self { label, time_scale, pattern, regex: OnceLock::new() }
    }

    fn regex(&self) -> &Regex {
        self.regex.get_or_init(|| Regex::new(self.pattern).unwrap())
    }

    /// Check whether a line is an instruction record of this grammar
    #[must_use]
    pub fn matches(&self, line: &str) -> bool {
        self.regex().is_match(line)
    }

    /// Decode an instruction record
    ///
    /// Returns `None` if the line does not match this grammar or if the clock
    /// or program counter fields do not parse.
    #[must_use]
    pub fn decode(&self, line: &str) -> Option<DecodedLine> {
        let caps = self.regex().captures(line)?;
        let clock = caps.get(1)?.as_str().trim().parse::<f64>().ok()?;
        let pc = u64::from_str_radix(caps.get(2)?.as_str(), 16).ok()?;
        let opcode = caps.get(3)?.as_str().to_owned();

        Some(DecodedLine { clock, pc: Address(pc), opcode })
    }
}

/// Known grammars in detection priority order
pub static TRACE_FORMATS: [TraceFormat; 2] = [
    TraceFormat::new(
        "MDK ETM",
        1.0 / 10_000_000.0,
        r#"^"[0-9a-fA-F]+","(.*)",X : 0x([0-9a-fA-F]+),.*,"(.*)""#,
    ),
    TraceFormat::new(
        "IpssFVP",
        10_000.0,
        r"^([0-9]+)\s+ps.*IT\s+\(.*\)\s+([0-9a-fA-F]+)\s+([0-9a-fA-F]+)\s+T\s+(thread|hdlr).*\s+(.*)",
    ),
];

/// One instruction record
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedLine {
    /// Raw clock in the producer's time unit
    pub clock: f64,
    pub pc: Address,
    /// Opcode field as hex text
    pub opcode: String,
}

impl DecodedLine {
    /// Encoded instruction size in bytes (two hex digits per byte)
    #[must_use]
    pub fn instruction_width(&self) -> u32 {
        u32::try_from(self.opcode.len() / 2).unwrap_or(u32::MAX)
    }
}

/// Picks the trace grammar from the first recognizable line
#[derive(Debug, Default)]
pub struct FormatDetector {
    active: Option<&'static TraceFormat>,
    unmatched: usize,
    warnings: usize,
}

impl FormatDetector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The locked-in grammar, if any line has matched yet
    #[must_use]
    pub fn active(&self) -> Option<&'static TraceFormat> {
        self.active
    }

    /// Lines rejected by every grammar before detection succeeded
    #[must_use]
    pub fn unmatched_lines(&self) -> usize {
        self.unmatched
    }

    /// Unrecognized-format warnings issued so far (at most one per run)
    #[must_use]
    pub fn detection_warnings(&self) -> usize {
        self.warnings
    }

    /// Divisor for the active grammar, or 1000 before detection
    #[must_use]
    pub fn time_scale(&self) -> f64 {
        self.active.map_or(1000.0, |format| format.time_scale)
    }

    /// Try every known grammar against `line`, locking in the first match
    fn detect(&mut self, line: &str) -> Option<&'static TraceFormat> {
        if let Some(format) = TRACE_FORMATS.iter().find(|format| format.matches(line)) {
            info!("Found trace format {} (time scale {})", format.label, format.time_scale);
            self.active = Some(format);
            return Some(format);
        }

        self.unmatched += 1;
        if self.unmatched >= DETECTION_WARN_THRESHOLD && self.warnings == 0 {
            self.warnings += 1;
            warn!(
                "Unknown trace format after {DETECTION_WARN_THRESHOLD} lines; still looking for a known grammar"
            );
        }
        None
    }

    /// Decode a line as an instruction record of the active grammar
    ///
    /// Before a grammar is locked in, the line is first used for detection;
    /// the line that triggers detection is decoded as well.
    pub fn decode(&mut self, line: &str) -> Option<DecodedLine> {
        let format = match self.active {
            Some(format) => format,
            None => self.detect(line)?,
        };
        format.decode(line)
    }
}
