//! Memory-traffic classification for trace lines.
//!
//! Pipeline and bus models interleave instruction records with lines that
//! describe the memory accesses those instructions perform. This module maps
//! such lines to a [`LineClass`] so the active function's counters can be
//! updated.
//!
//! # Classification Strategy
//!
//! 1. **Pipeline memory stage** - `LD ...` / `ST ...` at the start of a line
//! 2. **Vector beats** - `cc--` beat marker followed by `VLD` / `VST`
//! 3. **Stack traffic** - `: POP` / `: PUSH` (counted as scalar load/store)
//! 4. **Scalar access** - `: LD...` / `: ST...` (including `VLDR`/`VSTR`)
//!
//! Rules are tried in this order and the first match wins. Bus records
//! (`MR4`/`MW4`) are checked separately by [`classify_bus_access`].

use regex::Regex;
use std::sync::OnceLock;

/// Category of a classified trace line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineClass {
    /// Pipeline load stage
    MemoryLoad,
    /// Pipeline store stage
    MemoryStore,
    VectorLoad,
    VectorStore,
    /// Stack pop, counted as a scalar load
    StackPop,
    /// Stack push, counted as a scalar store
    StackPush,
    ScalarLoad,
    ScalarStore,
    /// 32-bit bus read
    IoRead,
    /// 32-bit bus write
    IoWrite,
}

// =============================================================================
// CLASSIFICATION TABLES
// =============================================================================

/// Ordered memory-traffic rules, first match wins
const LINE_RULES: &[(LineClass, &str)] = &[
    (LineClass::MemoryLoad, r"^\s+LD\s+"),
    (LineClass::MemoryStore, r"^\s+ST\s+"),
    (LineClass::VectorLoad, r"cc--.*VLD"),
    (LineClass::VectorStore, r"cc--.*VST"),
    (LineClass::StackPop, r":\s+V?POP"),
    (LineClass::StackPush, r":\s+V?PUSH"),
    (LineClass::ScalarLoad, r":\s+V?LD"),
    (LineClass::ScalarStore, r":\s+V?ST"),
];

/// Bus access records: `<time> clk|ps MR4|MW4 <addr> <value>`
const BUS_RULES: &[(LineClass, &str)] = &[
    (LineClass::IoRead, r"[0-9]+\s+(clk|ps)\s+MR4\s+[0-9a-fA-F]+\s+[0-9a-fA-F]+"),
    (LineClass::IoWrite, r"[0-9]+\s+(clk|ps)\s+MW4\s+[0-9a-fA-F]+\s+[0-9a-fA-F]+"),
];

/// Debug markers are tagged with this text in the trace
const DEBUG_MARKER_TAG: &str = "DBG";

/// Number of trailing tokens that form a debug marker's label
const DEBUG_MARKER_TOKENS: usize = 3;

// =============================================================================
// CLASSIFIERS
// =============================================================================

fn compile(rules: &[(LineClass, &str)]) -> Vec<(LineClass, Regex)> {
    rules
        .iter()
        .map(|&(class, pattern)| (class, Regex::new(pattern).unwrap()))
        .collect()
}

fn first_match(rules: &[(LineClass, Regex)], line: &str) -> Option<LineClass> {
    rules.iter().find(|(_, regex)| regex.is_match(line)).map(|(class, _)| *class)
}

/// Classify a line against the ordered memory-traffic rules.
///
/// # Examples
///
/// ```
/// use tarmac_prof::trace::{classify_line, LineClass};
///
/// assert_eq!(classify_line("  LD   0x20000000"), Some(LineClass::MemoryLoad));
/// assert_eq!(classify_line("... T thread : POP {r4,pc}"), Some(LineClass::StackPop));
/// assert_eq!(classify_line("... T thread : ADDS r0,r0,#1"), None);
/// ```
#[must_use]
pub fn classify_line(line: &str) -> Option<LineClass> {
    let rules = LINE_MATCHERS.get_or_init(|| compile(LINE_RULES));
    first_match(rules, line)
}

/// Classify a bus-level memory record (`MR4` read, `MW4` write)
#[must_use]
pub fn classify_bus_access(line: &str) -> Option<LineClass> {
    let rules = BUS_MATCHERS.get_or_init(|| compile(BUS_RULES));
    first_match(rules, line)
}

/// Extract the label of a debug marker line
///
/// Returns the last three whitespace-separated tokens of a line tagged `DBG`.
#[must_use]
pub fn debug_marker(line: &str) -> Option<String> {
    if !line.contains(DEBUG_MARKER_TAG) {
        return None;
    }

    let tokens: Vec<&str> = line.split_whitespace().collect();
    let start = tokens.len().saturating_sub(DEBUG_MARKER_TOKENS);
    Some(tokens[start..].join(" "))
}

static LINE_MATCHERS: OnceLock<Vec<(LineClass, Regex)>> = OnceLock::new();
static BUS_MATCHERS: OnceLock<Vec<(LineClass, Regex)>> = OnceLock::new();
