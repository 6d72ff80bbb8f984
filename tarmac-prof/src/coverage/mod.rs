//! # Code Coverage
//!
//! Every resolved instruction is recorded against its function: the
//! executed address with its encoded width, and a per-address hit count.
//! After the pass, each function's record is summarized:
//!
//! ```text
//! covered bytes = sum of widths over distinct executed (address, width)
//! coverage %    = covered bytes / declared size * 100
//! t16 / t32     = number of executed 16-bit / 32-bit encodings
//! ```
//!
//! In detailed mode the summary also lists `(address, hits)` in address
//! order, marking each place where execution skipped ahead further than the
//! previous instruction's width (a taken branch inside the function body).
//!
//! Functions of 8 bytes or less are veneers and trampolines; they are left
//! out of the report.

pub mod report;

pub use report::{write_report, COVERAGE_HEADER};

use log::warn;
use std::collections::{BTreeMap, BTreeSet};

use crate::domain::{Address, SymbolId};
use crate::symbols::SymbolTable;

/// Functions this small or smaller are left out of the report
pub const MIN_REPORTED_SIZE: u64 = 8;

/// Executed addresses and hit counts of one function
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoverageRecord {
    /// Declared size in bytes
    pub size: u64,
    /// Hits per executed address
    pub hit_counts: BTreeMap<Address, u64>,
    /// Distinct `(address, instruction width)` pairs
    pub executed: BTreeSet<(Address, u32)>,
}

impl CoverageRecord {
    #[must_use]
    pub fn new(size: u64) -> Self {
        Self { size, ..Self::default() }
    }

    pub fn record_hit(&mut self, pc: Address, width: u32) {
        *self.hit_counts.entry(pc).or_insert(0) += 1;
        self.executed.insert((pc, width));
    }

    #[must_use]
    pub fn is_executed(&self) -> bool {
        !self.executed.is_empty()
    }

    /// Reduce the record to its reportable figures
    #[must_use]
    pub fn summarize(&self, name: &str) -> CoverageSummary {
        let mut covered_bytes = 0;
        let mut t16 = 0;
        let mut t32 = 0;

        for &(addr, width) in &self.executed {
            match width {
                2 => t16 += 1,
                4 => t32 += 1,
                _ => {
                    warn!("{name}: unexpected instruction width {width} at {addr}");
                    continue;
                }
            }
            covered_bytes += u64::from(width);
        }

        #[allow(clippy::cast_precision_loss)] // Precision loss acceptable for percentages
        let percent = if self.size == 0 {
            0.0
        } else {
            (covered_bytes as f64 / self.size as f64 * 100.0).min(100.0)
        };

        CoverageSummary {
            name: name.to_owned(),
            size: self.size,
            covered_bytes,
            percent,
            distinct_addresses: self.hit_counts.len(),
            t16,
            t32,
            details: self.details(),
        }
    }

    /// Address-ordered hit listing with jump gaps
    fn details(&self) -> Vec<CoverageDetail> {
        let mut details = Vec::with_capacity(self.executed.len());
        let mut previous: Option<(Address, u32)> = None;

        for &(address, width) in &self.executed {
            let jump = previous.and_then(|(prev_addr, prev_width)| {
                let gap = address.0.saturating_sub(prev_addr.0);
                (gap > u64::from(prev_width)).then_some(gap)
            });
            details.push(CoverageDetail {
                address,
                hits: self.hit_counts.get(&address).copied().unwrap_or(0),
                jump,
            });
            previous = Some((address, width));
        }

        details
    }
}

/// Reportable figures of one function
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageSummary {
    pub name: String,
    pub size: u64,
    pub covered_bytes: u64,
    /// Always within `0..=100`
    pub percent: f64,
    pub distinct_addresses: usize,
    pub t16: usize,
    pub t32: usize,
    pub details: Vec<CoverageDetail>,
}

/// One executed address in the detailed listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoverageDetail {
    pub address: Address,
    pub hits: u64,
    /// Distance from the previous executed address, when larger than that
    /// instruction's width
    pub jump: Option<u64>,
}

/// Coverage records for every declared symbol, indexed by `SymbolId`
#[derive(Debug, Clone)]
pub struct CoverageAggregator {
    records: Vec<CoverageRecord>,
}

impl CoverageAggregator {
    /// One empty record per declared symbol
    #[must_use]
    pub fn new(symbols: &SymbolTable) -> Self {
        Self { records: symbols.symbols().map(|(id, _)| CoverageRecord::new(symbols.size(id))).collect() }
    }

    pub fn record_hit(&mut self, id: SymbolId, pc: Address, width: u32) {
        self.records[id.index()].record_hit(pc, width);
    }

    #[must_use]
    pub fn record(&self, id: SymbolId) -> &CoverageRecord {
        &self.records[id.index()]
    }

    /// Summaries of executed functions larger than [`MIN_REPORTED_SIZE`],
    /// in symbol-load order
    #[must_use]
    pub fn summaries(&self, symbols: &SymbolTable) -> Vec<CoverageSummary> {
        symbols
            .symbols()
            .filter_map(|(id, name)| {
                let record = self.record(id);
                (record.is_executed() && record.size > MIN_REPORTED_SIZE)
                    .then(|| record.summarize(name))
            })
            .collect()
    }
}
