//! # tarmac-prof - Instruction Trace Profiler
//!
//! tarmac-prof turns a cycle-level instruction trace from an Arm simulator or
//! ETM capture into a per-function timeline. It needs no instrumentation in
//! the profiled program: function boundaries come from the image's symbol
//! listing, and calls and returns are inferred from where the program
//! counter goes.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────┐      ┌──────────────────┐
//! │  fromelf listing │      │ instruction trace│
//! └────────┬─────────┘      └────────┬─────────┘
//!          ▼                         ▼
//! ┌──────────────────┐      ┌──────────────────┐
//! │   SymbolTable    │      │  FormatDetector  │──▶ (clock, pc, opcode)
//! └────────┬─────────┘      └────────┬─────────┘
//!          │                         ▼
//!          │                ┌──────────────────┐      ┌──────────────────┐
//!          └───────────────▶│  CallStack       │─────▶│  TimelineSink    │
//!                           │  Reconstructor   │      │ (JSON or CSV)    │
//!                           └────────┬─────────┘      └──────────────────┘
//!                                    ▼
//!                           ┌──────────────────┐
//!                           │ CoverageAggreg.  │──▶ coverage report
//!                           └──────────────────┘
//! ```
//!
//! ## Module Structure
//!
//! - [`symbols`]: Parse the `fromelf -s` listing into address regions
//! - [`trace`]: Trace grammar detection and memory-traffic classification
//! - [`profiling`]: Call-stack reconstruction, the per-line processor,
//!   cancellation and progress
//! - [`coverage`]: Executed-address tracking and the coverage report
//! - [`export`]: Chrome Trace Event JSON and statistics CSV sinks
//! - [`pipeline`]: One complete run from input paths to output files
//! - [`cli`]: Command-line argument parsing
//! - [`domain`]: Core domain types (`Address`, `SymbolId`) and errors
//!
//! ## Typical Usage
//!
//! ```bash
//! # Flame graph for Perfetto, Speedscope or chrome://tracing
//! tarmac-prof image.sym run.log trace.json
//!
//! # Per-invocation statistics plus a detailed coverage report
//! tarmac-prof image.sym run.log stats.csv --coverage-details
//! ```
//!
//! ## Key Concepts
//!
//! - **Collapse**: control reaching a function already on the call stack
//!   closes every frame above it; one rule covers returns, tail calls and
//!   loops back into a caller
//! - **Time scale**: each trace grammar counts time in its own unit; raw
//!   clocks are divided by the grammar's scale before export
//! - **T16/T32**: 2-byte and 4-byte Thumb instruction encodings

pub mod cli;
pub mod coverage;
pub mod domain;
pub mod export;
pub mod pipeline;
pub mod profiling;
pub mod symbols;
pub mod trace;
