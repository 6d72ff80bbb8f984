//! Profiling core modules
//!
//! - Call-stack reconstruction and invocation timing
//! - Per-function runtime state
//! - The per-line trace processor wiring detection, classification,
//!   reconstruction, coverage and export together
//! - Cooperative cancellation
//! - Progress display

pub mod call_stack;
pub mod cancel;
pub mod processor;
pub mod progress;
pub mod state;

// Re-export common types
pub use call_stack::{CallStackReconstructor, InstructionOutcome};
pub use cancel::CancellationToken;
pub use processor::{ProcessingStats, ProcessorOutput, TraceProcessor};
pub use progress::{display_statistics, ProgressReporter};
pub use state::{FunctionRuntimeState, InstructionCounters, Invocation};
