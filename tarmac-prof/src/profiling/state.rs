//! Per-function running state

use crate::trace::LineClass;

/// Counters accumulated for the current invocation of a function
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstructionCounters {
    pub instructions: u64,
    /// Pipeline load stage
    pub loads: u64,
    /// Pipeline store stage
    pub stores: u64,
    pub vector_loads: u64,
    pub vector_stores: u64,
    /// Scalar loads, including pops
    pub scalar_loads: u64,
    /// Scalar stores, including pushes
    pub scalar_stores: u64,
    pub instruction_fetches: u64,
    pub io_reads: u64,
    pub io_writes: u64,
}

impl InstructionCounters {
    /// Count one classified trace line
    pub fn record(&mut self, class: LineClass) {
        let counter = match class {
            LineClass::MemoryLoad => &mut self.loads,
            LineClass::MemoryStore => &mut self.stores,
            LineClass::VectorLoad => &mut self.vector_loads,
            LineClass::VectorStore => &mut self.vector_stores,
            LineClass::StackPop | LineClass::ScalarLoad => &mut self.scalar_loads,
            LineClass::StackPush | LineClass::ScalarStore => &mut self.scalar_stores,
            LineClass::IoRead => &mut self.io_reads,
            LineClass::IoWrite => &mut self.io_writes,
        };
        *counter += 1;
    }
}

/// Running state of one function, shared by all of its invocations
///
/// An `entry_clock` of zero means the function is not being timed: either it
/// was never entered at offset 0, or its current invocation was already
/// reported.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FunctionRuntimeState {
    pub entry_clock: f64,
    pub counters: InstructionCounters,
}

impl FunctionRuntimeState {
    /// Start a fresh invocation at `clock`
    pub fn enter(&mut self, clock: f64) {
        self.entry_clock = clock;
        self.counters = InstructionCounters::default();
    }

    #[must_use]
    pub fn is_timed(&self) -> bool {
        self.entry_clock != 0.0
    }
}

/// One completed invocation, in raw clock units
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub name: String,
    pub start: f64,
    pub duration: f64,
    pub counters: InstructionCounters,
}

impl Invocation {
    /// Convert start and duration to timeline units
    #[must_use]
    pub fn scaled(&self, time_scale: f64) -> Self {
        Self {
            start: self.start / time_scale,
            duration: self.duration / time_scale,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stack_traffic_counts_as_scalar() {
        let mut counters = InstructionCounters::default();
        counters.record(LineClass::StackPop);
        counters.record(LineClass::ScalarLoad);
        counters.record(LineClass::StackPush);

        assert_eq!(counters.scalar_loads, 2);
        assert_eq!(counters.scalar_stores, 1);
        assert_eq!(counters.loads, 0);
    }

    #[test]
    fn test_enter_resets_counters() {
        let mut state = FunctionRuntimeState::default();
        state.counters.record(LineClass::IoRead);
        state.counters.instructions = 7;

        state.enter(42.0);

        assert_eq!(state.entry_clock, 42.0);
        assert_eq!(state.counters, InstructionCounters::default());
        assert!(state.is_timed());
    }

    #[test]
    fn test_scaled_invocation() {
        let invocation = Invocation {
            name: "f".to_string(),
            start: 20_000.0,
            duration: 50_000.0,
            counters: InstructionCounters::default(),
        };
        let scaled = invocation.scaled(10_000.0);

        assert_eq!(scaled.start, 2.0);
        assert_eq!(scaled.duration, 5.0);
        assert_eq!(scaled.name, "f");
    }
}
