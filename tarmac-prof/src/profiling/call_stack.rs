//! # Call-Stack Reconstruction
//!
//! Instruction traces carry no explicit call or return records. The
//! reconstructor infers them from which function each program counter falls
//! into:
//!
//! - **Entry**: a PC within the first two bytes of a function starts a fresh
//!   invocation (entry clock set, counters zeroed).
//! - **Call**: control moves to a function that is not on the stack; it is
//!   pushed as a deeper frame.
//! - **Collapse**: control moves to a function that is already on the stack.
//!   Frames are popped from the top down to and including that function, and
//!   every popped frame above it is reported as a completed invocation. The
//!   function is then pushed back on top.
//!
//! ```text
//! stack: [main, conv, mac]      PC lands in main
//!  pop mac  -> emit mac  (clock - mac.entry)
//!  pop conv -> emit conv (clock - conv.entry)
//!  pop main -> match, stop
//! stack: [main]
//! ```
//!
//! Collapsing to any depth covers returns, tail calls and loops back into a
//! caller with one rule. A frame whose entry clock is already zero was
//! reported before and is popped without emitting a second event.

use log::{debug, log_enabled, Level};

use super::state::{FunctionRuntimeState, Invocation};
use crate::domain::{Address, SymbolId};
use crate::symbols::SymbolTable;
use crate::trace::{DecodedLine, LineClass};

/// Offsets below this from a function's base count as its entry point
const ENTRY_WINDOW: u64 = 2;

/// Second beat of a dual-beat instruction, not counted as a new instruction
const SECOND_BEAT_TAG: &str = "[--cc]";

/// Result of feeding one instruction record to the reconstructor
#[derive(Debug, Clone, PartialEq)]
pub struct InstructionOutcome {
    /// Function the PC resolved to
    pub symbol: SymbolId,
    /// PC with the state bit cleared
    pub pc: Address,
    /// Invocations closed by this instruction, innermost first
    pub completed: Vec<Invocation>,
}

/// Owns the call stack and every function's running state
pub struct CallStackReconstructor<'a> {
    symbols: &'a SymbolTable,
    states: Vec<FunctionRuntimeState>,
    /// Open frames, oldest at the bottom
    stack: Vec<SymbolId>,
    /// Function of the last resolved instruction
    active: Option<SymbolId>,
    /// Region index of the last resolved instruction, checked first on lookup
    last_region: Option<usize>,
    prev_pc: Address,
}

impl<'a> CallStackReconstructor<'a> {
    /// Create a reconstructor with one zeroed state per declared symbol
    #[must_use]
    pub fn new(symbols: &'a SymbolTable) -> Self {
        Self {
            symbols,
            states: vec![FunctionRuntimeState::default(); symbols.len()],
            stack: Vec::new(),
            active: None,
            last_region: None,
            prev_pc: Address::default(),
        }
    }

    /// Function of the most recently resolved instruction
    #[must_use]
    pub fn active(&self) -> Option<SymbolId> {
        self.active
    }

    /// Open frames, oldest first
    #[must_use]
    pub fn stack(&self) -> &[SymbolId] {
        &self.stack
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    #[must_use]
    pub fn state(&self, id: SymbolId) -> &FunctionRuntimeState {
        &self.states[id.index()]
    }

    /// Process one decoded instruction record
    ///
    /// `raw_line` is the full trace line, used to recognize second beats.
    /// Returns `None` if the PC is outside every (non-discarded) function, in
    /// which case the call stack is left untouched.
    pub fn record_instruction(
        &mut self,
        line: &DecodedLine,
        raw_line: &str,
    ) -> Option<InstructionOutcome> {
        let symbols = self.symbols;
        let (region_idx, region) = symbols.resolve(line.pc, self.last_region)?;
        self.last_region = Some(region_idx);

        let id = region.id;
        let pc = line.pc.aligned();
        let state = &mut self.states[id.index()];

        if region.offset(pc) < ENTRY_WINDOW {
            state.enter(line.clock);
        }

        if !raw_line.contains(SECOND_BEAT_TAG) {
            state.counters.instructions += 1;
        }

        // Two T16 instructions in one 32-bit fetch group share a single fetch
        if pc.fetch_group() != self.prev_pc.fetch_group() {
            state.counters.instruction_fetches += 1;
        }

        let completed = if self.active == Some(id) {
            Vec::new()
        } else {
            debug!("% {} %", region.name);
            self.transfer_to(id, line.clock)
        };

        self.prev_pc = pc;
        self.active = Some(id);

        Some(InstructionOutcome { symbol: id, pc, completed })
    }

    /// Count a classified memory-traffic line against the active function
    pub fn record_class(&mut self, class: LineClass) {
        if let Some(id) = self.active {
            self.states[id.index()].counters.record(class);
        }
    }

    /// Close every frame still open, innermost first
    ///
    /// Frames that are not being timed are dropped without an event.
    pub fn flush_open_frames(&mut self, clock: f64) -> Vec<Invocation> {
        let mut completed = Vec::new();
        while let Some(top) = self.stack.pop() {
            if let Some(invocation) = self.close(top, clock) {
                completed.push(invocation);
            }
        }
        self.active = None;
        completed
    }

    /// Control moved into `id`: collapse to it if it is already on the stack,
    /// then push it on top
    fn transfer_to(&mut self, id: SymbolId, clock: f64) -> Vec<Invocation> {
        let mut completed = Vec::new();

        if self.stack.contains(&id) {
            while let Some(top) = self.stack.pop() {
                if top == id {
                    break;
                }
                debug!("{} is returning", self.symbols.name(top));
                if let Some(invocation) = self.close(top, clock) {
                    completed.push(invocation);
                }
            }
        }

        self.stack.push(id);

        if log_enabled!(Level::Debug) {
            let names: Vec<&str> = self.stack.iter().map(|&s| self.symbols.name(s)).collect();
            debug!("stack: {names:?}");
        }

        completed
    }

    /// Report the current invocation of `id` as finished at `clock`
    fn close(&mut self, id: SymbolId, clock: f64) -> Option<Invocation> {
        let state = &mut self.states[id.index()];
        if !state.is_timed() {
            return None;
        }

        let invocation = Invocation {
            name: self.symbols.name(id).to_owned(),
            start: state.entry_clock,
            duration: (clock - state.entry_clock).max(0.0),
            counters: state.counters,
        };
        state.entry_clock = 0.0;
        Some(invocation)
    }
}
