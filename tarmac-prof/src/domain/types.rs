//! Domain types providing compile-time safety and self-documentation
//!
//! These newtype wrappers keep program counters, symbol slots and plain
//! integers apart in function signatures.

use std::fmt;

/// Instruction address as seen in a trace or symbol listing
///
/// Bit 0 carries the Thumb/ARM state flag on Cortex targets and never takes
/// part in range comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address(pub u64);

impl Address {
    /// Address with the instruction-set state bit cleared
    #[must_use]
    pub fn aligned(self) -> Self {
        Address(self.0 & !1)
    }

    /// Start of the 4-byte fetch group this address belongs to
    #[must_use]
    pub fn fetch_group(self) -> u64 {
        self.0 & !3
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Index of a distinct symbol name in the loaded symbol table
///
/// Every per-function record (runtime counters, coverage) is stored in a
/// vector indexed by this id, so two regions declaring the same name share
/// one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub usize);

impl SymbolId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_aligned_clears_state_bit() {
        assert_eq!(Address(0x1001).aligned(), Address(0x1000));
        assert_eq!(Address(0x1000).aligned(), Address(0x1000));
    }

    #[test]
    fn test_address_fetch_group() {
        assert_eq!(Address(0x1002).fetch_group(), 0x1000);
        assert_eq!(Address(0x1004).fetch_group(), 0x1004);
    }

    #[test]
    fn test_address_display() {
        assert_eq!(Address(0x1010).to_string(), "0x1010");
    }

    #[test]
    fn test_symbol_id_index() {
        assert_eq!(SymbolId(3).index(), 3);
    }
}
