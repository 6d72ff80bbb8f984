use log::warn;
use std::collections::HashMap;

use crate::domain::{Address, SymbolId};

/// Smallest encoded instruction (T16), used as the size of entries that do
/// not declare one
pub const MIN_INSTRUCTION_SIZE: u64 = 2;

/// Prefix of toolchain-internal labels that never become the active function
const DISCARD_PREFIX: char = '$';

/// Address range attributed to one named function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolRegion {
    /// Base address as listed (may carry the state bit)
    pub base: Address,
    /// Declared size in bytes, never below [`MIN_INSTRUCTION_SIZE`]
    pub size: u64,
    pub name: String,
    /// Slot shared by every region declaring this name
    pub id: SymbolId,
}

impl SymbolRegion {
    /// Base with the state bit cleared
    #[must_use]
    pub fn start(&self) -> Address {
        self.base.aligned()
    }

    /// Check if a program counter falls within this region
    ///
    /// The last byte of the declared range is excluded: an instruction
    /// starting there could not fit inside the function.
    #[must_use]
    pub fn contains(&self, pc: Address) -> bool {
        let start = self.start().0;
        let end = start.saturating_add(self.size).saturating_sub(1);
        pc.0 >= start && pc.0 < end
    }

    /// Byte offset of `pc` from the start of the function
    #[must_use]
    pub fn offset(&self, pc: Address) -> u64 {
        pc.0.saturating_sub(self.start().0)
    }

    /// Toolchain mapping labels are never selected as the active function
    #[must_use]
    pub fn is_discarded(&self) -> bool {
        self.name.starts_with(DISCARD_PREFIX)
    }
}

/// Ordered list of function regions plus the name index shared by all
/// per-function records
#[derive(Debug, Default, Clone)]
pub struct SymbolTable {
    regions: Vec<SymbolRegion>,
    /// Distinct names in first-declaration order, indexed by `SymbolId`
    names: Vec<String>,
    /// Declared size of the first region for each name
    sizes: Vec<u64>,
    index: HashMap<String, SymbolId>,
}

impl SymbolTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a region, returning `false` if the exact same entry was already loaded
    pub fn insert(&mut self, name: &str, base: u64, size: u64) -> bool {
        let name = name.trim();
        let size = size.max(MIN_INSTRUCTION_SIZE);

        let id = if let Some(&id) = self.index.get(name) {
            let duplicate = self
                .regions
                .iter()
                .any(|r| r.id == id && r.base.0 == base && r.size == size);
            if duplicate {
                return false;
            }
            if self.sizes[id.index()] != size {
                warn!(
                    "Symbol '{name}' declared again with size {size} (first size {}); sharing statistics",
                    self.sizes[id.index()]
                );
            }
            id
        } else {
            let id = SymbolId(self.names.len());
            self.names.push(name.to_owned());
            self.sizes.push(size);
            self.index.insert(name.to_owned(), id);
            id
        };

        self.regions.push(SymbolRegion { base: Address(base), size, name: name.to_owned(), id });
        true
    }

    /// Regions in load order
    #[must_use]
    pub fn regions(&self) -> &[SymbolRegion] {
        &self.regions
    }

    /// Number of distinct symbol names
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Name of a symbol slot
    ///
    /// # Panics
    /// Panics if `id` was not produced by this table
    #[must_use]
    pub fn name(&self, id: SymbolId) -> &str {
        &self.names[id.index()]
    }

    /// Declared size of a symbol slot (first declaration wins)
    #[must_use]
    pub fn size(&self, id: SymbolId) -> u64 {
        self.sizes[id.index()]
    }

    #[must_use]
    pub fn id(&self, name: &str) -> Option<SymbolId> {
        self.index.get(name).copied()
    }

    /// Iterate over `(id, name)` pairs in first-declaration order
    pub fn symbols(&self) -> impl Iterator<Item = (SymbolId, &str)> {
        self.names.iter().enumerate().map(|(i, name)| (SymbolId(i), name.as_str()))
    }

    /// Find the region covering `pc`
    ///
    /// `hint` is the region index returned by the previous lookup and is
    /// checked first, since consecutive instructions usually stay in the same
    /// function. Otherwise the first match in load order wins. Returns the
    /// region index together with the region.
    #[must_use]
    pub fn resolve(&self, pc: Address, hint: Option<usize>) -> Option<(usize, &SymbolRegion)> {
        let pc = pc.aligned();

        if let Some(idx) = hint {
            if let Some(region) = self.regions.get(idx) {
                if region.contains(pc) && !region.is_discarded() {
                    return Some((idx, region));
                }
            }
        }

        self.regions
            .iter()
            .enumerate()
            .find(|(_, region)| region.contains(pc) && !region.is_discarded())
    }
}
