//! # Symbol Table Loading
//!
//! Turns a textual symbol listing into address-ranged function regions that
//! the call-stack reconstructor resolves program counters against.
//!
//! ## Input Format
//!
//! The listing is the symbol table printed by `fromelf -s` (or any tool that
//! mimics it), restricted to executable `Code` entries:
//!
//! ```text
//!     12  __main                      0x00000001   Gb    1  Code  Hi   0x8
//!     13  _main_stk                   0x00000009   Gb    1  Code  Hi
//!     14  arm_fully_connected_s8_with_a_very_long_name
//!                                     0x00000101   Gb    1  Code  Hi   0x4c
//! ```
//!
//! Three shapes are recognized:
//! - **Full entry**: name, base address and size on one line
//! - **No size**: name and base address only; the size defaults to the
//!   smallest instruction (2 bytes)
//! - **Wrapped entry**: the toolchain wraps long names, so the name sits alone
//!   on one line and the base/size follow on the next
//!
//! Everything else (headers, section banners, data symbols) is skipped.
//!
//! ## Address Ranges
//!
//! Cortex-M code addresses carry the Thumb bit in bit 0. The base is stored
//! as listed and masked when compared against a program counter:
//!
//! ```text
//! listed base = 0x00000101, size = 0x4c
//! match range = [0x100, 0x100 + 0x4c - 1)
//! ```
//!
//! Names starting with `$` are toolchain mapping labels (`$t`, `$d`, ...).
//! They are loaded like any other entry but never selected as the active
//! function.
//!
//! ## Module Structure
//!
//! - **`loader`**: line grammar and the listing parser
//! - **`table`**: `SymbolRegion`, `SymbolTable` and program-counter lookup

pub mod loader;
pub mod table;

pub use loader::{load_symbol_file, parse_symbol_listing};
pub use table::{SymbolRegion, SymbolTable, MIN_INSTRUCTION_SIZE};
