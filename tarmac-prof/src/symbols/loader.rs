use log::info;
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::OnceLock;

use super::table::{SymbolTable, MIN_INSTRUCTION_SIZE};
use crate::domain::SetupError;

/// One recognized line of the symbol listing
#[derive(Debug, Clone, PartialEq, Eq)]
enum ListingLine {
    /// Name, base and size on one line
    Entry { name: String, base: u64, size: u64 },
    /// Name and base only
    EntryNoSize { name: String, base: u64 },
    /// Name alone; base and size follow on the next line
    WrappedName(String),
    /// Base and size completing a wrapped name
    WrappedTail { base: u64, size: u64 },
}

fn entry_pattern() -> &'static Regex {
    ENTRY_PATTERN.get_or_init(|| {
        Regex::new(r"^.*\s+[0-9]+\s+(.*)\s(0x[0-9a-fA-F]+)\s+.*Code\s+.*(0x[0-9a-fA-F]+)").unwrap()
    })
}

fn entry_no_size_pattern() -> &'static Regex {
    ENTRY_NO_SIZE_PATTERN
        .get_or_init(|| Regex::new(r"^.*\s+[0-9]+\s+(.*)\s(0x[0-9a-fA-F]+)\s+.*Code\s+").unwrap())
}

fn wrapped_name_pattern() -> &'static Regex {
    WRAPPED_NAME_PATTERN
        .get_or_init(|| Regex::new(r"^\s+[0-9]+\s+([a-zA-Z0-9_\.]+)\s*$").unwrap())
}

fn wrapped_tail_pattern() -> &'static Regex {
    WRAPPED_TAIL_PATTERN.get_or_init(|| {
        Regex::new(r"^\s+(0x[0-9a-fA-F]+)\s+.*Code\s+.*(0x[0-9a-fA-F]+)").unwrap()
    })
}

fn parse_hex(text: &str) -> Option<u64> {
    let digits = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")).unwrap_or(text);
    u64::from_str_radix(digits, 16).ok()
}

impl ListingLine {
    /// Recognize a listing line.
    ///
    /// `expect_tail` is set while a wrapped name is waiting for its second
    /// line; the tail shape is only tried then. Shapes are tried in a fixed
    /// order: full entry, wrapped name, entry without size.
    fn parse(line: &str, expect_tail: bool) -> Option<Self> {
        if expect_tail {
            if let Some(caps) = wrapped_tail_pattern().captures(line) {
                let base = parse_hex(caps.get(1)?.as_str())?;
                let size = parse_hex(caps.get(2)?.as_str())?;
                return Some(ListingLine::WrappedTail { base, size });
            }
        }

        if let Some(caps) = entry_pattern().captures(line) {
            let name = caps.get(1)?.as_str().trim().to_owned();
            let base = parse_hex(caps.get(2)?.as_str())?;
            let size = parse_hex(caps.get(3)?.as_str())?;
            return Some(ListingLine::Entry { name, base, size });
        }

        if let Some(caps) = wrapped_name_pattern().captures(line) {
            return Some(ListingLine::WrappedName(caps.get(1)?.as_str().to_owned()));
        }

        let caps = entry_no_size_pattern().captures(line)?;
        let name = caps.get(1)?.as_str().trim().to_owned();
        let base = parse_hex(caps.get(2)?.as_str())?;
        Some(ListingLine::EntryNoSize { name, base })
    }
}

/// Parse a symbol listing from any buffered reader
///
/// Lines matching none of the known shapes are skipped. A wrapped name stays
/// pending until a base/size line completes it or another wrapped name
/// replaces it.
///
/// # Errors
/// Returns an error only if reading from `reader` fails
pub fn parse_symbol_listing<R: BufRead>(reader: R) -> std::io::Result<SymbolTable> {
    let mut table = SymbolTable::new();
    let mut pending: Option<String> = None;

    for raw in reader.split(b'\n') {
        let raw = raw?;
        let line = String::from_utf8_lossy(&raw);
        let line = line.trim_end_matches('\r');

        match ListingLine::parse(line, pending.is_some()) {
            Some(ListingLine::WrappedTail { base, size }) => {
                if let Some(name) = pending.take() {
                    table.insert(&name, base, size);
                }
            }
            Some(ListingLine::Entry { name, base, size }) => {
                table.insert(&name, base, size);
            }
            Some(ListingLine::WrappedName(name)) => {
                pending = Some(name);
            }
            Some(ListingLine::EntryNoSize { name, base }) => {
                table.insert(&name, base, MIN_INSTRUCTION_SIZE);
            }
            None => {}
        }
    }

    Ok(table)
}

/// Load and parse a symbol listing file
///
/// # Errors
/// Returns [`SetupError::SymbolFile`] if the file cannot be opened or read
pub fn load_symbol_file(path: &Path) -> Result<SymbolTable, SetupError> {
    let to_setup_error =
        |source: std::io::Error| SetupError::SymbolFile { path: path.to_path_buf(), source };

    let file = File::open(path).map_err(to_setup_error)?;
    let table = parse_symbol_listing(BufReader::new(file)).map_err(to_setup_error)?;

    info!(
        "Loaded {} code symbols ({} regions) from {}",
        table.len(),
        table.regions().len(),
        path.display()
    );
    Ok(table)
}

static ENTRY_PATTERN: OnceLock<Regex> = OnceLock::new();
static ENTRY_NO_SIZE_PATTERN: OnceLock<Regex> = OnceLock::new();
static WRAPPED_NAME_PATTERN: OnceLock<Regex> = OnceLock::new();
static WRAPPED_TAIL_PATTERN: OnceLock<Regex> = OnceLock::new();
