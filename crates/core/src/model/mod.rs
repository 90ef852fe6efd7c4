//! Core data model: function ranges and the parsed forms of the two input
//! line kinds.

use serde::{Deserialize, Serialize};

/// A half-open address interval `[start, end_exclusive)` owned by one function.
///
/// `end_exclusive == None` is the sentinel end used by the highest function in
/// a listing: it lies above every `u64` address, `u64::MAX` included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionRange {
    pub name: String,
    pub start: u64,
    pub end_exclusive: Option<u64>,
}

impl FunctionRange {
    pub fn new(name: impl Into<String>, start: u64, end_exclusive: Option<u64>) -> Self {
        Self { name: name.into(), start, end_exclusive }
    }

    /// True when `addr` falls inside this range.
    pub fn contains(&self, addr: u64) -> bool {
        if addr < self.start {
            return false;
        }
        match self.end_exclusive {
            Some(end) => addr < end,
            None => true,
        }
    }

    /// Width in bytes; `None` for the open-ended last range or an inverted one.
    pub fn width(&self) -> Option<u64> {
        self.end_exclusive.and_then(|end| end.checked_sub(self.start))
    }
}

/// A function header line from a disassembly listing, e.g.
/// `00000000800090b0 <userret>:`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionHeader {
    pub address: u64,
    pub name: String,
}

/// A block execution line from the emulator log.
///
/// Only `start` takes part in resolution; it is `None` when the logged value
/// does not fit in 64 bits. `end` is kept as the logged `0x` text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockExecution {
    pub timestamp: String,
    pub start: Option<u64>,
    pub end: String,
}
