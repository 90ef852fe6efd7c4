//! Range builder: disassembly function headers to an address-sorted index.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

use crate::error::AnnotateError;
use crate::model::{FunctionHeader, FunctionRange};
use crate::source::open_lines;

/// `00000000800090b0 <userret>:`
static FUNC_HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([0-9A-Fa-f]+)\s+<([^>]+)>:\s*$").expect("valid function header regex")
});

/// Parse one disassembly line as a function header.
///
/// Returns `None` for anything else, including headers whose address does not
/// fit in 64 bits.
pub fn parse_function_header(line: &str) -> Option<FunctionHeader> {
    let caps = FUNC_HEADER_RE.captures(line)?;
    let addr_hex = caps.get(1)?.as_str();
    let name = caps.get(2)?.as_str();
    match u64::from_str_radix(addr_hex, 16) {
        Ok(address) => Some(FunctionHeader { address, name: name.to_string() }),
        Err(_) => {
            debug!(addr = addr_hex, func = name, "skipping header with oversized address");
            None
        }
    }
}

/// Turn headers into contiguous ranges.
///
/// Headers are stably sorted by address. Each range ends where the next one
/// starts; a duplicate start is clamped to a one-byte range, and the highest
/// range is open-ended.
pub fn ranges_from_headers(mut headers: Vec<FunctionHeader>) -> Vec<FunctionRange> {
    headers.sort_by_key(|h| h.address);

    let next_starts: Vec<Option<u64>> =
        headers.iter().skip(1).map(|h| Some(h.address)).chain(std::iter::once(None)).collect();

    headers
        .into_iter()
        .zip(next_starts)
        .map(|(header, next)| {
            let start = header.address;
            let end_exclusive = match next {
                Some(next) if next > start => Some(next),
                // Duplicate start: keep the range non-empty.
                Some(_) => start.checked_add(1),
                None => None,
            };
            FunctionRange { name: header.name, start, end_exclusive }
        })
        .collect()
}

/// Build function ranges from the lines of a disassembly listing.
///
/// Returns an empty vector when no line is a function header.
pub fn build_function_ranges<I, S>(lines: I) -> Vec<FunctionRange>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let headers =
        lines.into_iter().filter_map(|line| parse_function_header(line.as_ref())).collect();
    ranges_from_headers(headers)
}

/// Find the name of the function whose range contains `addr`.
///
/// `ranges` must be sorted by start, as [`build_function_ranges`] returns them.
pub fn find_function_name(ranges: &[FunctionRange], addr: u64) -> Option<&str> {
    let i = ranges.partition_point(|r| r.start <= addr);
    if i == 0 {
        return None;
    }
    let range = &ranges[i - 1];
    range.contains(addr).then_some(range.name.as_str())
}

/// Immutable, address-sorted function ranges with a cached array of starts
/// for the binary search.
#[derive(Debug, Clone, Default)]
pub struct FunctionIndex {
    ranges: Vec<FunctionRange>,
    starts: Vec<u64>,
}

impl FunctionIndex {
    /// Wrap ranges produced by [`build_function_ranges`].
    pub fn from_ranges(ranges: Vec<FunctionRange>) -> Self {
        debug_assert!(ranges.windows(2).all(|w| w[0].start <= w[1].start));
        let starts = ranges.iter().map(|r| r.start).collect();
        Self { ranges, starts }
    }

    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::from_ranges(build_function_ranges(lines))
    }

    /// Read a disassembly listing from disk.
    ///
    /// A listing without a single function header is a configuration error.
    pub fn from_disassembly(path: &Path) -> Result<Self, AnnotateError> {
        let mut headers = Vec::new();
        for line in open_lines(path)? {
            if let Some(header) = parse_function_header(&line?) {
                headers.push(header);
            }
        }
        if headers.is_empty() {
            return Err(AnnotateError::NoFunctionHeaders { path: path.to_path_buf() });
        }

        let index = Self::from_ranges(ranges_from_headers(headers));
        info!(
            path = %path.display(),
            functions = index.len(),
            lowest = %format_args!("{:#x}", index.starts[0]),
            "built function index"
        );
        Ok(index)
    }

    pub fn ranges(&self) -> &[FunctionRange] {
        &self.ranges
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Lowest known function start; addresses below it never resolve.
    pub fn lowest_start(&self) -> Option<u64> {
        self.starts.first().copied()
    }

    /// The range containing `addr`, if any.
    pub fn lookup(&self, addr: u64) -> Option<&FunctionRange> {
        let i = self.starts.partition_point(|&s| s <= addr);
        if i == 0 {
            return None;
        }
        let range = &self.ranges[i - 1];
        range.contains(addr).then_some(range)
    }

    pub fn find_function_name(&self, addr: u64) -> Option<&str> {
        self.lookup(addr).map(|r| r.name.as_str())
    }
}
