//! Log annotator: resolve each block execution line to its function.

use std::fmt;
use std::io::Write;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::AnnotateError;
use crate::model::BlockExecution;
use crate::ranges::FunctionIndex;
use crate::source::open_lines;

/// Log target of the emulator CPU component.
pub const COMPONENT_TAG: &str = "rv_emu::cpu";

/// Placeholder appended when a block start resolves to no function.
pub const UNKNOWN_FUNCTION: &str = "UNKNOWN";

/// `[2026-01-18T09:33:55Z INFO  rv_emu::cpu] Block execution: 0x8000377c to 0x8000379c`
static BLOCK_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(
        r"^\[(.+?)\s+INFO\s+{}\]\s+Block execution:\s+(0x[0-9A-Fa-f]+)\s+to\s+(0x[0-9A-Fa-f]+)\s*$",
        regex::escape(COMPONENT_TAG)
    );
    Regex::new(&pattern).expect("valid block execution regex")
});

/// Parse a `0x`-prefixed hex token. Values past `u64::MAX` give `None`.
fn parse_hex_address(token: &str) -> Option<u64> {
    let digits = token.strip_prefix("0x")?;
    u64::from_str_radix(digits, 16).ok()
}

/// Parse a block execution line; anything else yields `None`.
///
/// A start address too wide for `u64` still yields a block, with
/// `start == None`, so the line is reported as unresolved rather than dropped.
pub fn parse_block_line(line: &str) -> Option<BlockExecution> {
    let caps = BLOCK_LINE_RE.captures(line)?;
    Some(BlockExecution {
        timestamp: caps.get(1)?.as_str().to_string(),
        start: parse_hex_address(caps.get(2)?.as_str()),
        end: caps.get(3)?.as_str().to_string(),
    })
}

/// A block execution line together with the function its start resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedLine<'a> {
    pub line: &'a str,
    pub block: BlockExecution,
    pub function: Option<&'a str>,
}

impl AnnotatedLine<'_> {
    pub fn is_resolved(&self) -> bool {
        self.function.is_some()
    }
}

/// `<line> <function>`, with [`UNKNOWN_FUNCTION`] for unresolved blocks.
impl fmt::Display for AnnotatedLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.line, self.function.unwrap_or(UNKNOWN_FUNCTION))
    }
}

/// Resolve `line`, or `None` if it is not a block execution line.
pub fn annotate_line<'a>(index: &'a FunctionIndex, line: &'a str) -> Option<AnnotatedLine<'a>> {
    let block = parse_block_line(line)?;
    let function = block.start.and_then(|start| index.find_function_name(start));
    Some(AnnotatedLine { line, block, function })
}

/// Counters for one annotation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotateStats {
    pub lines_read: u64,
    pub lines_matched: u64,
    pub lines_unresolved: u64,
}

/// Stream `lines`, writing one annotated line to `out` per block execution
/// line, in input order.
pub fn annotate_log<I, S, W>(
    index: &FunctionIndex,
    lines: I,
    out: &mut W,
) -> Result<AnnotateStats, AnnotateError>
where
    I: IntoIterator<Item = Result<S, AnnotateError>>,
    S: AsRef<str>,
    W: Write,
{
    let mut stats = AnnotateStats::default();
    for line in lines {
        let line = line?;
        let line = line.as_ref();
        stats.lines_read += 1;

        let Some(annotated) = annotate_line(index, line) else {
            continue;
        };
        stats.lines_matched += 1;

        if !annotated.is_resolved() {
            stats.lines_unresolved += 1;
            let block = &annotated.block;
            debug!(
                timestamp = %block.timestamp,
                start = ?block.start.map(|a| format!("{a:#x}")),
                end = %block.end,
                "block start outside every known function"
            );
        }
        writeln!(out, "{annotated}").map_err(|source| AnnotateError::Write { source })?;
    }
    Ok(stats)
}

/// Annotate the execution log at `path`.
pub fn annotate_file<W: Write>(
    index: &FunctionIndex,
    path: &Path,
    out: &mut W,
) -> Result<AnnotateStats, AnnotateError> {
    let stats = annotate_log(index, open_lines(path)?, out)?;
    info!(
        path = %path.display(),
        read = stats.lines_read,
        matched = stats.lines_matched,
        unresolved = stats.lines_unresolved,
        "annotated execution log"
    );
    Ok(stats)
}
