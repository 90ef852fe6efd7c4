use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use symtrace_core::annotate::{annotate_file, AnnotateStats};
use symtrace_core::ranges::FunctionIndex;
use tracing::debug;

/// Annotate `log` against the functions listed in `disasm`, writing to `out`.
///
/// The disassembly is fully indexed before the log is opened, so a listing
/// without function headers fails without touching the log or `out`.
pub fn annotate_to<W: Write>(disasm: &Path, log: &Path, out: &mut W) -> Result<AnnotateStats> {
    let index = FunctionIndex::from_disassembly(disasm)?;
    debug!(functions = index.len(), "function index ready");

    let stats = annotate_file(&index, log, out)?;
    out.flush().context("Failed to flush annotated output")?;
    Ok(stats)
}

/// Annotate `log` to stdout.
pub fn annotate_command(disasm: &Path, log: &Path) -> Result<AnnotateStats> {
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    annotate_to(disasm, log, &mut out)
}
