use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Example header quoted back to the user when a listing has none.
pub const HEADER_EXAMPLE: &str = "00000000800090b0 <userret>:";

/// Errors produced while building the function index or annotating a log.
#[derive(Debug, Error)]
pub enum AnnotateError {
    #[error(
        "Could not find any function headers in disassembly {}. Expected lines like: {}",
        .path.display(),
        HEADER_EXAMPLE
    )]
    NoFunctionHeaders { path: PathBuf },
    #[error("Failed to open {}: {source}", .path.display())]
    Open { path: PathBuf, source: io::Error },
    #[error("Failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("Failed to write annotated output: {source}")]
    Write { source: io::Error },
}

impl AnnotateError {
    /// Process exit code for this error: 2 for a listing without headers,
    /// 1 for every I/O failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            AnnotateError::NoFunctionHeaders { .. } => 2,
            AnnotateError::Open { .. }
            | AnnotateError::Read { .. }
            | AnnotateError::Write { .. } => 1,
        }
    }
}
