//! symtrace-core
//!
//! Core library for annotating emulator block-execution logs with the name of
//! the function that contains each block.
//!
//! The pipeline has two stages: [`ranges`] turns a disassembly listing into an
//! address-sorted [`ranges::FunctionIndex`], and [`annotate`] streams an
//! execution log, resolving each block start address against that index.
//!
//! All substantive logic lives here so it can be tested without spawning the
//! CLI binary.

pub mod annotate;
pub mod error;
pub mod model;
pub mod ranges;
pub mod source;

pub use error::AnnotateError;

/// Returns the library version as encoded at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
