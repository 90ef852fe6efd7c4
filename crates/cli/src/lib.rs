//! Library target of the `symtrace` CLI.
//!
//! Command implementations live here (rather than in `main.rs`) so the
//! integration tests can call them directly.

pub mod commands;
pub mod logging;
