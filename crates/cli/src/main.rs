use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use symtrace::commands::annotate_command;
use symtrace::logging::init_tracing;
use symtrace_core::AnnotateError;

/// Annotate emulator block-execution logs with function names.
///
/// Every `rv_emu::cpu` "Block execution" line of the log is echoed to stdout
/// with the name of the function containing its start address appended, or
/// `UNKNOWN` when no function in the disassembly covers it.
#[derive(Parser, Debug)]
#[command(
    name = "symtrace",
    version,
    about = "Extract rv_emu block execution lines and append function names",
    long_about = None
)]
struct Cli {
    /// Disassembly output file (objdump-like).
    disasm: PathBuf,

    /// Emulator execution log file.
    log: PathBuf,

    /// Increase diagnostic verbosity on stderr (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only report errors on stderr.
    #[arg(short, long, default_value_t = false, conflicts_with = "verbose")]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match annotate_command(&cli.disasm, &cli.log) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("ERROR: {err:#}");
            let code = err.downcast_ref::<AnnotateError>().map_or(1, AnnotateError::exit_code);
            ExitCode::from(code)
        }
    }
}
