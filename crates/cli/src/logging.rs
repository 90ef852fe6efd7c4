//! Diagnostics setup. Everything goes to stderr so stdout carries only
//! annotated log lines.

use std::sync::Once;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// Default filter directive for the given `-v` count, or `error` when quiet.
pub fn default_directive(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber. `RUST_LOG` wins over the flags.
///
/// Subsequent calls are ignored.
pub fn init_tracing(verbose: u8, quiet: bool) {
    INIT.call_once(|| {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, quiet)));

        let fmt_layer = fmt::layer().with_writer(std::io::stderr).with_target(true);

        tracing_subscriber::registry().with(env_filter).with(fmt_layer).init();
    });
}
