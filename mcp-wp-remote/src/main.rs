//! `mcp-wp-remote` entry point.
//!
//! Parses arguments, initialises tracing, and runs the stdio relay until stdin
//! closes or a termination signal arrives.

use clap::Parser;
use clap::error::ErrorKind;

use mcp_wp_remote::cli::{RelayArgs, USAGE};
use mcp_wp_remote::stdio::relay::run_relay;

// ─────────────────────────────────────────────────────────────────────────────
// Entry Point
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    let args = match RelayArgs::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            eprintln!("{USAGE}");
            if e.kind() != ErrorKind::MissingRequiredArgument {
                eprintln!("{e}");
            }
            std::process::exit(1);
        }
    };

    init_tracing(args.verbose);

    let code = match run_relay(args).await {
        Ok(()) => 0,
        Err(e) => {
            tracing::error!(error = %e, "relay failed");
            eprintln!("{e}");
            1
        }
    };

    std::process::exit(code);
}

// ─────────────────────────────────────────────────────────────────────────────
// Tracing Init
// ─────────────────────────────────────────────────────────────────────────────

/// Initialise tracing subscriber with stderr output.
///
/// stderr doubles as the JSON-RPC error stream, so logging stays off unless
/// `RUST_LOG` is set. `verbose` forces the filter to `debug`.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
