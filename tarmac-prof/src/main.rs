//! # tarmac-prof - Main Entry Point
//!
//! Parses arguments, runs the profiling pass on a blocking thread and maps
//! failures to exit codes. Ctrl+C stops the pass early; the outputs written
//! so far are still finalized.

use anyhow::{Context, Result};
use clap::Parser;

use tarmac_prof::cli::Args;
use tarmac_prof::domain::SetupError;
use tarmac_prof::pipeline::{self, RunConfig};
use tarmac_prof::profiling::CancellationToken;

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_USAGE: i32 = 2;

fn main() {
    env_logger::init();
    std::process::exit(match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            let code = exit_code_for(&e);
            eprintln!("error: {e:#}");
            code
        }
    });
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    if err.downcast_ref::<SetupError>().is_some() {
        EXIT_USAGE
    } else {
        EXIT_ERROR
    }
}

#[tokio::main]
async fn run() -> Result<()> {
    let args = Args::parse();
    let config = RunConfig::from(&args);
    let quiet = config.quiet;

    if !quiet {
        println!("tarmac-prof v{}", env!("CARGO_PKG_VERSION"));
        println!("symbols: {}", config.symbols.display());
        println!("trace: {}", config.trace.display());
    }

    // Setup Ctrl+C handler
    let cancel = CancellationToken::new();
    let handler = cancel.clone();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            handler.cancel();
        }
    });

    let run_config = config.clone();
    let summary = tokio::task::spawn_blocking(move || pipeline::run(&run_config, &cancel))
        .await
        .context("Trace processing task panicked")??;
    interrupt.abort();

    if !quiet {
        if summary.format.is_none() {
            eprintln!("warning: no known trace format found, timeline is empty");
        }
        println!("saved: {}", config.output.display());
        println!("coverage: {}", config.coverage.display());
    }

    Ok(())
}
