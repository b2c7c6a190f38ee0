//! Feedlane worker entrypoint.
//!
//! Usage: feedlane-worker slave
//!
//! Serves the selection protocol on stdin/stdout, proposing an API
//! version and then answering driver invocations until the stream
//! closes. Diagnostics go to stderr so the frame stream stays clean.

use std::io;
use std::process::ExitCode;

use feedlane_worker::FeedStore;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 || args[1] != "slave" {
        eprintln!("Usage: feedlane-worker slave");
        eprintln!();
        eprintln!("Serves the selection protocol on stdin/stdout.");
        return ExitCode::FAILURE;
    }

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(tracing::Level::WARN)
        .init();

    let store = FeedStore::sample();
    match feedlane_worker::run(io::stdin().lock(), io::stdout().lock(), store) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("worker session error: {error}");
            ExitCode::FAILURE
        }
    }
}
